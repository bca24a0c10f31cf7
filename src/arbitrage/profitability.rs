//! Profitability evaluation for a chosen direction.
//!
//! Sizes a trial trade from the buy venue's liquidity, simulates both
//! legs through the venue quoters, and projects balance deltas. Every
//! rejection is a tagged [`EvalError`]; the pipeline downgrades all of
//! them to a normal "not profitable" cycle end.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::chain::ChainApi;
use crate::config::Config;
use crate::error::EvalError;
use crate::units::{self, NATIVE_DECIMALS};
use crate::venue::{ActivePair, Venues};

use super::direction::ExchangePath;

/// Projected balance accounting for one candidate trade.
#[derive(Debug, Clone)]
pub struct ProfitReport {
    /// token0 required to buy the trial amount on the buy venue.
    pub required_in: Decimal,
    /// token0 returned when selling the trial amount on the sell venue.
    pub returned_out: Decimal,
    /// `returned_out - required_in`.
    pub amount_difference: Decimal,
    /// Projected gas cost (`gas_limit * gas_price`) in native units.
    pub estimated_gas_cost: Decimal,
    /// Native balance before the trade.
    pub native_before: Decimal,
    /// Projected native balance after gas.
    pub native_after: Decimal,
    /// token0 balance before the trade.
    pub token_before: Decimal,
    /// Projected token0 balance after the trade.
    pub token_after: Decimal,
    /// Projected total gain/loss: token delta minus gas.
    pub net_difference: Decimal,
}

/// An accepted candidate trade.
#[derive(Debug, Clone)]
pub struct TradePlan {
    /// Input amount for the buy leg, in token0 base units.
    pub amount_in: U256,
    /// The accounting that justified acceptance.
    pub report: ProfitReport,
}

/// Evaluate whether the chosen direction is worth executing.
///
/// The trial trade is sized as `liquidity_fraction` of the sell-side
/// token's liquidity on the buy venue, truncated to whole base units.
pub async fn evaluate_profitability(
    chain: &dyn ChainApi,
    venues: &Venues,
    path: &ExchangePath,
    pair: &ActivePair,
    config: &Config,
) -> Result<TradePlan, EvalError> {
    let buy_venue = venues.get(path.buy);
    let sell_venue = venues.get(path.sell);

    info!(
        pair = %pair.name,
        buy = %buy_venue.name,
        sell = %sell_venue.name,
        "Determining profitability"
    );

    // Size the trial from sell-side token liquidity on the buy venue.
    let pool = pair.pool(path.buy);
    let (_, liquidity1) = chain
        .pool_liquidity(pool, &pair.token0, &pair.token1)
        .await?;
    let trial_amount = units::apply_fraction(liquidity1, config.liquidity_fraction)?;

    debug!(
        liquidity1 = %liquidity1,
        trial_amount = %trial_amount,
        fraction = %config.liquidity_fraction,
        "Sized trial trade"
    );

    // Buy leg: token0 needed for the trial amount of token1.
    let token0_needed = chain
        .quote_exact_output(
            buy_venue,
            pair.token0.address,
            pair.token1.address,
            pair.fee,
            trial_amount,
        )
        .await?;

    // Sell leg: token0 returned after swapping the trial amount back.
    let token0_returned = chain
        .quote_exact_input(
            sell_venue,
            pair.token1.address,
            pair.token0.address,
            pair.fee,
            trial_amount,
        )
        .await?;

    let required_in = units::format_units(token0_needed, pair.token0.decimals)?;
    let returned_out = units::format_units(token0_returned, pair.token0.decimals)?;
    let amount_difference = returned_out - required_in;
    let estimated_gas_cost = config.estimated_gas_cost();

    let account = chain.account();
    let native_before =
        units::format_units(chain.native_balance(account).await?, NATIVE_DECIMALS)?;
    let native_after = native_before - estimated_gas_cost;

    let token_before = units::format_units(
        chain.token_balance(&pair.token0, account).await?,
        pair.token0.decimals,
    )?;
    let token_after = token_before + amount_difference;

    let report = ProfitReport {
        required_in,
        returned_out,
        amount_difference,
        estimated_gas_cost,
        native_before,
        native_after,
        token_before,
        token_after,
        net_difference: amount_difference - estimated_gas_cost,
    };

    log_report(pair, &report);

    if returned_out < required_in {
        return Err(EvalError::InsufficientReturn {
            required: required_in,
            returned: returned_out,
        });
    }

    if report.native_after < Decimal::ZERO {
        return Err(EvalError::InsufficientGasFunds {
            balance: native_before,
            gas_cost: estimated_gas_cost,
        });
    }

    Ok(TradePlan {
        amount_in: token0_needed,
        report,
    })
}

fn log_report(pair: &ActivePair, report: &ProfitReport) {
    let symbol = &pair.token0.symbol;
    info!(
        "Estimated {} needed on buy venue: {}",
        symbol, report.required_in
    );
    info!(
        "Estimated {} returned on sell venue: {}",
        symbol, report.returned_out
    );
    info!("----------------------------------------");
    info!("Native Balance Before: {}", report.native_before);
    info!("Native Balance After:  {}", report.native_after);
    info!("Gas Spent (est.):      {}", report.estimated_gas_cost);
    info!("----------------------------------------");
    info!("{} Balance Before:  {}", symbol, report.token_before);
    info!("{} Balance After:   {}", symbol, report.token_after);
    info!("{} Gained/Lost:     {}", symbol, report.amount_difference);
    info!("----------------------------------------");
    info!("Total Gained/Lost:     {}", report.net_difference);
}
