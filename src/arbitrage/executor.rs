//! Trade execution through the on-chain arbitrage contract.
//!
//! Builds the router/token paths for an accepted plan, submits the
//! transaction, and reports observed balance deltas. When no contract
//! is deployed the bot runs in monitoring mode and stops here.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::chain::ChainApi;
use crate::error::ExecutionError;
use crate::units::{self, NATIVE_DECIMALS};
use crate::venue::{ActivePair, Venues};

use super::direction::ExchangePath;

/// Observed balance movement from a confirmed trade.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Native balance before submission.
    pub native_before: Decimal,
    /// Native balance after confirmation.
    pub native_after: Decimal,
    /// Native spent (gas plus any contract cost).
    pub native_spent: Decimal,
    /// token0 balance before submission.
    pub token_before: Decimal,
    /// token0 balance after confirmation.
    pub token_after: Decimal,
    /// token0 gained (negative if lost).
    pub token_gained: Decimal,
    /// `token_gained - native_spent`.
    pub net: Decimal,
}

/// Result of attempting a trade.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    /// The trade was submitted and confirmed.
    Submitted {
        /// Transaction hash as a hex string.
        tx_hash: String,
        /// Observed balance deltas.
        outcome: ExecutionOutcome,
    },
    /// No contract is deployed; the opportunity was only reported.
    MonitoringOnly,
}

/// Submit an accepted trade and report the observed balance deltas.
pub async fn execute_trade(
    chain: &dyn ChainApi,
    venues: &Venues,
    path: &ExchangePath,
    pair: &ActivePair,
    amount_in: U256,
) -> Result<ExecutionResult, ExecutionError> {
    if amount_in.is_zero() {
        return Err(ExecutionError::ZeroAmount);
    }

    let buy_venue = venues.get(path.buy);
    let sell_venue = venues.get(path.sell);

    if !chain.executor_available() {
        warn!(
            pair = %pair.name,
            buy = %buy_venue.name,
            sell = %sell_venue.name,
            "No arbitrage contract deployed, monitoring only"
        );
        return Ok(ExecutionResult::MonitoringOnly);
    }

    info!(
        pair = %pair.name,
        buy = %buy_venue.name,
        sell = %sell_venue.name,
        amount_in = %amount_in,
        "Attempting arbitrage"
    );

    let account = chain.account();
    let native_before =
        units::format_units(chain.native_balance(account).await?, NATIVE_DECIMALS)?;
    let token_before = units::format_units(
        chain.token_balance(&pair.token0, account).await?,
        pair.token0.decimals,
    )?;

    let receipt = chain
        .submit_trade(
            [buy_venue.router, sell_venue.router],
            [pair.token0.address, pair.token1.address],
            pair.fee,
            amount_in,
        )
        .await?;

    let native_after =
        units::format_units(chain.native_balance(account).await?, NATIVE_DECIMALS)?;
    let token_after = units::format_units(
        chain.token_balance(&pair.token0, account).await?,
        pair.token0.decimals,
    )?;

    let native_spent = native_before - native_after;
    let token_gained = token_after - token_before;
    let outcome = ExecutionOutcome {
        native_before,
        native_after,
        native_spent,
        token_before,
        token_after,
        token_gained,
        net: token_gained - native_spent,
    };

    let symbol = &pair.token0.symbol;
    info!(tx_hash = %receipt.tx_hash, block = ?receipt.block_number, "Trade confirmed");
    info!("----------------------------------------");
    info!("Native Balance Before: {}", outcome.native_before);
    info!("Native Balance After:  {}", outcome.native_after);
    info!("Native Spent (gas):    {}", outcome.native_spent);
    info!("----------------------------------------");
    info!("{} Balance Before:  {}", symbol, outcome.token_before);
    info!("{} Balance After:   {}", symbol, outcome.token_after);
    info!("{} Gained/Lost:     {}", symbol, outcome.token_gained);
    info!("----------------------------------------");
    info!("Total Gained/Lost:     {}", outcome.net);

    Ok(ExecutionResult::Submitted {
        tx_hash: format!("{:#x}", receipt.tx_hash),
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{MockChain, MockChainConfig};
    use crate::venue::{FactoryKind, Token, Venue, VenueId};
    use alloy::primitives::Address;
    use rust_decimal_macros::dec;

    fn test_venues() -> Venues {
        let venue = |id, byte: u8| Venue {
            id,
            name: format!("Venue {id}"),
            kind: FactoryKind::UniswapV3,
            factory: Address::repeat_byte(byte),
            quoter: Address::repeat_byte(byte + 1),
            router: Address::repeat_byte(byte + 2),
        };
        Venues {
            a: venue(VenueId::A, 0xa0),
            b: venue(VenueId::B, 0xb0),
        }
    }

    fn test_pair() -> ActivePair {
        ActivePair {
            name: "WETH/ARB".to_string(),
            token0: Token {
                address: Address::repeat_byte(1),
                symbol: "WETH".to_string(),
                decimals: 18,
            },
            token1: Token {
                address: Address::repeat_byte(2),
                symbol: "ARB".to_string(),
                decimals: 18,
            },
            fee: 500,
            pool_a: Address::repeat_byte(0xaa),
            pool_b: Address::repeat_byte(0xbb),
        }
    }

    fn eth(value: Decimal) -> U256 {
        units::parse_units(value, 18).unwrap()
    }

    #[tokio::test]
    async fn monitoring_mode_skips_submission() {
        let chain = MockChain::new();
        let path = ExchangePath {
            buy: VenueId::A,
            sell: VenueId::B,
        };

        let result = execute_trade(&chain, &test_venues(), &path, &test_pair(), eth(dec!(1)))
            .await
            .unwrap();

        assert!(matches!(result, ExecutionResult::MonitoringOnly));
        assert!(chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn zero_amount_is_rejected_before_any_call() {
        let chain = MockChain::with_config(MockChainConfig {
            executor_available: true,
            ..Default::default()
        });
        let path = ExchangePath {
            buy: VenueId::A,
            sell: VenueId::B,
        };

        let err = execute_trade(&chain, &test_venues(), &path, &test_pair(), U256::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::ZeroAmount));
        assert!(chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn submission_reports_balance_deltas() {
        let chain = MockChain::with_config(MockChainConfig {
            executor_available: true,
            ..Default::default()
        });
        let pair = test_pair();
        chain.set_native_balance(chain.account(), eth(dec!(0.5)));
        chain.set_token_balance(pair.token0.address, chain.account(), eth(dec!(3)));
        chain.set_submit_effect(eth(dec!(0.499)), eth(dec!(3.05)));

        let venues = test_venues();
        let path = ExchangePath {
            buy: VenueId::B,
            sell: VenueId::A,
        };
        let result = execute_trade(&chain, &venues, &path, &pair, eth(dec!(1)))
            .await
            .unwrap();

        let outcome = match result {
            ExecutionResult::Submitted { outcome, .. } => outcome,
            other => panic!("expected Submitted, got {other:?}"),
        };
        assert_eq!(outcome.native_spent, dec!(0.001));
        assert_eq!(outcome.token_gained, dec!(0.05));
        assert_eq!(outcome.net, dec!(0.049));

        // Router path follows the direction: buy venue first.
        let submitted = chain.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].routers[0], venues.b.router);
        assert_eq!(submitted[0].routers[1], venues.a.router);
        assert_eq!(submitted[0].tokens, [pair.token0.address, pair.token1.address]);
    }

    #[tokio::test]
    async fn submission_failure_propagates() {
        let chain = MockChain::with_config(MockChainConfig {
            executor_available: true,
            fail_submit: true,
            ..Default::default()
        });
        let path = ExchangePath {
            buy: VenueId::A,
            sell: VenueId::B,
        };

        let err = execute_trade(&chain, &test_venues(), &path, &test_pair(), eth(dec!(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::SubmissionFailed(_)));
    }
}
