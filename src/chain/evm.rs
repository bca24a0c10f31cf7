//! Live EVM chain adapter over an alloy JSON-RPC provider.
//!
//! All pool math stays in fixed point: `sqrtPriceX96` is widened to
//! `U512` before squaring and only reduced to a [`Decimal`] at the end.

use alloy::network::EthereumWallet;
use alloy::primitives::aliases::U24;
use alloy::primitives::{Address, U256, U512};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::config::Config;
use crate::error::{BotError, ChainError, ExecutionError};
use crate::venue::{FactoryKind, Token, Venue};

use super::{ChainApi, TradeReceipt};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }

    #[sol(rpc)]
    interface IUniswapV3Factory {
        function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool);
    }

    #[sol(rpc)]
    interface IAlgebraFactory {
        function poolByPair(address tokenA, address tokenB) external view returns (address pool);
    }

    #[sol(rpc)]
    interface IUniswapV3Pool {
        function slot0() external view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint8 feeProtocol, bool unlocked);
    }

    #[sol(rpc)]
    interface IAlgebraPool {
        function globalState() external view returns (uint160 price, int24 tick, uint16 fee, uint16 timepointIndex, uint8 communityFeeToken0, uint8 communityFeeToken1, bool unlocked);
    }

    #[sol(rpc)]
    interface IQuoterV2 {
        struct QuoteExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint256 amountIn;
            uint24 fee;
            uint160 sqrtPriceLimitX96;
        }

        struct QuoteExactOutputSingleParams {
            address tokenIn;
            address tokenOut;
            uint256 amount;
            uint24 fee;
            uint160 sqrtPriceLimitX96;
        }

        function quoteExactInputSingle(QuoteExactInputSingleParams params) external returns (uint256 amountOut, uint160 sqrtPriceX96After, uint32 initializedTicksCrossed, uint256 gasEstimate);
        function quoteExactOutputSingle(QuoteExactOutputSingleParams params) external returns (uint256 amountIn, uint160 sqrtPriceX96After, uint32 initializedTicksCrossed, uint256 gasEstimate);
    }

    #[sol(rpc)]
    interface IArbitrage {
        function executeTrade(address[] calldata routers, address[] calldata tokens, uint24 fee, uint256 amountIn) external;
    }
}

/// Working fractional digits for spot prices before display rounding.
const PRICE_SCALE: u32 = 12;

/// Live chain adapter backed by an alloy provider with a local signer.
#[derive(Debug, Clone)]
pub struct EvmChain {
    provider: DynProvider,
    account: Address,
    arbitrage: Option<Address>,
}

impl EvmChain {
    /// Connect to the configured RPC endpoint with the configured signer.
    pub fn connect(config: &Config) -> Result<Self, BotError> {
        let signer: PrivateKeySigner = config
            .private_key
            .parse()
            .map_err(|e| ChainError::Rpc(format!("invalid private key: {e}")))?;
        let account = signer.address();
        let wallet = EthereumWallet::from(signer);

        let url = config
            .rpc_url
            .parse()
            .map_err(|e| ChainError::Rpc(format!("invalid RPC url: {e}")))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url).erased();

        let arbitrage = match (&config.arbitrage_address, config.is_deployed) {
            (Some(addr), true) => Some(
                addr.parse()
                    .map_err(|e| ChainError::Rpc(format!("invalid arbitrage address: {e}")))?,
            ),
            _ => None,
        };

        Ok(Self {
            provider,
            account,
            arbitrage,
        })
    }

    /// The underlying provider, for the swap-event watcher.
    pub fn provider(&self) -> DynProvider {
        self.provider.clone()
    }
}

#[async_trait]
impl ChainApi for EvmChain {
    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn token_metadata(&self, address: Address) -> Result<Token, ChainError> {
        let erc20 = IERC20::new(address, &self.provider);

        let symbol = erc20
            .symbol()
            .call()
            .await
            .map_err(|e| ChainError::Call(format!("symbol(): {e}")))?;
        let decimals = erc20
            .decimals()
            .call()
            .await
            .map_err(|e| ChainError::Call(format!("decimals(): {e}")))?;

        Ok(Token {
            address,
            symbol,
            decimals,
        })
    }

    async fn resolve_pool(
        &self,
        venue: &Venue,
        token0: Address,
        token1: Address,
        fee: u32,
    ) -> Result<Address, ChainError> {
        let pool = match venue.kind {
            FactoryKind::UniswapV3 => IUniswapV3Factory::new(venue.factory, &self.provider)
                .getPool(token0, token1, U24::from(fee))
                .call()
                .await
                .map_err(|e| ChainError::Call(format!("getPool(): {e}")))?,
            FactoryKind::AlgebraV3 => IAlgebraFactory::new(venue.factory, &self.provider)
                .poolByPair(token0, token1)
                .call()
                .await
                .map_err(|e| ChainError::Call(format!("poolByPair(): {e}")))?,
        };

        if pool == Address::ZERO {
            return Err(ChainError::Call("factory returned zero address".to_string()));
        }

        Ok(pool)
    }

    async fn pool_price(
        &self,
        venue: &Venue,
        pool: Address,
        token0: &Token,
        token1: &Token,
    ) -> Result<Decimal, ChainError> {
        let sqrt_price_x96 = match venue.kind {
            FactoryKind::UniswapV3 => {
                let slot0 = IUniswapV3Pool::new(pool, &self.provider)
                    .slot0()
                    .call()
                    .await
                    .map_err(|e| ChainError::Call(format!("slot0(): {e}")))?;
                U256::from(slot0.sqrtPriceX96)
            }
            FactoryKind::AlgebraV3 => {
                let state = IAlgebraPool::new(pool, &self.provider)
                    .globalState()
                    .call()
                    .await
                    .map_err(|e| ChainError::Call(format!("globalState(): {e}")))?;
                U256::from(state.price)
            }
        };

        sqrt_price_to_decimal(sqrt_price_x96, token0.decimals, token1.decimals)
    }

    async fn pool_liquidity(
        &self,
        pool: Address,
        token0: &Token,
        token1: &Token,
    ) -> Result<(U256, U256), ChainError> {
        let amount0 = IERC20::new(token0.address, &self.provider)
            .balanceOf(pool)
            .call()
            .await
            .map_err(|e| ChainError::Call(format!("balanceOf(pool): {e}")))?;
        let amount1 = IERC20::new(token1.address, &self.provider)
            .balanceOf(pool)
            .call()
            .await
            .map_err(|e| ChainError::Call(format!("balanceOf(pool): {e}")))?;

        Ok((amount0, amount1))
    }

    async fn quote_exact_output(
        &self,
        venue: &Venue,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_out: U256,
    ) -> Result<U256, ChainError> {
        let params = IQuoterV2::QuoteExactOutputSingleParams {
            tokenIn: token_in,
            tokenOut: token_out,
            amount: amount_out,
            fee: U24::from(fee),
            sqrtPriceLimitX96: Default::default(),
        };

        let quote = IQuoterV2::new(venue.quoter, &self.provider)
            .quoteExactOutputSingle(params)
            .call()
            .await
            .map_err(|e| ChainError::Call(format!("quoteExactOutputSingle(): {e}")))?;

        Ok(quote.amountIn)
    }

    async fn quote_exact_input(
        &self,
        venue: &Venue,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256, ChainError> {
        let params = IQuoterV2::QuoteExactInputSingleParams {
            tokenIn: token_in,
            tokenOut: token_out,
            amountIn: amount_in,
            fee: U24::from(fee),
            sqrtPriceLimitX96: Default::default(),
        };

        let quote = IQuoterV2::new(venue.quoter, &self.provider)
            .quoteExactInputSingle(params)
            .call()
            .await
            .map_err(|e| ChainError::Call(format!("quoteExactInputSingle(): {e}")))?;

        Ok(quote.amountOut)
    }

    async fn native_balance(&self, account: Address) -> Result<U256, ChainError> {
        self.provider
            .get_balance(account)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn token_balance(&self, token: &Token, account: Address) -> Result<U256, ChainError> {
        IERC20::new(token.address, &self.provider)
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| ChainError::Call(format!("balanceOf(): {e}")))
    }

    fn account(&self) -> Address {
        self.account
    }

    fn executor_available(&self) -> bool {
        self.arbitrage.is_some()
    }

    async fn submit_trade(
        &self,
        routers: [Address; 2],
        tokens: [Address; 2],
        fee: u32,
        amount_in: U256,
    ) -> Result<TradeReceipt, ExecutionError> {
        let Some(arbitrage) = self.arbitrage else {
            return Err(ExecutionError::SubmissionFailed(
                "no arbitrage contract configured".to_string(),
            ));
        };

        let pending = IArbitrage::new(arbitrage, &self.provider)
            .executeTrade(routers.to_vec(), tokens.to_vec(), U24::from(fee), amount_in)
            .send()
            .await
            .map_err(|e| ExecutionError::SubmissionFailed(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ExecutionError::ConfirmationFailed(e.to_string()))?;

        if !receipt.status() {
            return Err(ExecutionError::ConfirmationFailed(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            )));
        }

        Ok(TradeReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: Some(receipt.gas_used),
        })
    }
}

/// Reduce a `sqrtPriceX96` value to the price of token0 in token1 display
/// units: `(sqrtPriceX96^2 / 2^192) * 10^(dec0 - dec1)`.
fn sqrt_price_to_decimal(
    sqrt_price_x96: U256,
    decimals0: u8,
    decimals1: u8,
) -> Result<Decimal, ChainError> {
    let sqrt = U512::from(sqrt_price_x96);
    let numerator = sqrt
        .checked_mul(sqrt)
        .and_then(|sq| {
            sq.checked_mul(U512::from(10u8).pow(U512::from(decimals0 as u32 + PRICE_SCALE)))
        })
        .ok_or_else(|| ChainError::Conversion("sqrt price overflow".to_string()))?;

    let denominator =
        (U512::from(1u8) << 192) * U512::from(10u8).pow(U512::from(decimals1 as u32));

    let quotient = u128::try_from(numerator / denominator)
        .ok()
        .and_then(|q| i128::try_from(q).ok())
        .ok_or_else(|| ChainError::Conversion("price exceeds decimal capacity".to_string()))?;

    Decimal::try_from_i128_with_scale(quotient, PRICE_SCALE)
        .map_err(|_| ChainError::Conversion("price exceeds decimal capacity".to_string()))
}
