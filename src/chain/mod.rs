//! Chain adapter boundary.
//!
//! Everything the decision pipeline needs from the chain goes through the
//! [`ChainApi`] trait: spot prices, pool liquidity, simulated quotes,
//! balances, startup metadata resolution, and the opaque settlement call.
//! The live implementation is [`evm::EvmChain`]; tests use [`mock::MockChain`].

pub mod events;
pub mod evm;
pub mod mock;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{ChainError, ExecutionError};
use crate::venue::{Token, Venue};

/// Receipt of a confirmed arbitrage transaction.
#[derive(Debug, Clone)]
pub struct TradeReceipt {
    /// Transaction hash.
    pub tx_hash: B256,
    /// Block the transaction landed in, if known.
    pub block_number: Option<u64>,
    /// Gas consumed, if known.
    pub gas_used: Option<u64>,
}

/// On-chain reads and the opaque settlement call.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// Current block number.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Resolve ERC-20 symbol and decimals for a token contract.
    async fn token_metadata(&self, address: Address) -> Result<Token, ChainError>;

    /// Resolve the pool address for a pair on a venue's factory.
    ///
    /// A factory answering with the zero address is an error; the pair
    /// does not exist on that venue.
    async fn resolve_pool(
        &self,
        venue: &Venue,
        token0: Address,
        token1: Address,
        fee: u32,
    ) -> Result<Address, ChainError>;

    /// Spot price of token0 denominated in token1, as a display-unit decimal.
    async fn pool_price(
        &self,
        venue: &Venue,
        pool: Address,
        token0: &Token,
        token1: &Token,
    ) -> Result<Decimal, ChainError>;

    /// Pool liquidity as base-unit token balances `(amount0, amount1)`.
    async fn pool_liquidity(
        &self,
        pool: Address,
        token0: &Token,
        token1: &Token,
    ) -> Result<(U256, U256), ChainError>;

    /// Simulate: how much `token_in` is required to receive `amount_out`
    /// of `token_out` on this venue.
    async fn quote_exact_output(
        &self,
        venue: &Venue,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_out: U256,
    ) -> Result<U256, ChainError>;

    /// Simulate: how much `token_out` is returned when swapping
    /// `amount_in` of `token_in` on this venue.
    async fn quote_exact_input(
        &self,
        venue: &Venue,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256, ChainError>;

    /// Native-asset balance of an account in base units (wei).
    async fn native_balance(&self, account: Address) -> Result<U256, ChainError>;

    /// ERC-20 balance of an account in base units.
    async fn token_balance(&self, token: &Token, account: Address) -> Result<U256, ChainError>;

    /// The executing account address.
    fn account(&self) -> Address;

    /// Whether a deployed settlement contract is available for submission.
    fn executor_available(&self) -> bool;

    /// Submit the arbitrage trade and await confirmation (zero extra
    /// confirmations). Opaque to the pipeline.
    async fn submit_trade(
        &self,
        routers: [Address; 2],
        tokens: [Address; 2],
        fee: u32,
        amount_in: U256,
    ) -> Result<TradeReceipt, ExecutionError>;
}

pub use events::watch_swaps;
pub use evm::EvmChain;
pub use mock::{MockChain, MockChainConfig};
