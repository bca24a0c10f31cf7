//! Mock chain adapter for unit testing.
//!
//! Provides a [`MockChain`] that can be used in tests without any RPC
//! connectivity: prices, liquidity, quotes, and balances are seeded by
//! the test, and each call family can be made to fail on demand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{ChainError, ExecutionError};
use crate::venue::{Token, Venue, VenueId};

use super::{ChainApi, TradeReceipt};

/// Configuration for mock chain behavior.
#[derive(Debug, Clone, Default)]
pub struct MockChainConfig {
    /// Whether a settlement contract is "deployed".
    pub executor_available: bool,
    /// Fail spot price reads.
    pub fail_price: bool,
    /// Fail liquidity reads.
    pub fail_liquidity: bool,
    /// Fail quote simulations.
    pub fail_quotes: bool,
    /// Fail balance reads.
    pub fail_balances: bool,
    /// Fail trade submission.
    pub fail_submit: bool,
    /// Simulated latency in milliseconds per call.
    pub latency_ms: u64,
}

/// A trade recorded by the mock on submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTrade {
    /// Router path `[buy, sell]`.
    pub routers: [Address; 2],
    /// Token path `[token0, token1]`.
    pub tokens: [Address; 2],
    /// Fee tier.
    pub fee: u32,
    /// Input amount in base units.
    pub amount_in: U256,
}

#[derive(Debug, Default)]
struct MockState {
    block_number: u64,
    tokens: HashMap<Address, Token>,
    pools: HashMap<(VenueId, Address, Address), Address>,
    prices: HashMap<Address, Decimal>,
    liquidity: HashMap<Address, (U256, U256)>,
    exact_output_quotes: HashMap<VenueId, U256>,
    exact_input_quotes: HashMap<VenueId, U256>,
    native_balances: HashMap<Address, U256>,
    token_balances: HashMap<(Address, Address), U256>,
    submit_effect: Option<(U256, U256)>,
    submitted: Vec<SubmittedTrade>,
}

/// Mock chain adapter for testing.
#[derive(Debug, Clone)]
pub struct MockChain {
    config: MockChainConfig,
    state: Arc<Mutex<MockState>>,
    account: Address,
}

impl MockChain {
    /// Create a mock with default configuration (monitoring mode).
    pub fn new() -> Self {
        Self::with_config(MockChainConfig::default())
    }

    /// Create a mock with custom configuration.
    pub fn with_config(config: MockChainConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockState::default())),
            account: Address::repeat_byte(0x11),
        }
    }

    /// Set the current block number.
    pub fn set_block_number(&self, block: u64) {
        self.state.lock().unwrap().block_number = block;
    }

    /// Register token metadata.
    pub fn register_token(&self, token: Token) {
        self.state.lock().unwrap().tokens.insert(token.address, token);
    }

    /// Register a pool for a pair on a venue.
    pub fn register_pool(&self, venue: VenueId, token0: Address, token1: Address, pool: Address) {
        self.state
            .lock()
            .unwrap()
            .pools
            .insert((venue, token0, token1), pool);
    }

    /// Set the spot price for a pool.
    pub fn set_price(&self, pool: Address, price: Decimal) {
        self.state.lock().unwrap().prices.insert(pool, price);
    }

    /// Set pool liquidity `(amount0, amount1)` in base units.
    pub fn set_liquidity(&self, pool: Address, amount0: U256, amount1: U256) {
        self.state
            .lock()
            .unwrap()
            .liquidity
            .insert(pool, (amount0, amount1));
    }

    /// Set the exact-output quote answer (required input) for a venue.
    pub fn set_quote_exact_output(&self, venue: VenueId, amount_in: U256) {
        self.state
            .lock()
            .unwrap()
            .exact_output_quotes
            .insert(venue, amount_in);
    }

    /// Set the exact-input quote answer (returned output) for a venue.
    pub fn set_quote_exact_input(&self, venue: VenueId, amount_out: U256) {
        self.state
            .lock()
            .unwrap()
            .exact_input_quotes
            .insert(venue, amount_out);
    }

    /// Set a native-asset balance.
    pub fn set_native_balance(&self, account: Address, balance: U256) {
        self.state
            .lock()
            .unwrap()
            .native_balances
            .insert(account, balance);
    }

    /// Set an ERC-20 balance.
    pub fn set_token_balance(&self, token: Address, account: Address, balance: U256) {
        self.state
            .lock()
            .unwrap()
            .token_balances
            .insert((token, account), balance);
    }

    /// Make submission settle the executing account's balances to the
    /// given native/token0 values, so before/after deltas are observable.
    pub fn set_submit_effect(&self, native_after: U256, token0_after: U256) {
        self.state.lock().unwrap().submit_effect = Some((native_after, token0_after));
    }

    /// Trades recorded by `submit_trade`.
    pub fn submitted(&self) -> Vec<SubmittedTrade> {
        self.state.lock().unwrap().submitted.clone()
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainApi for MockChain {
    async fn block_number(&self) -> Result<u64, ChainError> {
        self.simulate_latency().await;
        Ok(self.state.lock().unwrap().block_number)
    }

    async fn token_metadata(&self, address: Address) -> Result<Token, ChainError> {
        self.simulate_latency().await;
        self.state
            .lock()
            .unwrap()
            .tokens
            .get(&address)
            .cloned()
            .ok_or_else(|| ChainError::Call(format!("unknown token {address}")))
    }

    async fn resolve_pool(
        &self,
        venue: &Venue,
        token0: Address,
        token1: Address,
        _fee: u32,
    ) -> Result<Address, ChainError> {
        self.simulate_latency().await;
        self.state
            .lock()
            .unwrap()
            .pools
            .get(&(venue.id, token0, token1))
            .copied()
            .ok_or_else(|| ChainError::Call("factory returned zero address".to_string()))
    }

    async fn pool_price(
        &self,
        _venue: &Venue,
        pool: Address,
        _token0: &Token,
        _token1: &Token,
    ) -> Result<Decimal, ChainError> {
        self.simulate_latency().await;
        if self.config.fail_price {
            return Err(ChainError::Rpc("mock price failure".to_string()));
        }
        self.state
            .lock()
            .unwrap()
            .prices
            .get(&pool)
            .copied()
            .ok_or_else(|| ChainError::Call(format!("no price for pool {pool}")))
    }

    async fn pool_liquidity(
        &self,
        pool: Address,
        _token0: &Token,
        _token1: &Token,
    ) -> Result<(U256, U256), ChainError> {
        self.simulate_latency().await;
        if self.config.fail_liquidity {
            return Err(ChainError::Rpc("mock liquidity failure".to_string()));
        }
        self.state
            .lock()
            .unwrap()
            .liquidity
            .get(&pool)
            .copied()
            .ok_or_else(|| ChainError::Call(format!("no liquidity for pool {pool}")))
    }

    async fn quote_exact_output(
        &self,
        venue: &Venue,
        _token_in: Address,
        _token_out: Address,
        _fee: u32,
        _amount_out: U256,
    ) -> Result<U256, ChainError> {
        self.simulate_latency().await;
        if self.config.fail_quotes {
            return Err(ChainError::Call("mock quote failure".to_string()));
        }
        self.state
            .lock()
            .unwrap()
            .exact_output_quotes
            .get(&venue.id)
            .copied()
            .ok_or_else(|| ChainError::Call(format!("no exact-output quote for {}", venue.id)))
    }

    async fn quote_exact_input(
        &self,
        venue: &Venue,
        _token_in: Address,
        _token_out: Address,
        _fee: u32,
        _amount_in: U256,
    ) -> Result<U256, ChainError> {
        self.simulate_latency().await;
        if self.config.fail_quotes {
            return Err(ChainError::Call("mock quote failure".to_string()));
        }
        self.state
            .lock()
            .unwrap()
            .exact_input_quotes
            .get(&venue.id)
            .copied()
            .ok_or_else(|| ChainError::Call(format!("no exact-input quote for {}", venue.id)))
    }

    async fn native_balance(&self, account: Address) -> Result<U256, ChainError> {
        self.simulate_latency().await;
        if self.config.fail_balances {
            return Err(ChainError::Rpc("mock balance failure".to_string()));
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .native_balances
            .get(&account)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn token_balance(&self, token: &Token, account: Address) -> Result<U256, ChainError> {
        self.simulate_latency().await;
        if self.config.fail_balances {
            return Err(ChainError::Rpc("mock balance failure".to_string()));
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .token_balances
            .get(&(token.address, account))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    fn account(&self) -> Address {
        self.account
    }

    fn executor_available(&self) -> bool {
        self.config.executor_available
    }

    async fn submit_trade(
        &self,
        routers: [Address; 2],
        tokens: [Address; 2],
        fee: u32,
        amount_in: U256,
    ) -> Result<TradeReceipt, ExecutionError> {
        self.simulate_latency().await;
        if self.config.fail_submit {
            return Err(ExecutionError::SubmissionFailed(
                "mock submission failure".to_string(),
            ));
        }

        let mut state = self.state.lock().unwrap();
        state.submitted.push(SubmittedTrade {
            routers,
            tokens,
            fee,
            amount_in,
        });

        if let Some((native_after, token0_after)) = state.submit_effect {
            state.native_balances.insert(self.account, native_after);
            state
                .token_balances
                .insert((tokens[0], self.account), token0_after);
        }

        let block = state.block_number;
        Ok(TradeReceipt {
            tx_hash: B256::repeat_byte(0x42),
            block_number: Some(block),
            gas_used: Some(210_000),
        })
    }
}
