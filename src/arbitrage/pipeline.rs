//! Swap-driven opportunity pipeline.
//!
//! One swap signal drives one full cycle: read both venue prices,
//! compute divergence, resolve a direction, evaluate profitability,
//! and execute. A process-wide single-flight slot ensures at most one
//! cycle runs at a time; signals arriving while a cycle is in flight
//! are dropped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::chain::ChainApi;
use crate::config::Config;
use crate::error::{ChainError, EvalError, ExecutionError};
use crate::venue::{PriceSample, SwapSignal, VenueId, Venues};

use super::direction::resolve_direction;
use super::divergence::price_divergence;
use super::executor::{execute_trade, ExecutionResult};
use super::profitability::evaluate_profitability;

/// How one swap signal was handled.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Another cycle was in flight; the signal was discarded.
    Dropped,
    /// A price read failed; the cycle ended before comparison.
    CheckFailed {
        /// The failing chain call.
        error: ChainError,
    },
    /// Divergence stayed inside the threshold.
    NoDirection {
        /// The observed divergence in percent.
        divergence: Decimal,
    },
    /// A direction resolved but the trade was rejected.
    NotProfitable {
        /// Why the candidate was rejected.
        reason: EvalError,
    },
    /// The cycle ran to completion.
    Completed {
        /// Submitted trade or monitoring-only report.
        result: ExecutionResult,
    },
    /// Execution was attempted and failed.
    Failed {
        /// The execution failure.
        error: ExecutionError,
    },
}

/// The detect/evaluate/execute pipeline behind the single-flight slot.
pub struct OpportunityPipeline {
    chain: Arc<dyn ChainApi>,
    venues: Arc<Venues>,
    config: Arc<Config>,
    in_flight: AtomicBool,
}

/// Releases the single-flight slot on every exit path.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl OpportunityPipeline {
    /// Create a pipeline over the given chain adapter.
    pub fn new(chain: Arc<dyn ChainApi>, venues: Arc<Venues>, config: Arc<Config>) -> Self {
        Self {
            chain,
            venues,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether no cycle is currently in flight.
    pub fn is_idle(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    /// Handle one swap signal, dropping it if a cycle is in flight.
    pub async fn handle_swap(&self, signal: &SwapSignal) -> CycleOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!(pair = %signal.pair.name, "Cycle in flight, dropping swap signal");
            return CycleOutcome::Dropped;
        }
        let _guard = FlightGuard(&self.in_flight);

        let outcome = self.run_cycle(signal).await;
        self.log_outcome(signal, &outcome);
        outcome
    }

    async fn run_cycle(&self, signal: &SwapSignal) -> CycleOutcome {
        let pair = &signal.pair;

        let block = match self.chain.block_number().await {
            Ok(block) => block,
            Err(error) => return CycleOutcome::CheckFailed { error },
        };
        info!(
            block,
            pair = %pair.name,
            venue = %signal.venue,
            "Swap detected, checking prices"
        );

        let price_a = match self.sample(signal, VenueId::A).await {
            Ok(sample) => sample,
            Err(error) => return CycleOutcome::CheckFailed { error },
        };
        let price_b = match self.sample(signal, VenueId::B).await {
            Ok(sample) => sample,
            Err(error) => return CycleOutcome::CheckFailed { error },
        };

        let divergence = price_divergence(&price_a, &price_b, self.config.price_units);
        info!(
            %divergence,
            price_a = %price_a.price,
            price_b = %price_b.price,
            "Price difference"
        );

        let path = match resolve_direction(divergence, self.config.price_difference) {
            Some(path) => path,
            None => return CycleOutcome::NoDirection { divergence },
        };
        info!(
            buy = %self.venues.get(path.buy).name,
            sell = %self.venues.get(path.sell).name,
            "Direction resolved"
        );

        let plan = match evaluate_profitability(
            self.chain.as_ref(),
            &self.venues,
            &path,
            pair,
            &self.config,
        )
        .await
        {
            Ok(plan) => plan,
            Err(reason) => return CycleOutcome::NotProfitable { reason },
        };

        match execute_trade(
            self.chain.as_ref(),
            &self.venues,
            &path,
            pair,
            plan.amount_in,
        )
        .await
        {
            Ok(result) => CycleOutcome::Completed { result },
            Err(error) => CycleOutcome::Failed { error },
        }
    }

    async fn sample(&self, signal: &SwapSignal, venue: VenueId) -> Result<PriceSample, ChainError> {
        let pair = &signal.pair;
        let price = self
            .chain
            .pool_price(
                self.venues.get(venue),
                pair.pool(venue),
                &pair.token0,
                &pair.token1,
            )
            .await?;
        Ok(PriceSample { venue, price })
    }

    fn log_outcome(&self, signal: &SwapSignal, outcome: &CycleOutcome) {
        let pair = &signal.pair.name;
        match outcome {
            CycleOutcome::Dropped => {}
            CycleOutcome::CheckFailed { error } => {
                warn!(%pair, %error, "Price check failed");
            }
            CycleOutcome::NoDirection { divergence } => {
                info!(%pair, %divergence, "No arbitrage direction");
            }
            CycleOutcome::NotProfitable { reason } => {
                info!(%pair, %reason, "Opportunity rejected");
            }
            CycleOutcome::Completed {
                result: ExecutionResult::MonitoringOnly,
            } => {
                info!(%pair, "Opportunity reported (monitoring mode)");
            }
            CycleOutcome::Completed {
                result: ExecutionResult::Submitted { tx_hash, .. },
            } => {
                info!(%pair, %tx_hash, "Arbitrage complete");
            }
            CycleOutcome::Failed { error } => {
                error!(%pair, %error, "Trade execution failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{MockChain, MockChainConfig};
    use crate::units;
    use crate::venue::{ActivePair, FactoryKind, Token, Venue};
    use alloy::primitives::{Address, U256};
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

    fn test_pair() -> Arc<ActivePair> {
        Arc::new(ActivePair {
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
        })
    }

    fn test_config() -> Config {
        Config {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            private_key: "0x01".to_string(),
            arbitrage_address: None,
            is_deployed: false,
            price_difference: dec!(0.50),
            price_units: 2,
            liquidity_fraction: dec!(0.5),
            gas_limit: 400_000,
            gas_price: dec!(0.0000000025),
            pairs_file: "pairs.json".to_string(),
            rust_log: "info".to_string(),
        }
    }

    fn eth(value: Decimal) -> U256 {
        units::parse_units(value, 18).unwrap()
    }

    fn pipeline_with(chain: MockChain) -> OpportunityPipeline {
        OpportunityPipeline::new(
            Arc::new(chain),
            Arc::new(test_venues()),
            Arc::new(test_config()),
        )
    }

    fn signal(pair: &Arc<ActivePair>) -> SwapSignal {
        SwapSignal {
            pair: Arc::clone(pair),
            venue: VenueId::A,
        }
    }

    #[tokio::test]
    async fn balanced_prices_resolve_no_direction() {
        let chain = MockChain::new();
        let pair = test_pair();
        chain.set_price(pair.pool_a, dec!(3000.00));
        chain.set_price(pair.pool_b, dec!(2995.00));

        let pipeline = pipeline_with(chain);
        let outcome = pipeline.handle_swap(&signal(&pair)).await;

        match outcome {
            CycleOutcome::NoDirection { divergence } => assert_eq!(divergence, dec!(0.17)),
            other => panic!("expected NoDirection, got {other:?}"),
        }
        assert!(pipeline.is_idle());
    }

    #[tokio::test]
    async fn price_failure_ends_cycle_and_releases_slot() {
        let chain = MockChain::with_config(MockChainConfig {
            fail_price: true,
            ..Default::default()
        });
        let pair = test_pair();

        let pipeline = pipeline_with(chain);
        let outcome = pipeline.handle_swap(&signal(&pair)).await;

        assert!(matches!(outcome, CycleOutcome::CheckFailed { .. }));
        assert!(pipeline.is_idle());
    }

    #[tokio::test]
    async fn rejected_opportunity_releases_slot() {
        let chain = MockChain::new();
        let pair = test_pair();
        chain.set_price(pair.pool_a, dec!(3050.00));
        chain.set_price(pair.pool_b, dec!(3000.00));
        chain.set_liquidity(pair.pool_a, eth(dec!(100)), eth(dec!(200)));
        chain.set_quote_exact_output(VenueId::A, eth(dec!(1.02)));
        chain.set_quote_exact_input(VenueId::B, eth(dec!(1.00)));

        let pipeline = pipeline_with(chain);
        let outcome = pipeline.handle_swap(&signal(&pair)).await;

        match outcome {
            CycleOutcome::NotProfitable { reason } => {
                assert!(matches!(reason, EvalError::InsufficientReturn { .. }));
            }
            other => panic!("expected NotProfitable, got {other:?}"),
        }
        assert!(pipeline.is_idle());
    }

    #[tokio::test]
    async fn execution_failure_releases_slot() {
        let chain = MockChain::with_config(MockChainConfig {
            executor_available: true,
            fail_submit: true,
            ..Default::default()
        });
        let pair = test_pair();
        chain.set_price(pair.pool_a, dec!(3050.00));
        chain.set_price(pair.pool_b, dec!(3000.00));
        chain.set_liquidity(pair.pool_a, eth(dec!(100)), eth(dec!(200)));
        chain.set_quote_exact_output(VenueId::A, eth(dec!(1.00)));
        chain.set_quote_exact_input(VenueId::B, eth(dec!(1.05)));
        chain.set_native_balance(chain.account(), eth(dec!(0.5)));

        let pipeline = pipeline_with(chain);
        let outcome = pipeline.handle_swap(&signal(&pair)).await;

        assert!(matches!(outcome, CycleOutcome::Failed { .. }));
        assert!(pipeline.is_idle());

        // The next signal is handled, not dropped.
        let again = pipeline.handle_swap(&signal(&pair)).await;
        assert!(matches!(again, CycleOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn concurrent_signal_is_dropped_not_queued() {
        let chain = MockChain::with_config(MockChainConfig {
            latency_ms: 50,
            ..Default::default()
        });
        let pair = test_pair();
        chain.set_price(pair.pool_a, dec!(3000.00));
        chain.set_price(pair.pool_b, dec!(3000.00));

        let pipeline = Arc::new(pipeline_with(chain));
        let first = {
            let pipeline = Arc::clone(&pipeline);
            let signal = signal(&pair);
            tokio::spawn(async move { pipeline.handle_swap(&signal).await })
        };
        // Give the first cycle time to claim the slot.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let second = pipeline.handle_swap(&signal(&pair)).await;

        assert!(matches!(second, CycleOutcome::Dropped));
        assert!(matches!(
            first.await.unwrap(),
            CycleOutcome::NoDirection { .. }
        ));
        assert!(pipeline.is_idle());
    }
}
