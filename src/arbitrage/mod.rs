//! Cross-venue arbitrage detection and execution.
//!
//! The pipeline runs in stages: [`divergence`] compares the two venue
//! prices, [`direction`] maps the divergence to a buy/sell path,
//! [`profitability`] simulates both legs and projects balances, and
//! [`executor`] submits the trade. [`pipeline`] wires the stages behind
//! the single-flight slot.

pub mod direction;
pub mod divergence;
pub mod executor;
pub mod pipeline;
pub mod profitability;

pub use direction::{resolve_direction, ExchangePath};
pub use divergence::price_divergence;
pub use executor::{execute_trade, ExecutionOutcome, ExecutionResult};
pub use pipeline::{CycleOutcome, OpportunityPipeline};
pub use profitability::{evaluate_profitability, ProfitReport, TradePlan};
