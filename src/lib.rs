//! Two-venue DEX arbitrage bot.
//!
//! Watches the same token pair's pools on two liquidity venues, reacts
//! to swap events, and runs a detect/evaluate/execute cycle behind a
//! process-wide single-flight slot. Without a deployed arbitrage
//! contract the bot runs in monitoring mode and only reports what it
//! would have traded.
//!
//! All monetary values use `Decimal` in display units and `U256` in
//! base units. NEVER use f64 for money.

pub mod arbitrage;
pub mod chain;
pub mod config;
pub mod error;
pub mod units;
pub mod venue;

pub use config::Config;
pub use error::{BotError, Result};
