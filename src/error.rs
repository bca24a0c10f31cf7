//! Unified error types for the arbitrage bot.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::venue::VenueId;

/// Top-level error type for the arbitrage bot.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Pair/venue file parsing error.
    #[error("pair file error: {0}")]
    PairFile(#[from] serde_json::Error),

    /// Pair setup error.
    #[error("setup error: {0}")]
    Setup(#[from] SetupError),

    /// On-chain read/call error.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// Trade execution error.
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pair resolution errors at startup.
///
/// These are logged and the affected pair is excluded from monitoring;
/// they never abort startup.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Token metadata could not be resolved.
    #[error("failed to resolve token {address}: {reason}")]
    TokenResolution {
        /// Token contract address.
        address: String,
        /// Reason for failure.
        reason: String,
    },

    /// Pool lookup failed or returned no pool.
    #[error("no pool for pair {pair} on {venue}: {reason}")]
    PoolResolution {
        /// Pair name from configuration.
        pair: String,
        /// Venue the lookup ran against.
        venue: VenueId,
        /// Reason for failure.
        reason: String,
    },

    /// Invalid address in the pair file.
    #[error("invalid address {address} in pair {pair}")]
    InvalidAddress {
        /// The malformed address string.
        address: String,
        /// Pair name from configuration.
        pair: String,
    },
}

/// Errors from the chain adapter (RPC reads, quotes, balances).
#[derive(Error, Debug)]
pub enum ChainError {
    /// RPC transport or provider error.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Contract call reverted or returned malformed data.
    #[error("contract call failed: {0}")]
    Call(String),

    /// Amount could not be represented at the requested precision.
    #[error("amount conversion failed: {0}")]
    Conversion(String),
}

/// Profitability evaluation rejections.
///
/// Every variant is terminal for the current cycle and downgraded to
/// "not profitable" by the pipeline; none of these propagate further.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Round trip returns less token0 than it costs.
    #[error("not enough returned to pay back: required {required}, returned {returned}")]
    InsufficientReturn {
        /// token0 required on the buy venue (display units).
        required: Decimal,
        /// token0 returned on the sell venue (display units).
        returned: Decimal,
    },

    /// Projected native balance after gas would be negative.
    #[error("not enough native balance for gas: have {balance}, gas cost {gas_cost}")]
    InsufficientGasFunds {
        /// Current native balance (display units).
        balance: Decimal,
        /// Estimated gas cost (display units).
        gas_cost: Decimal,
    },

    /// A liquidity or quote call failed mid-evaluation.
    #[error("quote or liquidity call failed: {0}")]
    Adapter(#[from] ChainError),
}

/// Trade execution errors.
///
/// Fatal to the current cycle only; the single-flight guard is still
/// released and no retry is attempted.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Called with a zero trade amount.
    #[error("trade amount must be positive")]
    ZeroAmount,

    /// Transaction submission failed.
    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),

    /// Transaction was submitted but confirmation failed.
    #[error("transaction confirmation failed: {0}")]
    ConfirmationFailed(String),

    /// Balance read around the trade failed.
    #[error("balance read failed: {0}")]
    Balance(#[from] ChainError),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;
