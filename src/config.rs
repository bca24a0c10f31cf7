//! Application configuration loaded from environment variables.
//!
//! Secrets and tunables come from the environment (`.env` supported);
//! the venue address book and monitored pair list come from a JSON file
//! (see [`PairFile`]).

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::BotError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Chain Connection ===
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Wallet private key (hex, starts with 0x).
    pub private_key: String,

    // === Execution Contract ===
    /// Deployed arbitrage contract address.
    #[serde(default)]
    pub arbitrage_address: Option<String>,

    /// Whether the arbitrage contract is deployed. When false the bot
    /// detects opportunities but never submits a trade.
    #[serde(default)]
    pub is_deployed: bool,

    // === Strategy Parameters ===
    /// Divergence threshold in percent that triggers a direction (e.g. 0.50).
    #[serde(default = "default_price_difference")]
    pub price_difference: Decimal,

    /// Decimal places used when fixing venue prices before comparison.
    #[serde(default = "default_price_units")]
    pub price_units: u32,

    /// Fraction of sell-side pool liquidity used to size the trial trade.
    #[serde(default = "default_liquidity_fraction")]
    pub liquidity_fraction: Decimal,

    // === Gas Projection ===
    /// Gas limit assumed for the arbitrage transaction.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    /// Gas price in native-asset units per gas (e.g. 0.0000000006 ETH).
    #[serde(default = "default_gas_price")]
    pub gas_price: Decimal,

    // === Pair File ===
    /// Path to the venue/pair JSON file.
    #[serde(default = "default_pairs_file")]
    pub pairs_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_price_difference() -> Decimal {
    Decimal::new(50, 2) // 0.50%
}

fn default_price_units() -> u32 {
    2
}

fn default_liquidity_fraction() -> Decimal {
    Decimal::new(5, 1) // 0.5
}

fn default_gas_limit() -> u64 {
    400_000
}

fn default_gas_price() -> Decimal {
    // 0.6 gwei, expressed in native units per gas
    Decimal::new(6, 10)
}

fn default_pairs_file() -> String {
    "pairs.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.rpc_url.is_empty() {
            return Err("RPC_URL is required".to_string());
        }

        if self.private_key.is_empty() {
            return Err("PRIVATE_KEY is required".to_string());
        }

        if !self.private_key.starts_with("0x") {
            return Err("PRIVATE_KEY must start with 0x".to_string());
        }

        if self.price_difference <= Decimal::ZERO {
            return Err("PRICE_DIFFERENCE must be positive".to_string());
        }

        if self.liquidity_fraction <= Decimal::ZERO || self.liquidity_fraction > Decimal::ONE {
            return Err("LIQUIDITY_FRACTION must be in (0, 1]".to_string());
        }

        if self.is_deployed && self.arbitrage_address.is_none() {
            return Err("ARBITRAGE_ADDRESS is required when IS_DEPLOYED=true".to_string());
        }

        Ok(())
    }

    /// Estimated gas cost of one arbitrage transaction in native units.
    pub fn estimated_gas_cost(&self) -> Decimal {
        Decimal::from(self.gas_limit) * self.gas_price
    }
}

/// One venue's address book from the pair file.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueEntry {
    /// Human-readable venue name.
    pub name: String,
    /// Factory flavor ("uniswap-v3" or "algebra-v3").
    #[serde(default)]
    pub kind: crate::venue::FactoryKind,
    /// Factory contract address.
    pub factory: String,
    /// Quoter contract address.
    pub quoter: String,
    /// Swap router contract address.
    pub router: String,
}

/// One monitored pair from the pair file.
#[derive(Debug, Clone, Deserialize)]
pub struct PairEntry {
    /// Pair name (e.g. "WETH/ARB").
    pub name: String,
    /// token0 contract address.
    pub token0: String,
    /// token1 contract address.
    pub token1: String,
    /// Pool fee tier (e.g. 500 = 0.05%).
    pub fee: u32,
}

/// Venue address book and monitored pair list.
#[derive(Debug, Clone, Deserialize)]
pub struct PairFile {
    /// Venue A (direction \[A, B\] buys here on positive divergence).
    pub venue_a: VenueEntry,
    /// Venue B.
    pub venue_b: VenueEntry,
    /// Pairs to monitor.
    pub pairs: Vec<PairEntry>,
}

impl PairFile {
    /// Load the venue/pair file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BotError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_config() -> Config {
        Config {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            private_key: "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
                .to_string(),
            arbitrage_address: None,
            is_deployed: false,
            price_difference: default_price_difference(),
            price_units: default_price_units(),
            liquidity_fraction: default_liquidity_fraction(),
            gas_limit: default_gas_limit(),
            gas_price: default_gas_price(),
            pairs_file: default_pairs_file(),
            rust_log: default_log_level(),
        }
    }

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_price_difference(), dec!(0.50));
        assert_eq!(default_liquidity_fraction(), dec!(0.5));
        assert_eq!(default_gas_limit(), 400_000);
        assert_eq!(default_price_units(), 2);
    }

    #[test]
    fn validate_accepts_monitoring_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_private_key_prefix() {
        let mut config = test_config();
        config.private_key = "abc123".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_deployed_without_address() {
        let mut config = test_config();
        config.is_deployed = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_fraction() {
        let mut config = test_config();
        config.liquidity_fraction = dec!(1.5);
        assert!(config.validate().is_err());

        config.liquidity_fraction = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn estimated_gas_cost_is_limit_times_price() {
        let config = test_config();
        assert_eq!(
            config.estimated_gas_cost(),
            Decimal::from(400_000u64) * dec!(0.0000000006)
        );
    }

    #[test]
    fn pair_file_parses() {
        let raw = r#"{
            "venue_a": {
                "name": "Uniswap V3",
                "factory": "0x1F98431c8aD98523631AE4a59f267346ea31F984",
                "quoter": "0x61fFE014bA17989E743c5F6cB21bF9697530B21e",
                "router": "0xE592427A0AEce92De3Edee1F18E0157C05861564"
            },
            "venue_b": {
                "name": "Camelot V3",
                "kind": "algebra-v3",
                "factory": "0x1a3c9B1d2F0529D97f2afC5136Cc23e58f1FD35B",
                "quoter": "0x0Fc73040b26E9bC8514fA028D998E73A254Fa76E",
                "router": "0x1F721E2E82F6676FCE4eA07A5958cF098D339e18"
            },
            "pairs": [
                { "name": "WETH/ARB", "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", "token1": "0x912CE59144191C1204E64559FE8253a0e49E6548", "fee": 500 }
            ]
        }"#;

        let file: PairFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.venue_a.name, "Uniswap V3");
        assert_eq!(file.venue_a.kind, crate::venue::FactoryKind::UniswapV3);
        assert_eq!(file.venue_b.kind, crate::venue::FactoryKind::AlgebraV3);
        assert_eq!(file.pairs.len(), 1);
        assert_eq!(file.pairs[0].fee, 500);
    }
}
