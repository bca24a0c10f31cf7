//! Venue, token, and pair types shared across the bot.

use std::sync::Arc;

use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier for one of the two monitored venues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum VenueId {
    /// Venue A (e.g. Uniswap V3). Positive divergence buys here.
    #[strum(to_string = "A", serialize = "a", serialize = "venue-a")]
    #[default]
    A,
    /// Venue B (e.g. Camelot V3).
    #[strum(to_string = "B", serialize = "b", serialize = "venue-b")]
    B,
}

impl VenueId {
    /// Get the opposite venue.
    pub fn opposite(&self) -> Self {
        match self {
            VenueId::A => VenueId::B,
            VenueId::B => VenueId::A,
        }
    }
}

/// Factory contract flavor, which determines the pool lookup call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FactoryKind {
    /// Uniswap V3 style: `getPool(tokenA, tokenB, fee)`.
    #[default]
    UniswapV3,
    /// Algebra style (Camelot V3): `poolByPair(tokenA, tokenB)`.
    AlgebraV3,
}

/// One of the two liquidity venues being compared.
#[derive(Debug, Clone)]
pub struct Venue {
    /// Which slot this venue occupies.
    pub id: VenueId,
    /// Human-readable name (e.g. "Uniswap V3").
    pub name: String,
    /// Factory flavor for pool lookups.
    pub kind: FactoryKind,
    /// Factory contract address.
    pub factory: Address,
    /// Quoter contract address.
    pub quoter: Address,
    /// Swap router contract address.
    pub router: Address,
}

/// The two venue singletons.
#[derive(Debug, Clone)]
pub struct Venues {
    /// Venue A.
    pub a: Venue,
    /// Venue B.
    pub b: Venue,
}

impl Venues {
    /// Get a venue by id.
    pub fn get(&self, id: VenueId) -> &Venue {
        match id {
            VenueId::A => &self.a,
            VenueId::B => &self.b,
        }
    }
}

/// Resolved ERC-20 token metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token contract address.
    pub address: Address,
    /// Token symbol (e.g. "WETH").
    pub symbol: String,
    /// Decimal precision of base units.
    pub decimals: u8,
}

/// A fully resolved, actively monitored token pair.
#[derive(Debug, Clone)]
pub struct ActivePair {
    /// Pair name from configuration (e.g. "WETH/ARB").
    pub name: String,
    /// Quote-side token (the asset profit is measured in).
    pub token0: Token,
    /// Traded token.
    pub token1: Token,
    /// Pool fee tier.
    pub fee: u32,
    /// Pool address on venue A.
    pub pool_a: Address,
    /// Pool address on venue B.
    pub pool_b: Address,
}

impl ActivePair {
    /// Get the pool address on the given venue.
    pub fn pool(&self, venue: VenueId) -> Address {
        match venue {
            VenueId::A => self.pool_a,
            VenueId::B => self.pool_b,
        }
    }
}

/// Spot price observed on one venue. Ephemeral, produced per check.
#[derive(Debug, Clone, Copy)]
pub struct PriceSample {
    /// Venue the price was read from.
    pub venue: VenueId,
    /// Price of token0 denominated in token1, at display precision.
    pub price: Decimal,
}

/// Notification that a swap happened on a monitored pool.
///
/// Carries the pair identity explicitly; the pipeline never captures
/// venue or token state through closures.
#[derive(Debug, Clone)]
pub struct SwapSignal {
    /// The pair the swapped pool belongs to.
    pub pair: Arc<ActivePair>,
    /// The venue the swap happened on.
    pub venue: VenueId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venue_id_opposite() {
        assert_eq!(VenueId::A.opposite(), VenueId::B);
        assert_eq!(VenueId::B.opposite(), VenueId::A);
    }

    #[test]
    fn venue_id_display() {
        assert_eq!(VenueId::A.to_string(), "A");
        assert_eq!("venue-b".parse::<VenueId>().unwrap(), VenueId::B);
    }

    #[test]
    fn pair_pool_lookup() {
        let pair = ActivePair {
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
        };

        assert_eq!(pair.pool(VenueId::A), Address::repeat_byte(0xaa));
        assert_eq!(pair.pool(VenueId::B), Address::repeat_byte(0xbb));
    }
}
