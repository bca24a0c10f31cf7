//! Pair registry: resolves configured pairs into monitored pairs at startup.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::chain::ChainApi;
use crate::config::{PairEntry, PairFile, VenueEntry};
use crate::error::SetupError;

use super::types::{ActivePair, Venue, VenueId, Venues};

/// The set of monitored pairs plus the two venue singletons.
///
/// Built once at startup; read-only afterwards.
#[derive(Debug, Clone)]
pub struct PairRegistry {
    venues: Arc<Venues>,
    pairs: Vec<Arc<ActivePair>>,
}

impl PairRegistry {
    /// Resolve the pair file into an active registry.
    ///
    /// Venue address-book errors are fatal; a pair that fails resolution
    /// is logged and excluded without aborting startup.
    pub async fn build(chain: &dyn ChainApi, file: &PairFile) -> Result<Self, SetupError> {
        let venues = Arc::new(Venues {
            a: resolve_venue(VenueId::A, &file.venue_a)?,
            b: resolve_venue(VenueId::B, &file.venue_b)?,
        });

        let mut pairs = Vec::with_capacity(file.pairs.len());

        for entry in &file.pairs {
            info!(pair = %entry.name, "Setting up pair");
            match resolve_pair(chain, &venues, entry).await {
                Ok(pair) => {
                    info!(
                        pair = %pair.name,
                        pool_a = %pair.pool_a,
                        pool_b = %pair.pool_b,
                        "Pair resolved"
                    );
                    pairs.push(Arc::new(pair));
                }
                Err(e) => {
                    warn!(pair = %entry.name, error = %e, "Failed to set up pair, excluding");
                }
            }
        }

        Ok(Self { venues, pairs })
    }

    /// The two venue singletons.
    pub fn venues(&self) -> Arc<Venues> {
        Arc::clone(&self.venues)
    }

    /// All actively monitored pairs.
    pub fn pairs(&self) -> &[Arc<ActivePair>] {
        &self.pairs
    }

    /// Whether any pair survived resolution.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All pool addresses across both venues, for event filtering.
    pub fn pool_addresses(&self) -> Vec<Address> {
        self.pairs
            .iter()
            .flat_map(|p| [p.pool_a, p.pool_b])
            .collect()
    }

    /// Find the pair and venue a pool address belongs to.
    pub fn pair_by_pool(&self, pool: Address) -> Option<(Arc<ActivePair>, VenueId)> {
        self.pairs.iter().find_map(|p| {
            if p.pool_a == pool {
                Some((Arc::clone(p), VenueId::A))
            } else if p.pool_b == pool {
                Some((Arc::clone(p), VenueId::B))
            } else {
                None
            }
        })
    }
}

fn resolve_venue(id: VenueId, entry: &VenueEntry) -> Result<Venue, SetupError> {
    let parse = |field: &str, value: &str| -> Result<Address, SetupError> {
        value.parse().map_err(|_| SetupError::InvalidAddress {
            address: format!("{field}={value}"),
            pair: entry.name.clone(),
        })
    };

    Ok(Venue {
        id,
        name: entry.name.clone(),
        kind: entry.kind,
        factory: parse("factory", &entry.factory)?,
        quoter: parse("quoter", &entry.quoter)?,
        router: parse("router", &entry.router)?,
    })
}

async fn resolve_pair(
    chain: &dyn ChainApi,
    venues: &Venues,
    entry: &PairEntry,
) -> Result<ActivePair, SetupError> {
    let token0_addr: Address = entry
        .token0
        .parse()
        .map_err(|_| SetupError::InvalidAddress {
            address: entry.token0.clone(),
            pair: entry.name.clone(),
        })?;
    let token1_addr: Address = entry
        .token1
        .parse()
        .map_err(|_| SetupError::InvalidAddress {
            address: entry.token1.clone(),
            pair: entry.name.clone(),
        })?;

    let token0 = chain.token_metadata(token0_addr).await.map_err(|e| {
        SetupError::TokenResolution {
            address: entry.token0.clone(),
            reason: e.to_string(),
        }
    })?;
    let token1 = chain.token_metadata(token1_addr).await.map_err(|e| {
        SetupError::TokenResolution {
            address: entry.token1.clone(),
            reason: e.to_string(),
        }
    })?;

    let pool_a = chain
        .resolve_pool(&venues.a, token0_addr, token1_addr, entry.fee)
        .await
        .map_err(|e| SetupError::PoolResolution {
            pair: entry.name.clone(),
            venue: VenueId::A,
            reason: e.to_string(),
        })?;
    let pool_b = chain
        .resolve_pool(&venues.b, token0_addr, token1_addr, entry.fee)
        .await
        .map_err(|e| SetupError::PoolResolution {
            pair: entry.name.clone(),
            venue: VenueId::B,
            reason: e.to_string(),
        })?;

    Ok(ActivePair {
        name: entry.name.clone(),
        token0,
        token1,
        fee: entry.fee,
        pool_a,
        pool_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{MockChain, MockChainConfig};
    use crate::venue::Token;

    fn test_file() -> PairFile {
        serde_json::from_str(
            r#"{
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
                { "name": "WETH/ARB", "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", "token1": "0x912CE59144191C1204E64559FE8253a0e49E6548", "fee": 500 },
                { "name": "WETH/GMX", "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", "token1": "0xfc5A1A6EB076a2C7aD06eD22C90d7E710E35ad0a", "fee": 500 }
            ]
        }"#,
        )
        .unwrap()
    }

    fn seed_tokens(chain: &MockChain, file: &PairFile) {
        for (addr, symbol) in [
            (&file.pairs[0].token0, "WETH"),
            (&file.pairs[0].token1, "ARB"),
            (&file.pairs[1].token1, "GMX"),
        ] {
            chain.register_token(Token {
                address: addr.parse().unwrap(),
                symbol: symbol.to_string(),
                decimals: 18,
            });
        }
    }

    #[tokio::test]
    async fn build_resolves_all_pairs() {
        let chain = MockChain::new();
        let file = test_file();
        seed_tokens(&chain, &file);

        for entry in &file.pairs {
            for venue in [VenueId::A, VenueId::B] {
                chain.register_pool(
                    venue,
                    entry.token0.parse().unwrap(),
                    entry.token1.parse().unwrap(),
                    Address::repeat_byte(if venue == VenueId::A { 0xaa } else { 0xbb }),
                );
            }
        }

        let registry = PairRegistry::build(&chain, &file).await.unwrap();
        assert_eq!(registry.pairs().len(), 2);
        assert_eq!(registry.pool_addresses().len(), 4);
    }

    #[tokio::test]
    async fn failing_pair_is_excluded_not_fatal() {
        let chain = MockChain::new();
        let file = test_file();
        seed_tokens(&chain, &file);

        // Only the first pair gets pools on both venues.
        let entry = &file.pairs[0];
        chain.register_pool(
            VenueId::A,
            entry.token0.parse().unwrap(),
            entry.token1.parse().unwrap(),
            Address::repeat_byte(0xaa),
        );
        chain.register_pool(
            VenueId::B,
            entry.token0.parse().unwrap(),
            entry.token1.parse().unwrap(),
            Address::repeat_byte(0xbb),
        );

        let registry = PairRegistry::build(&chain, &file).await.unwrap();
        assert_eq!(registry.pairs().len(), 1);
        assert_eq!(registry.pairs()[0].name, "WETH/ARB");
    }

    #[tokio::test]
    async fn pair_by_pool_maps_address_to_venue() {
        let chain = MockChain::with_config(MockChainConfig::default());
        let file = test_file();
        seed_tokens(&chain, &file);

        let entry = &file.pairs[0];
        chain.register_pool(
            VenueId::A,
            entry.token0.parse().unwrap(),
            entry.token1.parse().unwrap(),
            Address::repeat_byte(0xaa),
        );
        chain.register_pool(
            VenueId::B,
            entry.token0.parse().unwrap(),
            entry.token1.parse().unwrap(),
            Address::repeat_byte(0xbb),
        );

        let registry = PairRegistry::build(&chain, &file).await.unwrap();

        let (pair, venue) = registry.pair_by_pool(Address::repeat_byte(0xbb)).unwrap();
        assert_eq!(pair.name, "WETH/ARB");
        assert_eq!(venue, VenueId::B);
        assert!(registry.pair_by_pool(Address::repeat_byte(0x01)).is_none());
    }
}
