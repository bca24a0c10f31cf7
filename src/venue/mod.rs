//! Venue, token, and pair management.
//!
//! This module handles:
//! - Venue and token types shared across the bot
//! - Startup pair resolution into a read-only registry

pub mod registry;
pub mod types;

pub use registry::PairRegistry;
pub use types::{
    ActivePair, FactoryKind, PriceSample, SwapSignal, Token, Venue, VenueId, Venues,
};
