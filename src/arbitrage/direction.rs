//! Direction resolution from a signed divergence.

use rust_decimal::Decimal;

use crate::venue::VenueId;

/// Buy-venue/sell-venue ordering for one opportunity.
///
/// Ephemeral: lives only for the duration of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangePath {
    /// Venue to buy token1 on.
    pub buy: VenueId,
    /// Venue to sell token1 on.
    pub sell: VenueId,
}

/// Map a signed divergence to a direction, or `None` when the divergence
/// stays inside the threshold band.
///
/// The threshold is inclusive: exactly `+T` or `-T` still resolves to a
/// path.
pub fn resolve_direction(divergence: Decimal, threshold: Decimal) -> Option<ExchangePath> {
    if divergence >= threshold {
        // Venue A is expensive relative to B: token1 is cheap on A.
        Some(ExchangePath {
            buy: VenueId::A,
            sell: VenueId::B,
        })
    } else if divergence <= -threshold {
        Some(ExchangePath {
            buy: VenueId::B,
            sell: VenueId::A,
        })
    } else {
        None
    }
}
