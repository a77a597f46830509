//! Deal selection: a single left-to-right pass over the result cards of one
//! search, returning the lowest-priced eligible candidate.
//!
//! Eligibility, in order:
//! 1. cards carrying the sponsored marker are never winners;
//! 2. the raw price text must pass the strict parse (stricter than the
//!    extractor's infinity degradation — an unparseable price is a hard
//!    skip here);
//! 3. the price must reach the department floor, which screens out
//!    accessory listings priced far below the primary product.
//!
//! Ties keep the earliest-seen candidate (strict `<`, not `<=`). An empty
//! outcome is a normal result, not an error.

use dealhawk_core::{CandidateListing, Department};

use crate::extract::{extract_listing, parse_price_strict};
use crate::markup::ResultCard;

/// Text marker identifying a sponsored placement anywhere in a card.
pub const SPONSORED_MARKER: &str = "Sponsored";

/// Selects the minimum-price eligible candidate from `cards`, or `None`
/// when nothing qualifies.
#[must_use]
pub fn select_deal(
    cards: &[ResultCard<'_>],
    department: Department,
    origin: &str,
) -> Option<CandidateListing> {
    let floor = department.price_floor();
    let mut best: Option<CandidateListing> = None;
    let mut best_price = f64::INFINITY;

    for card in cards {
        if card.full_text().contains(SPONSORED_MARKER) {
            continue;
        }

        let listing = extract_listing(card, origin);

        let Some(price) = parse_price_strict(&listing.display_price) else {
            continue;
        };

        if price < floor {
            tracing::debug!(
                title = %listing.title,
                price,
                %department,
                "skipping candidate below department price floor"
            );
            continue;
        }

        if price < best_price {
            best_price = price;
            best = Some(listing);
        }
    }

    best
}

#[cfg(test)]
#[path = "select_test.rs"]
mod select_test;
