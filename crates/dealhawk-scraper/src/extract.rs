//! Listing extraction: one result card in, exactly one [`CandidateListing`]
//! out. Extraction is total — a card with no extractable markup yields a
//! listing with every field at its sentinel, never an error.

use dealhawk_core::listing::{CandidateListing, NO_IMAGE, NO_LINK, NO_PRICE, NO_TITLE};

use crate::markup::ResultCard;

/// Extracts a structured candidate from a single result card.
///
/// No ordering or filtering decisions are made here; a listing with an
/// unparseable price comes back with `numeric_price == INFINITY` and stays
/// in the candidate set, inert to minimum-price comparisons.
#[must_use]
pub fn extract_listing(card: &ResultCard<'_>, origin: &str) -> CandidateListing {
    let title = card.heading_text().unwrap_or_else(|| NO_TITLE.to_string());

    let mut display_price = card
        .price_whole_text()
        .unwrap_or_else(|| NO_PRICE.to_string());
    // Decimal prices are split across two sibling nodes; reattach the
    // fraction only when a whole part was actually found.
    if display_price != NO_PRICE {
        if let Some(fraction) = card.price_fraction_text() {
            display_price = format!("{display_price}.{fraction}");
        }
    }

    let link = card
        .product_href()
        .map_or_else(|| NO_LINK.to_string(), |href| absolutize(origin, &href));

    let image_url = card.image_src().unwrap_or_else(|| NO_IMAGE.to_string());

    CandidateListing {
        numeric_price: parse_price_lenient(&display_price),
        title,
        display_price,
        link,
        image_url,
    }
}

/// Parses a displayed price, degrading to `INFINITY` on failure so the
/// candidate can never win a minimum comparison.
pub(crate) fn parse_price_lenient(display_price: &str) -> f64 {
    parse_price_strict(display_price).unwrap_or(f64::INFINITY)
}

/// Strict price parse used by the selection eligibility check: strips
/// thousands separators and surrounding whitespace, then requires a clean
/// finite parse.
#[must_use]
pub fn parse_price_strict(display_price: &str) -> Option<f64> {
    let cleaned = display_price.replace(',', "");
    let parsed = cleaned.trim().parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

fn absolutize(origin: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{origin}{href}")
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;
