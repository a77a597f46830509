//! The candidate listing extracted from a single search-result card.
//!
//! ## Sentinel policy
//!
//! Every field independently degrades to an explicit "not found" value when
//! its markup node is absent; extraction never fails and never omits a
//! field. The numeric price uses `f64::INFINITY` as its sentinel so that a
//! listing with no parseable price can never win a minimum-price
//! comparison, while still flowing through the pipeline unfiltered.

use serde::{Deserialize, Serialize};

/// Sentinel for a card with no heading node.
pub const NO_TITLE: &str = "No title found";
/// Sentinel for a card with no whole-price node.
pub const NO_PRICE: &str = "No price found";
/// Sentinel for a card with no product-link anchor.
pub const NO_LINK: &str = "No link found";
/// Sentinel for a card with no result image.
pub const NO_IMAGE: &str = "No image found";

/// One extracted, not-yet-filtered product record from a single
/// search-result card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateListing {
    /// Trimmed heading text, or [`NO_TITLE`].
    pub title: String,
    /// Locale-formatted price text as displayed (thousands separators,
    /// fraction reattached from its own markup node), or [`NO_PRICE`].
    pub display_price: String,
    /// Parsed price; `f64::INFINITY` when [`display_price`] is absent or
    /// unparseable.
    ///
    /// [`display_price`]: CandidateListing::display_price
    #[serde(default = "infinity")]
    pub numeric_price: f64,
    /// Absolute product URL (marketplace origin + relative href), or
    /// [`NO_LINK`].
    pub link: String,
    /// Absolute image URL, or [`NO_IMAGE`].
    pub image_url: String,
}

impl CandidateListing {
    /// A listing with every field at its sentinel, as produced from a card
    /// with no extractable markup.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            title: NO_TITLE.to_string(),
            display_price: NO_PRICE.to_string(),
            numeric_price: f64::INFINITY,
            link: NO_LINK.to_string(),
            image_url: NO_IMAGE.to_string(),
        }
    }

    /// Returns `true` when the numeric price is a real, finite value.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.numeric_price.is_finite()
    }
}

fn infinity() -> f64 {
    f64::INFINITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_uses_all_sentinels() {
        let listing = CandidateListing::empty();
        assert_eq!(listing.title, NO_TITLE);
        assert_eq!(listing.display_price, NO_PRICE);
        assert!(listing.numeric_price.is_infinite());
        assert_eq!(listing.link, NO_LINK);
        assert_eq!(listing.image_url, NO_IMAGE);
    }

    #[test]
    fn has_price_false_for_sentinel() {
        assert!(!CandidateListing::empty().has_price());
    }

    #[test]
    fn has_price_true_for_finite_price() {
        let listing = CandidateListing {
            numeric_price: 1234.56,
            ..CandidateListing::empty()
        };
        assert!(listing.has_price());
    }

    #[test]
    fn serde_defaults_missing_numeric_price_to_infinity() {
        // JSON cannot represent infinity; a record round-tripped through a
        // serializer that drops the field must come back inert.
        let decoded: CandidateListing = serde_json::from_str(
            r#"{"title":"t","display_price":"p","link":"l","image_url":"i"}"#,
        )
        .expect("deserialize");
        assert!(decoded.numeric_price.is_infinite());
    }
}
