//! The bounded, change-triggered price-history ledger and its derived
//! price-drop signal.
//!
//! `merge_winner` is a pure fold: the single side-effecting write (the
//! upsert keyed by title) belongs to the caller. Two concurrent merges for
//! the same title therefore race last-writer-wins at the persistence layer;
//! acceptable for a low-frequency single-operator tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::CandidateListing;

/// Maximum number of retained history entries; the oldest are truncated
/// first when a new entry pushes the ledger past the cap.
pub const PRICE_HISTORY_CAP: usize = 10;

/// One observed price point. Entries are append-only and chronological by
/// construction; the sequence is never re-sorted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub observed_at: DateTime<Utc>,
    pub price: f64,
}

/// Derived signal present only when the newly observed price is strictly
/// lower than the previously persisted price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDrop {
    pub old_price: f64,
    pub difference: f64,
    /// Drop as a percentage of the old price, rounded to two decimals.
    pub percentage: f64,
}

/// The winning record for a query, merged with persisted history. Keyed by
/// `title` for upsert; records for titles never selected again are kept
/// indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    pub display_price: String,
    pub numeric_price: f64,
    pub link: String,
    pub image_url: String,
    /// Most-recent entry last, at most [`PRICE_HISTORY_CAP`] entries.
    pub price_history: Vec<PriceHistoryEntry>,
    pub price_drop: Option<PriceDrop>,
}

/// Merges a freshly selected winning listing against the prior persisted
/// record for the same title.
///
/// - No prior record: history starts as a single entry at `now`.
/// - Prior record: a new entry is appended only when the last recorded
///   price differs from the new one (or the history was empty), then the
///   ledger is truncated to the newest [`PRICE_HISTORY_CAP`] entries. An
///   unchanged price carries the history forward verbatim.
/// - `price_drop` is recomputed on every merge: present iff the prior
///   stored price is strictly greater than the new one, cleared otherwise.
#[must_use]
pub fn merge_winner(
    prior: Option<&ProductRecord>,
    winner: &CandidateListing,
    now: DateTime<Utc>,
) -> ProductRecord {
    let new_entry = PriceHistoryEntry {
        observed_at: now,
        price: winner.numeric_price,
    };

    let (price_history, price_drop) = match prior {
        None => (vec![new_entry], None),
        Some(existing) => {
            let mut history = existing.price_history.clone();
            let last_price = history.last().map(|entry| entry.price);

            if last_price != Some(winner.numeric_price) {
                history.push(new_entry);
                if history.len() > PRICE_HISTORY_CAP {
                    let excess = history.len() - PRICE_HISTORY_CAP;
                    history.drain(..excess);
                }
            }

            let drop = compute_price_drop(existing.numeric_price, winner.numeric_price);
            (history, drop)
        }
    };

    ProductRecord {
        title: winner.title.clone(),
        display_price: winner.display_price.clone(),
        numeric_price: winner.numeric_price,
        link: winner.link.clone(),
        image_url: winner.image_url.clone(),
        price_history,
        price_drop,
    }
}

fn compute_price_drop(old_price: f64, new_price: f64) -> Option<PriceDrop> {
    if !(old_price.is_finite() && new_price < old_price) {
        return None;
    }

    let difference = old_price - new_price;
    Some(PriceDrop {
        old_price,
        difference,
        percentage: round2(difference / old_price * 100.0),
    })
}

/// Round to two decimal places, matching the reported percentage format.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listing(title: &str, price: f64) -> CandidateListing {
        CandidateListing {
            title: title.to_string(),
            display_price: format!("{price}"),
            numeric_price: price,
            link: format!("https://www.example.in/dp/{title}"),
            image_url: "https://images.example.in/x.jpg".to_string(),
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single().expect("valid ts")
    }

    #[test]
    fn first_observation_starts_single_entry_history() {
        let record = merge_winner(None, &listing("iPhone 14", 64_900.0), at(0));

        assert_eq!(record.price_history.len(), 1);
        assert!((record.price_history[0].price - 64_900.0).abs() < f64::EPSILON);
        assert_eq!(record.price_history[0].observed_at, at(0));
        assert!(record.price_drop.is_none());
    }

    #[test]
    fn changed_price_appends_entry() {
        let first = merge_winner(None, &listing("iPhone 14", 64_900.0), at(0));
        let second = merge_winner(Some(&first), &listing("iPhone 14", 62_000.0), at(60));

        assert_eq!(second.price_history.len(), 2);
        assert!((second.price_history[1].price - 62_000.0).abs() < f64::EPSILON);
        assert_eq!(second.price_history[1].observed_at, at(60));
    }

    #[test]
    fn unchanged_price_is_idempotent() {
        let first = merge_winner(None, &listing("iPhone 14", 64_900.0), at(0));
        let second = merge_winner(Some(&first), &listing("iPhone 14", 64_900.0), at(60));

        assert_eq!(second.price_history, first.price_history);
        assert!(second.price_drop.is_none());
    }

    #[test]
    fn history_is_capped_at_ten_dropping_oldest() {
        let mut record = merge_winner(None, &listing("iPhone 14", 100.0), at(0));
        for i in 1..10 {
            let price = 100.0 + f64::from(i);
            record = merge_winner(Some(&record), &listing("iPhone 14", price), at(i64::from(i)));
        }
        assert_eq!(record.price_history.len(), PRICE_HISTORY_CAP);

        let record = merge_winner(Some(&record), &listing("iPhone 14", 50.0), at(100));

        assert_eq!(record.price_history.len(), PRICE_HISTORY_CAP);
        // Oldest entry (price 100.0 at t0) is gone; newest is last.
        assert!((record.price_history[0].price - 101.0).abs() < f64::EPSILON);
        assert!((record.price_history[9].price - 50.0).abs() < f64::EPSILON);
        assert_eq!(record.price_history[9].observed_at, at(100));
    }

    #[test]
    fn price_drop_computed_on_strict_decrease() {
        let first = merge_winner(None, &listing("iPhone 14", 1000.0), at(0));
        let second = merge_winner(Some(&first), &listing("iPhone 14", 800.0), at(60));

        let drop = second.price_drop.expect("expected a price drop");
        assert!((drop.old_price - 1000.0).abs() < f64::EPSILON);
        assert!((drop.difference - 200.0).abs() < f64::EPSILON);
        assert!((drop.percentage - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_drop_percentage_rounds_to_two_decimals() {
        let first = merge_winner(None, &listing("iPhone 14", 3000.0), at(0));
        let second = merge_winner(Some(&first), &listing("iPhone 14", 2000.0), at(60));

        let drop = second.price_drop.expect("expected a price drop");
        // 1000/3000 = 33.333...% → 33.33
        assert!((drop.percentage - 33.33).abs() < f64::EPSILON);
    }

    #[test]
    fn price_increase_clears_prior_drop() {
        let first = merge_winner(None, &listing("iPhone 14", 1000.0), at(0));
        let dropped = merge_winner(Some(&first), &listing("iPhone 14", 800.0), at(60));
        assert!(dropped.price_drop.is_some());

        let raised = merge_winner(Some(&dropped), &listing("iPhone 14", 900.0), at(120));
        assert!(raised.price_drop.is_none());
    }

    #[test]
    fn equal_price_produces_no_drop() {
        let first = merge_winner(None, &listing("iPhone 14", 1000.0), at(0));
        let second = merge_winner(Some(&first), &listing("iPhone 14", 1000.0), at(60));
        assert!(second.price_drop.is_none());
    }

    #[test]
    fn winner_fields_replace_prior_fields() {
        let first = merge_winner(None, &listing("iPhone 14", 1000.0), at(0));
        let mut updated = listing("iPhone 14", 900.0);
        updated.link = "https://www.example.in/dp/new-offer".to_string();

        let second = merge_winner(Some(&first), &updated, at(60));
        assert_eq!(second.link, "https://www.example.in/dp/new-offer");
        assert_eq!(second.title, "iPhone 14");
    }

    #[test]
    fn empty_prior_history_gets_new_entry() {
        let prior = ProductRecord {
            title: "iPhone 14".to_string(),
            display_price: "64,900".to_string(),
            numeric_price: 64_900.0,
            link: "l".to_string(),
            image_url: "i".to_string(),
            price_history: vec![],
            price_drop: None,
        };

        let merged = merge_winner(Some(&prior), &listing("iPhone 14", 64_900.0), at(0));
        assert_eq!(merged.price_history.len(), 1);
    }
}
