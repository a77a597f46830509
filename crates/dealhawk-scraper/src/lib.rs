//! Marketplace search-result scraping: markup traversal, listing
//! extraction, deal selection, and the HTTP fetch client.

pub mod client;
pub mod error;
pub mod extract;
pub mod markup;
pub mod search;
pub mod select;
pub mod stock;

mod retry;

pub use client::MarketClient;
pub use error::ScraperError;
pub use extract::{extract_listing, parse_price_strict};
pub use markup::{ProductPage, ResultCard, SearchPage};
pub use search::build_search_url;
pub use select::select_deal;
pub use stock::{assess_stock, StockReport, StockStatus};
