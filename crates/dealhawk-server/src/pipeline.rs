//! The deal-search pipeline shared by the API handler and the scheduled
//! refresh job: classify the query, fetch and parse the result page, select
//! the winning candidate, assess its stock, merge against the persisted
//! record, and upsert.

use chrono::Utc;
use sqlx::PgPool;

use dealhawk_core::{merge_winner, Department, DepartmentClassifier, ProductRecord};
use dealhawk_db::DbError;
use dealhawk_scraper::{
    assess_stock, build_search_url, select_deal, MarketClient, ProductPage, ScraperError,
    SearchPage, StockReport,
};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The search completed but no result card was eligible.
    #[error("no eligible deal found for query {query:?}")]
    NoMatch { query: String },

    #[error(transparent)]
    Scrape(#[from] ScraperError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result of a completed deal search: the merged record as persisted, plus
/// the department and stock context the search ran under.
#[derive(Debug, Clone)]
pub struct DealOutcome {
    pub record: ProductRecord,
    pub department: Department,
    pub stock: StockReport,
}

/// Runs one end-to-end deal search for `query` and persists the outcome.
///
/// Stock assessment is best-effort: a product page that cannot be fetched
/// downgrades the report to unknown rather than failing the search.
///
/// # Errors
///
/// - [`PipelineError::NoMatch`] when no result card survives selection.
/// - [`PipelineError::Scrape`] when the search page itself cannot be
///   fetched (including a CAPTCHA interstitial).
/// - [`PipelineError::Db`] when reading or writing the product record fails.
pub async fn run_deal_search(
    pool: &PgPool,
    client: &MarketClient,
    classifier: &DepartmentClassifier,
    origin: &str,
    query: &str,
) -> Result<DealOutcome, PipelineError> {
    let department = classifier.classify(query);
    let url = build_search_url(origin, query, department);
    tracing::info!(query, %department, url, "running deal search");

    let body = client.fetch_page(&url).await?;
    // Scope the parsed page and its borrowed cards so the non-`Send` DOM
    // values are dropped before the next `.await`.
    let winner = {
        let page = SearchPage::parse(&body);
        let cards = page.result_cards();

        let Some(winner) = select_deal(&cards, department, origin) else {
            tracing::info!(query, cards = cards.len(), "no eligible candidate");
            return Err(PipelineError::NoMatch {
                query: query.to_string(),
            });
        };
        winner
    };

    let stock = match client.fetch_page(&winner.link).await {
        Ok(product_body) => assess_stock(&ProductPage::parse(&product_body)),
        Err(error) => {
            tracing::warn!(
                link = %winner.link,
                %error,
                "product page unavailable, stock unknown"
            );
            StockReport::unknown()
        }
    };

    let prior = dealhawk_db::get_product_by_title(pool, &winner.title)
        .await?
        .map(dealhawk_db::ProductRow::into_record);

    let record = merge_winner(prior.as_ref(), &winner, Utc::now());

    let stock_quantity = stock.quantity.and_then(|q| i32::try_from(q).ok());
    dealhawk_db::upsert_product(pool, &record, Some(stock.status.as_str()), stock_quantity).await?;

    if let Some(drop) = &record.price_drop {
        tracing::info!(
            title = %record.title,
            old_price = drop.old_price,
            new_price = record.numeric_price,
            percentage = drop.percentage,
            "price drop detected"
        );
    }

    Ok(DealOutcome {
        record,
        department,
        stock,
    })
}
