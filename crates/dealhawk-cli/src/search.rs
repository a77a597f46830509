//! One-shot deal search from the command line: fetch, select, merge,
//! persist, and print the outcome.

use chrono::Utc;
use sqlx::PgPool;

use dealhawk_core::{merge_winner, AppConfig, DepartmentClassifier};
use dealhawk_scraper::{
    assess_stock, build_search_url, select_deal, MarketClient, ProductPage, SearchPage,
    StockReport,
};

pub async fn run_search(pool: &PgPool, config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let classifier = match &config.departments_path {
        Some(path) => DepartmentClassifier::from_yaml_file(path)?,
        None => DepartmentClassifier::default(),
    };
    let client = MarketClient::from_app_config(config)?;

    let department = classifier.classify(query);
    let url = build_search_url(&config.marketplace_origin, query, department);
    tracing::info!(query, %department, url, "searching");

    let body = client.fetch_page(&url).await?;
    let page = SearchPage::parse(&body);
    let cards = page.result_cards();

    let Some(winner) = select_deal(&cards, department, &config.marketplace_origin) else {
        println!("no eligible deal found for {query:?} ({} cards)", cards.len());
        return Ok(());
    };

    let stock = match client.fetch_page(&winner.link).await {
        Ok(product_body) => assess_stock(&ProductPage::parse(&product_body)),
        Err(e) => {
            tracing::warn!(link = %winner.link, error = %e, "product page unavailable");
            StockReport::unknown()
        }
    };

    let prior = dealhawk_db::get_product_by_title(pool, &winner.title)
        .await?
        .map(dealhawk_db::ProductRow::into_record);
    let record = merge_winner(prior.as_ref(), &winner, Utc::now());

    let stock_quantity = stock.quantity.and_then(|q| i32::try_from(q).ok());
    dealhawk_db::upsert_product(pool, &record, Some(stock.status.as_str()), stock_quantity)
        .await?;

    let output = serde_json::json!({
        "record": record,
        "department": department,
        "stock_status": stock.status.as_str(),
        "stock_quantity": stock.quantity,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
