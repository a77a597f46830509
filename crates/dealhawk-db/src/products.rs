//! Database operations for the `products` table.
//!
//! The price-history ledger and drop signal are computed in
//! `dealhawk_core::history` before the upsert; this module only moves the
//! merged record in and out of Postgres. `price_history` and `price_drop`
//! live in JSONB columns via [`sqlx::types::Json`].

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use dealhawk_core::{PriceDrop, PriceHistoryEntry, ProductRecord};

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    /// Upsert key; one tracked record per distinct listing title.
    pub title: String,
    pub display_price: String,
    pub numeric_price: f64,
    pub link: String,
    pub image_url: String,
    pub stock_status: Option<String>,
    pub stock_quantity: Option<i32>,
    /// Most-recent entry last; the application caps this at 10 entries
    /// before persisting.
    pub price_history: Json<Vec<PriceHistoryEntry>>,
    pub price_drop: Option<Json<PriceDrop>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Rehydrates the domain record for the next history merge.
    #[must_use]
    pub fn into_record(self) -> ProductRecord {
        ProductRecord {
            title: self.title,
            display_price: self.display_price,
            numeric_price: self.numeric_price,
            link: self.link,
            image_url: self.image_url,
            price_history: self.price_history.0,
            price_drop: self.price_drop.map(|json| json.0),
        }
    }
}

/// Fetches the persisted record for a title, if one exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_title(
    pool: &PgPool,
    title: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, title, display_price, numeric_price, link, image_url, \
                stock_status, stock_quantity, price_history, price_drop, \
                created_at, updated_at \
         FROM products \
         WHERE title = $1",
    )
    .bind(title)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Upserts the winning record, keyed by `title`.
///
/// Conflicts replace the listing fields, ledger, drop signal, and stock
/// fields in place; `created_at` is left untouched. Two concurrent upserts
/// for one title race last-writer-wins.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(
    pool: &PgPool,
    record: &ProductRecord,
    stock_status: Option<&str>,
    stock_quantity: Option<i32>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (title, display_price, numeric_price, link, image_url, \
              stock_status, stock_quantity, price_history, price_drop) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (title) DO UPDATE SET \
             display_price  = EXCLUDED.display_price, \
             numeric_price  = EXCLUDED.numeric_price, \
             link           = EXCLUDED.link, \
             image_url      = EXCLUDED.image_url, \
             stock_status   = EXCLUDED.stock_status, \
             stock_quantity = EXCLUDED.stock_quantity, \
             price_history  = EXCLUDED.price_history, \
             price_drop     = EXCLUDED.price_drop, \
             updated_at     = NOW() \
         RETURNING id",
    )
    .bind(&record.title)
    .bind(&record.display_price)
    .bind(record.numeric_price)
    .bind(&record.link)
    .bind(&record.image_url)
    .bind(stock_status)
    .bind(stock_quantity)
    .bind(Json(&record.price_history))
    .bind(record.price_drop.as_ref().map(Json))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Lists all tracked products, most recently updated first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &PgPool, limit: i64) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, title, display_price, numeric_price, link, image_url, \
                stock_status, stock_quantity, price_history, price_drop, \
                created_at, updated_at \
         FROM products \
         ORDER BY updated_at DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes one tracked product.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matched, [`DbError::Sqlx`] if
/// the delete fails.
pub async fn delete_product(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let affected = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Deletes every tracked product, returning the number removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_all_products(pool: &PgPool) -> Result<u64, DbError> {
    let affected = sqlx::query("DELETE FROM products")
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected)
}
