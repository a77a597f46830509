//! Database operations for the `sold_products` table: resale records for
//! delivered orders.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `sold_products` table.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct SoldProductRow {
    pub id: i64,
    pub order_id: String,
    pub product_title: String,
    pub selling_price: f64,
    pub buyer_name: String,
    pub buyer_contact: String,
    /// When the sale happened; `None` when not specified by the operator.
    pub sold_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Records a sale against an existing order.
///
/// Returns the internal `id` of the inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a missing
/// referenced order, which violates the foreign key).
pub async fn insert_sold_product(
    pool: &PgPool,
    order_id: &str,
    product_title: &str,
    selling_price: f64,
    buyer_name: &str,
    buyer_contact: &str,
    sold_at: Option<DateTime<Utc>>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sold_products \
             (order_id, product_title, selling_price, buyer_name, buyer_contact, sold_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(order_id)
    .bind(product_title)
    .bind(selling_price)
    .bind(buyer_name)
    .bind(buyer_contact)
    .bind(sold_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Looks up the most recent sale matching an order id or a buyer name.
/// At least one filter must be provided by the caller.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_sold_product(
    pool: &PgPool,
    order_id: Option<&str>,
    buyer_name: Option<&str>,
) -> Result<Option<SoldProductRow>, DbError> {
    let row = sqlx::query_as::<_, SoldProductRow>(
        "SELECT id, order_id, product_title, selling_price, buyer_name, buyer_contact, \
                sold_at, created_at \
         FROM sold_products \
         WHERE ($1::text IS NULL OR order_id = $1) \
           AND ($2::text IS NULL OR buyer_name = $2) \
         ORDER BY created_at DESC \
         LIMIT 1",
    )
    .bind(order_id)
    .bind(buyer_name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Lists recorded sales, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sold_products(pool: &PgPool, limit: i64) -> Result<Vec<SoldProductRow>, DbError> {
    let rows = sqlx::query_as::<_, SoldProductRow>(
        "SELECT id, order_id, product_title, selling_price, buyer_name, buyer_contact, \
                sold_at, created_at \
         FROM sold_products \
         ORDER BY created_at DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
