//! Database operations for the `orders` table: marketplace order state
//! recorded after a checkout attempt, keyed by the marketplace order id.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `orders` table.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    /// Marketplace-assigned order identifier; upsert key.
    pub order_id: String,
    pub product_title: String,
    /// Latest delivery/tracking status text.
    pub current_status: String,
    /// Account email the order was placed under.
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upserts an order observation, keyed by `order_id`.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_order(
    pool: &PgPool,
    order_id: &str,
    product_title: &str,
    current_status: &str,
    email: Option<&str>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (order_id, product_title, current_status, email) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (order_id) DO UPDATE SET \
             product_title  = EXCLUDED.product_title, \
             current_status = EXCLUDED.current_status, \
             email          = EXCLUDED.email, \
             updated_at     = NOW() \
         RETURNING id",
    )
    .bind(order_id)
    .bind(product_title)
    .bind(current_status)
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Fetches an order by its marketplace order id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_order_by_order_id(
    pool: &PgPool,
    order_id: &str,
) -> Result<Option<OrderRow>, DbError> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, order_id, product_title, current_status, email, created_at, updated_at \
         FROM orders \
         WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Lists all recorded orders, most recently updated first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders(pool: &PgPool, limit: i64) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, order_id, product_title, current_status, email, created_at, updated_at \
         FROM orders \
         ORDER BY updated_at DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes one order.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matched, [`DbError::Sqlx`] if
/// the delete fails.
pub async fn delete_order(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let affected = sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Deletes every recorded order, returning the number removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_all_orders(pool: &PgPool) -> Result<u64, DbError> {
    let affected = sqlx::query("DELETE FROM orders")
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected)
}
