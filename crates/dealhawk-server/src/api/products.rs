use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealhawk_core::{PriceDrop, PriceHistoryEntry};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    id: i64,
    title: String,
    display_price: String,
    numeric_price: f64,
    link: String,
    image_url: String,
    stock_status: Option<String>,
    stock_quantity: Option<i32>,
    price_history: Vec<PriceHistoryEntry>,
    price_drop: Option<PriceDrop>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<ProductItem>>>, ApiError> {
    let rows = dealhawk_db::list_products(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| ProductItem {
            id: row.id,
            title: row.title,
            display_price: row.display_price,
            numeric_price: row.numeric_price,
            link: row.link,
            image_url: row.image_url,
            stock_status: row.stock_status,
            stock_quantity: row.stock_quantity,
            price_history: row.price_history.0,
            price_drop: row.price_drop.map(|d| d.0),
            updated_at: row.updated_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedData {
    deleted: bool,
}

pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedData>>, ApiError> {
    dealhawk_db::delete_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: DeletedData { deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedCountData {
    deleted: u64,
}

pub(super) async fn delete_all_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DeletedCountData>>, ApiError> {
    let deleted = dealhawk_db::delete_all_products(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: DeletedCountData { deleted },
        meta: ResponseMeta::new(req_id.0),
    }))
}
