use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct OrderItem {
    id: i64,
    order_id: String,
    product_title: String,
    current_status: String,
    email: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrderQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<ApiResponse<Vec<OrderItem>>>, ApiError> {
    let rows = dealhawk_db::list_orders(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_title: row.product_title,
            current_status: row.current_status,
            email: row.email,
            updated_at: row.updated_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct UpsertOrderRequest {
    pub order_id: String,
    pub product_title: String,
    pub current_status: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct UpsertedOrderData {
    id: i64,
    order_id: String,
}

pub(super) async fn upsert_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<UpsertOrderRequest>,
) -> Result<Json<ApiResponse<UpsertedOrderData>>, ApiError> {
    if request.order_id.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "order_id must be non-empty",
        ));
    }

    let id = dealhawk_db::upsert_order(
        &state.pool,
        &request.order_id,
        &request.product_title,
        &request.current_status,
        request.email.as_deref(),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: UpsertedOrderData {
            id,
            order_id: request.order_id,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedData {
    deleted: bool,
}

pub(super) async fn delete_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedData>>, ApiError> {
    dealhawk_db::delete_order(&state.pool, id)
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

pub(super) async fn delete_all_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DeletedCountData>>, ApiError> {
    let deleted = dealhawk_db::delete_all_orders(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: DeletedCountData { deleted },
        meta: ResponseMeta::new(req_id.0),
    }))
}
