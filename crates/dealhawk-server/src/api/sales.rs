use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SaleItem {
    id: i64,
    order_id: String,
    product_title: String,
    selling_price: f64,
    buyer_name: String,
    buyer_contact: String,
    sold_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SaleLookupQuery {
    pub order_id: Option<String>,
    pub buyer_name: Option<String>,
}

/// Looks up the most recent sale by order id or buyer name.
pub(super) async fn find_sale(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SaleLookupQuery>,
) -> Result<Json<ApiResponse<SaleItem>>, ApiError> {
    if query.order_id.is_none() && query.buyer_name.is_none() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "provide order_id or buyer_name",
        ));
    }

    let row = dealhawk_db::find_sold_product(
        &state.pool,
        query.order_id.as_deref(),
        query.buyer_name.as_deref(),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?
    .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "no matching sale"))?;

    Ok(Json(ApiResponse {
        data: SaleItem {
            id: row.id,
            order_id: row.order_id,
            product_title: row.product_title,
            selling_price: row.selling_price,
            buyer_name: row.buyer_name,
            buyer_contact: row.buyer_contact,
            sold_at: row.sold_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct RecordSaleRequest {
    pub order_id: String,
    pub product_title: String,
    pub selling_price: f64,
    pub buyer_name: String,
    pub buyer_contact: String,
    pub sold_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(super) struct RecordedSaleData {
    id: i64,
}

pub(super) async fn record_sale(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<RecordSaleRequest>,
) -> Result<Json<ApiResponse<RecordedSaleData>>, ApiError> {
    if request.order_id.trim().is_empty() || request.buyer_name.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "order_id and buyer_name must be non-empty",
        ));
    }
    if !request.selling_price.is_finite() || request.selling_price < 0.0 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "selling_price must be a non-negative number",
        ));
    }

    let id = dealhawk_db::insert_sold_product(
        &state.pool,
        &request.order_id,
        &request.product_title,
        request.selling_price,
        &request.buyer_name,
        &request.buyer_contact,
        request.sold_at,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RecordedSaleData { id },
        meta: ResponseMeta::new(req_id.0),
    }))
}
