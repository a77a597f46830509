mod deals;
mod orders;
mod products;
mod sales;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use dealhawk_core::{AppConfig, DepartmentClassifier};
use dealhawk_scraper::MarketClient;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub client: Arc<MarketClient>,
    pub classifier: Arc<DepartmentClassifier>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" | "no_match" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_blocked" | "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &dealhawk_db::DbError) -> ApiError {
    if matches!(error, dealhawk_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", "record not found");
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/deals/search", post(deals::search_deal))
        .route(
            "/api/v1/products",
            get(products::list_products).delete(products::delete_all_products),
        )
        .route(
            "/api/v1/products/{id}",
            delete(products::delete_product),
        )
        .route(
            "/api/v1/orders",
            get(orders::list_orders)
                .post(orders::upsert_order)
                .delete(orders::delete_all_orders),
        )
        .route("/api/v1/orders/{id}", delete(orders::delete_order))
        .route(
            "/api/v1/sales",
            get(sales::find_sale).post(sales::record_sale),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match dealhawk_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::deals::DealData;
    use super::*;
    use dealhawk_core::{Department, PriceDrop, PriceHistoryEntry, ProductRecord};
    use dealhawk_scraper::{StockReport, StockStatus};

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_no_match_maps_to_not_found() {
        let response = ApiError::new("req-1", "no_match", "no eligible deal").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_upstream_blocked_maps_to_bad_gateway() {
        let response =
            ApiError::new("req-1", "upstream_blocked", "captcha challenge").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn api_error_unknown_code_maps_to_internal_error() {
        let response = ApiError::new("req-1", "mystery", "??").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn map_db_error_not_found_maps_to_not_found() {
        let err = map_db_error("req-1".to_string(), &dealhawk_db::DbError::NotFound);
        assert_eq!(err.error.code, "not_found");
    }

    #[test]
    fn deal_data_is_serializable() {
        // Proves the type compiles and serde works — no scraping needed.
        let data = DealData::from_outcome(&crate::pipeline::DealOutcome {
            record: ProductRecord {
                title: "Apple iPhone 14".to_string(),
                display_price: "64,900".to_string(),
                numeric_price: 64_900.0,
                link: "https://www.amazon.in/dp/B0BDJ7GF3N".to_string(),
                image_url: "https://images.example.com/iphone.jpg".to_string(),
                price_history: vec![PriceHistoryEntry {
                    observed_at: Utc::now(),
                    price: 64_900.0,
                }],
                price_drop: Some(PriceDrop {
                    old_price: 69_900.0,
                    difference: 5_000.0,
                    percentage: 7.15,
                }),
            },
            department: Department::Electronics,
            stock: StockReport {
                status: StockStatus::Available,
                quantity: Some(10),
            },
        });
        let json = serde_json::to_string(&data).expect("serialize");
        assert!(json.contains("\"department\":\"electronics\""));
        assert!(json.contains("\"percentage\":7.15"));
    }
}
