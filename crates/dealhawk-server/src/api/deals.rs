use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use dealhawk_core::{PriceDrop, PriceHistoryEntry};
use dealhawk_scraper::ScraperError;

use crate::middleware::RequestId;
use crate::pipeline::{self, PipelineError};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchDealRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub(super) struct DealData {
    title: String,
    display_price: String,
    numeric_price: f64,
    link: String,
    image_url: String,
    department: String,
    stock_status: String,
    stock_quantity: Option<u32>,
    price_history: Vec<PriceHistoryEntry>,
    price_drop: Option<PriceDrop>,
}

impl DealData {
    pub(super) fn from_outcome(outcome: &pipeline::DealOutcome) -> Self {
        Self {
            title: outcome.record.title.clone(),
            display_price: outcome.record.display_price.clone(),
            numeric_price: outcome.record.numeric_price,
            link: outcome.record.link.clone(),
            image_url: outcome.record.image_url.clone(),
            department: outcome.department.to_string(),
            stock_status: outcome.stock.status.as_str().to_string(),
            stock_quantity: outcome.stock.quantity,
            price_history: outcome.record.price_history.clone(),
            price_drop: outcome.record.price_drop,
        }
    }
}

pub(super) async fn search_deal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<SearchDealRequest>,
) -> Result<Json<ApiResponse<DealData>>, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query must be non-empty",
        ));
    }

    let outcome = pipeline::run_deal_search(
        &state.pool,
        &state.client,
        &state.classifier,
        &state.config.marketplace_origin,
        query,
    )
    .await
    .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: DealData::from_outcome(&outcome),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_pipeline_error(request_id: String, error: &PipelineError) -> ApiError {
    match error {
        PipelineError::NoMatch { query } => ApiError::new(
            request_id,
            "no_match",
            format!("no eligible deal found for {query:?}"),
        ),
        PipelineError::Scrape(ScraperError::CaptchaChallenge { url }) => {
            tracing::warn!(url, "deal search blocked by CAPTCHA");
            ApiError::new(
                request_id,
                "upstream_blocked",
                "marketplace served a CAPTCHA challenge",
            )
        }
        PipelineError::Scrape(e) => {
            tracing::error!(error = %e, "deal search fetch failed");
            ApiError::new(request_id, "upstream_error", "marketplace fetch failed")
        }
        PipelineError::Db(e) => map_db_error(request_id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use dealhawk_db::DbError;

    #[test]
    fn no_match_maps_to_no_match_code() {
        let err = map_pipeline_error(
            "req-1".to_string(),
            &PipelineError::NoMatch {
                query: "iphone".to_string(),
            },
        );
        assert_eq!(err.error.code, "no_match");
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn captcha_maps_to_upstream_blocked() {
        let err = map_pipeline_error(
            "req-1".to_string(),
            &PipelineError::Scrape(ScraperError::CaptchaChallenge {
                url: "https://www.amazon.in/s?k=iphone".to_string(),
            }),
        );
        assert_eq!(err.error.code, "upstream_blocked");
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn other_scrape_errors_map_to_upstream_error() {
        let err = map_pipeline_error(
            "req-1".to_string(),
            &PipelineError::Scrape(ScraperError::UnexpectedStatus {
                status: 503,
                url: "https://www.amazon.in/s?k=iphone".to_string(),
            }),
        );
        assert_eq!(err.error.code, "upstream_error");
    }

    #[test]
    fn db_errors_map_through_db_mapping() {
        let err = map_pipeline_error("req-1".to_string(), &PipelineError::Db(DbError::NotFound));
        assert_eq!(err.error.code, "not_found");
    }
}
