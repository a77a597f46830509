//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring price-refresh job.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use dealhawk_core::{AppConfig, DepartmentClassifier};
use dealhawk_scraper::MarketClient;

use crate::pipeline::{self, PipelineError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
    client: Arc<MarketClient>,
    classifier: Arc<DepartmentClassifier>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_price_refresh_job(&scheduler, pool, config, client, classifier).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring price-refresh job on the configured cron
/// schedule (daily at 03:00 UTC by default).
///
/// The job re-runs the deal search for every persisted product title, so
/// price histories keep accruing without operator-initiated searches.
async fn register_price_refresh_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<AppConfig>,
    client: Arc<MarketClient>,
    classifier: Arc<DepartmentClassifier>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    let schedule = config.refresh_schedule.clone();

    let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);
        let client = Arc::clone(&client);
        let classifier = Arc::clone(&classifier);

        Box::pin(async move {
            tracing::info!("scheduler: starting price-refresh run");
            run_price_refresh(&pool, &config, &client, &classifier).await;
            tracing::info!("scheduler: price-refresh run complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Re-run the deal search for every tracked product.
async fn run_price_refresh(
    pool: &PgPool,
    config: &AppConfig,
    client: &MarketClient,
    classifier: &DepartmentClassifier,
) {
    let products = match dealhawk_db::list_products(pool, i64::MAX).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load tracked products");
            return;
        }
    };

    if products.is_empty() {
        tracing::info!("scheduler: no tracked products; skipping");
        return;
    }

    tracing::info!(count = products.len(), "scheduler: refreshing prices");

    for product in &products {
        match pipeline::run_deal_search(
            pool,
            client,
            classifier,
            &config.marketplace_origin,
            &product.title,
        )
        .await
        {
            Ok(outcome) => {
                if let Some(drop) = &outcome.record.price_drop {
                    tracing::info!(
                        title = %outcome.record.title,
                        percentage = drop.percentage,
                        "scheduler: price drop on refresh"
                    );
                }
            }
            Err(PipelineError::NoMatch { query }) => {
                // The title no longer matches anything eligible; keep the
                // stored record and move on.
                tracing::warn!(query, "scheduler: no eligible candidate on refresh");
            }
            Err(e) => {
                tracing::error!(title = %product.title, error = %e, "scheduler: refresh failed");
            }
        }
    }
}
