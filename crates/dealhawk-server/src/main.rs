mod api;
mod middleware;
mod pipeline;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(dealhawk_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = dealhawk_db::PoolConfig::from_app_config(&config);
    let pool = dealhawk_db::connect_pool(&config.database_url, pool_config).await?;
    dealhawk_db::run_migrations(&pool).await?;

    let classifier = Arc::new(match &config.departments_path {
        Some(path) => dealhawk_core::DepartmentClassifier::from_yaml_file(path)?,
        None => dealhawk_core::DepartmentClassifier::default(),
    });
    let client = Arc::new(dealhawk_scraper::MarketClient::from_app_config(&config)?);

    let _scheduler = scheduler::build_scheduler(
        pool.clone(),
        Arc::clone(&config),
        Arc::clone(&client),
        Arc::clone(&classifier),
    )
    .await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        dealhawk_core::Environment::Development
    ))?;
    let state = AppState {
        pool,
        config: Arc::clone(&config),
        client,
        classifier,
    };
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    // Peer addresses feed the per-client rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
