//! Offline unit tests for dealhawk-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use dealhawk_core::{AppConfig, Environment, PriceHistoryEntry};
use dealhawk_db::{OrderRow, PoolConfig, ProductRow};
use sqlx::types::Json;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        departments_path: None,
        marketplace_origin: "https://www.amazon.in".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_max_retries: 3,
        scraper_retry_backoff_base_secs: 5,
        refresh_schedule: "0 0 3 * * *".to_string(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`ProductRow`] has all expected
/// fields with the correct types and rehydrates into the domain record.
#[test]
fn product_row_rehydrates_into_domain_record() {
    let now = Utc::now();
    let row = ProductRow {
        id: 1,
        title: "Apple iPhone 14".to_string(),
        display_price: "64,900".to_string(),
        numeric_price: 64_900.0,
        link: "https://www.amazon.in/dp/B0BDJ7GF3N".to_string(),
        image_url: "https://images.example.com/iphone.jpg".to_string(),
        stock_status: Some("available".to_string()),
        stock_quantity: Some(3),
        price_history: Json(vec![PriceHistoryEntry {
            observed_at: now,
            price: 64_900.0,
        }]),
        price_drop: None,
        created_at: now,
        updated_at: now,
    };

    let record = row.into_record();
    assert_eq!(record.title, "Apple iPhone 14");
    assert_eq!(record.price_history.len(), 1);
    assert!(record.price_drop.is_none());
    assert!((record.numeric_price - 64_900.0).abs() < f64::EPSILON);
}

#[test]
fn order_row_has_expected_fields() {
    let now = Utc::now();
    let row = OrderRow {
        id: 1,
        order_id: "405-1234567-1234567".to_string(),
        product_title: "Apple iPhone 14".to_string(),
        current_status: "Delivered".to_string(),
        email: Some("buyer@example.com".to_string()),
        created_at: now,
        updated_at: now,
    };

    assert_eq!(row.order_id, "405-1234567-1234567");
    assert_eq!(row.current_status, "Delivered");
}
