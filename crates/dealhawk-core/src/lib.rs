//! Domain types and pure logic for the dealhawk price-discovery pipeline:
//! department classification, candidate listings, and the bounded
//! price-history ledger. No I/O lives in this crate.

pub mod app_config;
pub mod config;
pub mod departments;
pub mod history;
pub mod listing;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use departments::{classify_department, Department, DepartmentClassifier};
pub use history::{merge_winner, PriceDrop, PriceHistoryEntry, ProductRecord, PRICE_HISTORY_CAP};
pub use listing::CandidateListing;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read departments file {path}: {source}")]
    DepartmentsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse departments file: {0}")]
    DepartmentsFileParse(#[from] serde_yaml::Error),

    #[error("invalid departments config: {0}")]
    Validation(String),
}
