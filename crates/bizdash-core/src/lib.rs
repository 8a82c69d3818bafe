pub mod app_config;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod export;
pub mod filter;
pub mod snapshot;
pub mod types;

use chrono::NaiveDate;
use thiserror::Error;

pub use app_config::{AppConfig, DataSourceKind, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use dashboard::{build_dashboard, DashboardData, DashboardView};
pub use export::{write_workbook, ExportError};
pub use filter::{DateRange, Directory, EntityScope, Filter, MAX_RANGE_DAYS};
pub use snapshot::{generate_snapshot, load_snapshot, save_snapshot, Snapshot, SnapshotFile};
pub use types::{
    parse_calendar_date, Location, MetricCounters, MetricKind, MetricRecord, ReviewRecord,
    Sentiment, StarRating,
};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("date range covers {days} days, the limit is {max}")]
    RangeTooLong { days: i64, max: u32 },

    #[error("no preceding period before {0}")]
    NoPrecedingPeriod(DateRange),

    #[error("no locations match {0}")]
    EmptyScope(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("snapshot file {path}: {source}")]
    SnapshotFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot YAML error: {0}")]
    SnapshotYaml(#[from] serde_yaml::Error),

    #[error("snapshot validation failed: {0}")]
    Validation(String),
}
