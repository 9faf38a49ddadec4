//! # Security Log Telemetry
//!
//! Logging and metrics plumbing shared by the security log store.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` setup (pretty or JSON) with an
//!   `EnvFilter`, plus [`log_event!`] / [`log_record_event!`] macros
//! - **Metrics**: Prometheus counters for record mutations, index operations,
//!   skipped scan entries and event failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use seclog_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SECLOG_SERVICE_NAME` | `seclog` | Service name in log lines |
//! | `SECLOG_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `SECLOG_JSON_LOGS` | `false` | JSON output (defaults on in containers) |
//! | `SECLOG_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SECLOG_CHANNEL` | `default` | Ledger channel name |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, EVENT_FAILURES, INDEX_OPERATIONS, PURGE_FAILURES,
    RECORD_MUTATIONS, SCAN_SKIPPED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// A global subscriber that is already installed is not treated as an error.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;

    match init_logging(config) {
        Ok(()) | Err(TelemetryError::AlreadyInitialized(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
