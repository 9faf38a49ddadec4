//! Structured logging setup.
//!
//! Every log line carries consistent fields so a log shipper can index them:
//! - `service`: Service name (see [`TelemetryConfig::full_service_name`])
//! - `operation`: Ledger operation being executed (create, update, purge, ...)
//! - `record_id`: Record the line is about, when there is one
//! - `severity`: Severity value, for index maintenance lines

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global `tracing` subscriber.
///
/// Fails with [`TelemetryError::AlreadyInitialized`] when a global subscriber
/// is already set, which callers running several stores in one process can
/// safely ignore.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match (config.console_output, config.json_logs) {
        (true, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        (true, false) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(true),
            )
            .try_init(),
        (false, _) => registry.try_init(),
    };
    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.full_service_name(),
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}

/// Emit a structured log line with an `operation` field.
#[macro_export]
macro_rules! log_event {
    (info, $operation:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            operation = $operation,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $operation:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            operation = $operation,
            $($($field)*,)?
            $msg
        )
    };

    (error, $operation:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            operation = $operation,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $operation:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            operation = $operation,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a record-related event with standard fields.
#[macro_export]
macro_rules! log_record_event {
    ($level:ident, $operation:expr, $msg:expr, $record_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            operation = $operation,
            record_id = %$record_id,
            $($($field)*,)?
            $msg
        )
    };
}
