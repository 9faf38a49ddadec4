//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `seclog_store=debug,info`
    pub log_level: String,

    /// Whether to emit logs to stdout at all
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Ledger channel the store is attached to (used only as a log field)
    pub channel: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "seclog".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            channel: "default".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SECLOG_SERVICE_NAME`: Service name (default: seclog)
    /// - `SECLOG_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `SECLOG_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `SECLOG_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `SECLOG_CHANNEL`: Ledger channel name (default: default)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("SECLOG_SERVICE_NAME").unwrap_or_else(|_| "seclog".to_string()),

            log_level: env::var("SECLOG_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("SECLOG_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v).unwrap_or(true))
                .unwrap_or(true),

            json_logs: env::var("SECLOG_JSON_LOGS")
                .map(|v| parse_flag(&v).unwrap_or(is_container))
                .unwrap_or(is_container),

            channel: env::var("SECLOG_CHANNEL").unwrap_or_else(|_| "default".to_string()),
        }
    }

    /// Service name qualified with the channel, e.g. `seclog@mychannel`.
    pub fn full_service_name(&self) -> String {
        if self.channel == "default" {
            self.service_name.clone()
        } else {
            format!("{}@{}", self.service_name, self.channel)
        }
    }
}

/// Parse a boolean-ish environment value. Unrecognized values yield `None`.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
