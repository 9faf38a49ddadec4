//! # Value Objects
//!
//! Timestamps and store configuration.

use super::errors::ConfigError;
use chrono::{SecondsFormat, TimeZone, Utc};

/// Unix timestamp in seconds.
pub type Timestamp = i64;

/// Namespace of the severity secondary index.
pub const SEVERITY_INDEX: &str = "severity~id";

/// Value stored under every index key. Only the key carries information.
pub const INDEX_SENTINEL: [u8; 1] = [0x00];

/// Event emitted after a record is created.
pub const CREATED_EVENT: &str = "SecurityLogCreated";

/// Default upper bound for one page of `query_paginated`.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

/// Format epoch seconds as RFC 3339, seconds precision, `Z` suffix.
///
/// Returns `None` for instants chrono cannot represent.
pub fn format_ledger_timestamp(seconds: Timestamp) -> Option<String> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// The two redundant forms of a record's timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStamp {
    pub text: String,
    pub epoch: Timestamp,
}

impl RecordStamp {
    /// Stamp for `epoch`, or `None` when the instant has no RFC 3339 form.
    pub fn at(epoch: Timestamp) -> Option<Self> {
        format_ledger_timestamp(epoch).map(|text| Self { text, epoch })
    }
}

/// Configuration for the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Composite key namespace of the severity index (default: `severity~id`).
    ///
    /// Changing this on a ledger with existing data orphans the old index.
    pub index_namespace: String,

    /// Name of the event emitted on create (default: `SecurityLogCreated`).
    pub created_event: String,

    /// Largest page `query_paginated` will request (default: 1000).
    pub max_page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_namespace: SEVERITY_INDEX.to_string(),
            created_event: CREATED_EVENT.to_string(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `SECLOG_INDEX_NAMESPACE`, `SECLOG_CREATED_EVENT`
    /// and `SECLOG_MAX_PAGE_SIZE`, then validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ns) = lookup("SECLOG_INDEX_NAMESPACE") {
            config.index_namespace = ns;
        }
        if let Some(name) = lookup("SECLOG_CREATED_EVENT") {
            config.created_event = name;
        }
        if let Some(raw) = lookup("SECLOG_MAX_PAGE_SIZE") {
            config.max_page_size =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                        field: "max_page_size",
                        reason: e.to_string(),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_namespace.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "index_namespace",
                reason: "must not be empty".to_string(),
            });
        }
        if self.index_namespace.contains('\0') {
            return Err(ConfigError::InvalidValue {
                field: "index_namespace",
                reason: "must not contain the NUL character".to_string(),
            });
        }
        if self.created_event.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "created_event",
                reason: "must not be empty".to_string(),
            });
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
