//! # Domain Errors
//!
//! Error types for the security log store.
//!
//! ## Design Principles
//!
//! - Each port has its own error type; the service converts them into
//!   [`RecordError`] at the boundary
//! - Event emission failures never become a `RecordError`, they are reported
//!   through `EventDelivery`
//! - No panics in domain logic (use Result instead)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by every public store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A required input field is missing or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The addressed record id does not exist.
    #[error("Security record not found: {id}")]
    NotFound { id: String },

    /// Stored bytes could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The ledger rejected or failed a call.
    #[error(transparent)]
    Storage(#[from] LedgerError),

    /// The submitter identity could not be obtained.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl RecordError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a missing record.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Error category, stable across message wording changes.
    pub fn kind(&self) -> RecordErrorKind {
        match self {
            Self::Validation(_) => RecordErrorKind::Validation,
            Self::NotFound { .. } => RecordErrorKind::NotFound,
            Self::Codec(_) => RecordErrorKind::Codec,
            Self::Storage(_) => RecordErrorKind::Storage,
            Self::Identity(_) => RecordErrorKind::Identity,
        }
    }
}

impl From<KeyError> for RecordError {
    fn from(err: KeyError) -> Self {
        RecordError::Validation(err.to_string())
    }
}

/// Error type enumeration for host responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordErrorKind {
    Validation,
    NotFound,
    Codec,
    Storage,
    Identity,
}

/// Serializable error for host responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordErrorPayload {
    pub error_type: RecordErrorKind,
    pub message: String,
}

impl From<&RecordError> for RecordErrorPayload {
    fn from(err: &RecordError) -> Self {
        Self {
            error_type: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Key construction and decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Record ids must be non-empty.
    #[error("record id must not be empty")]
    EmptyRecordId,

    /// Composite namespaces must be non-empty.
    #[error("composite key namespace must not be empty")]
    EmptyNamespace,

    /// The NUL byte separates composite key components.
    #[error("{component} must not contain the NUL character")]
    ReservedCharacter { component: &'static str },

    /// Key bytes are not valid UTF-8.
    #[error("key is not valid UTF-8")]
    InvalidUtf8,

    /// Key bytes do not follow the composite layout.
    #[error("malformed composite key: {0}")]
    Malformed(String),
}

/// Ledger (storage port) errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// I/O or substrate failure.
    #[error("Ledger I/O error: {message}")]
    Io { message: String },

    /// A stored key could not be decoded into a typed key.
    #[error("Corrupt ledger key: {0}")]
    CorruptKey(KeyError),

    /// Continuation token could not be interpreted by the ledger.
    #[error("Invalid continuation token: {0}")]
    InvalidBookmark(String),

    /// The call itself was malformed (e.g. zero page size).
    #[error("Invalid ledger request: {0}")]
    InvalidRequest(String),

    /// Transaction bookkeeping misuse (commit without begin, ...).
    #[error("Transaction error: {0}")]
    Transaction(String),
}

impl LedgerError {
    /// Shorthand for an I/O failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Record codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Codec error: {message}")]
pub struct CodecError {
    pub message: String,
}

impl CodecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Identity port errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The execution context carries no usable submitter identity.
    #[error("Submitter identity unavailable: {0}")]
    Unavailable(String),
}

/// Event port errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The host refused or failed to record the event.
    #[error("Event emission failed: {0}")]
    Rejected(String),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
