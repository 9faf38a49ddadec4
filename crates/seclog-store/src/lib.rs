//! # Security Log Store
//!
//! Append-and-mutate store for security incident records on an ordered
//! key-value ledger, with a secondary index on severity.
//!
//! ## Architecture
//!
//! Records and index entries share one ledger but live in disjoint key
//! tables:
//!
//! ```text
//! <record id>                          -> encoded SecurityRecord
//! 0x00 severity~id 0x00 <sev> 0x00 <id> 0x00 -> 0x00
//! ```
//!
//! Every mutation writes the record change and its index delta in a single
//! batch, so the index never drifts from the records it points at.
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Index Consistency | Every record has exactly one entry under its current severity |
//! | Atomic Writes | Record and index changes commit together or not at all |
//! | Disjoint Tables | Composite keys never collide with record ids |
//! | Cursor Release | Every scan cursor is dropped on every path |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Records, keys, the severity index and consistency checks
//! - `ports/` - Inbound API and outbound ledger/collaborator traits
//! - `service/` - Application service and query engine
//! - `adapters/` - In-memory ledger, codecs, infrastructure and dispatcher
//!
//! ## Usage
//!
//! ```ignore
//! use seclog_store::{InMemorySecurityLogService, NewRecord, SecurityLogApi, StoreConfig};
//!
//! let mut service = InMemorySecurityLogService::new_in_memory("Org1MSP", StoreConfig::default());
//!
//! let outcome = service.create(NewRecord::new("sqli", "10.0.0.1", "high", "union select"))?;
//! let high = service.query_by_severity("high")?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export key types for convenience
pub use domain::entities::{
    CreateOutcome, EventDelivery, HistoryEntry, IndexAudit, IndexEntry, NewRecord,
    PaginatedRecords, PurgeFailure, PurgeReport, RecordCreatedEvent, RecordUpdate, ScanReport,
    SecurityRecord, SkippedEntry,
};
pub use domain::errors::{
    CodecError, ConfigError, EventError, IdentityError, KeyError, LedgerError, RecordError,
    RecordErrorKind,
};
pub use domain::index::SeverityIndex;
pub use domain::keys::{CompositeKey, RecordId, StateKey};
pub use domain::value_objects::{StoreConfig, Timestamp};
pub use ports::inbound::SecurityLogApi;
pub use ports::outbound::{
    EventSink, IdGenerator, IdentityProvider, LedgerState, RecordCodec, TimeSource,
    TransactionalLedger,
};
pub use service::{InMemorySecurityLogService, SecurityLogDependencies, SecurityLogService};

// Re-export adapters
pub use adapters::{ContractHost, InMemoryLedger, Operation, Response};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
