//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the security log service.
//!
//! These are the interfaces the host runtime implements. Reference adapters
//! for every port live in `crate::adapters`.

use crate::domain::entities::SecurityRecord;
use crate::domain::errors::{CodecError, EventError, IdentityError, KeyError, LedgerError};
use crate::domain::keys::{CompositeKey, RecordId, StateKey};
use crate::domain::value_objects::Timestamp;

/// Iterator over a range or prefix scan, in ascending key order.
///
/// Dropping the cursor releases it, whether or not it was exhausted.
pub type StateCursor<'a> = Box<dyn Iterator<Item = Result<StateEntry, LedgerError>> + 'a>;

/// Iterator over the version history of one key.
pub type HistoryCursor<'a> = Box<dyn Iterator<Item = Result<KeyModification, LedgerError>> + 'a>;

/// Ordered key-value ledger supplied by the host.
///
/// Production: the host peer's world state.
/// Testing: `InMemoryLedger` (adapters/ledger/memory.rs)
pub trait LedgerState: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &StateKey) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &StateKey, value: &[u8]) -> Result<(), LedgerError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&mut self, key: &StateKey) -> Result<(), LedgerError>;

    /// Execute an atomic batch write.
    ///
    /// Either every operation in the batch is applied, or none is.
    fn atomic_batch_write(&mut self, batch: WriteBatch) -> Result<(), LedgerError>;

    /// Ascending scan over `[start, end)`. An open bound is unbounded.
    fn scan_range(&self, range: &KeyRange) -> Result<StateCursor<'_>, LedgerError>;

    /// Ascending scan over every composite key in `namespace` whose leading
    /// parts equal `parts`.
    fn scan_prefix(&self, namespace: &str, parts: &[&str]) -> Result<StateCursor<'_>, LedgerError>;

    /// One page of a range scan.
    ///
    /// `bookmark` is empty for the first page, otherwise the value returned
    /// with the previous page. The returned bookmark is empty once the range
    /// is exhausted.
    fn scan_range_paginated(
        &self,
        range: &KeyRange,
        page_size: u32,
        bookmark: &str,
    ) -> Result<(Vec<StateEntry>, PageMetadata), LedgerError>;

    /// Every committed version of `key`, including deletions.
    fn history_for_key(&self, key: &StateKey) -> Result<HistoryCursor<'_>, LedgerError>;

    /// Build a composite key.
    fn create_composite_key(&self, namespace: &str, parts: &[&str]) -> Result<CompositeKey, KeyError> {
        CompositeKey::new(namespace, parts)
    }

    /// Decompose encoded composite key bytes into `(namespace, parts)`.
    fn split_composite_key(&self, encoded: &[u8]) -> Result<(String, Vec<String>), KeyError> {
        CompositeKey::decode(encoded).map(CompositeKey::into_parts)
    }
}

/// Transaction control, used by the contract host around each invocation.
pub trait TransactionalLedger: LedgerState {
    /// Open a transaction. Writes are buffered until commit.
    fn begin_transaction(&mut self, tx_id: &str, timestamp: LedgerTimestamp) -> Result<(), LedgerError>;

    /// Apply buffered writes and record them in key history.
    fn commit_transaction(&mut self) -> Result<(), LedgerError>;

    /// Discard buffered writes.
    fn rollback_transaction(&mut self) -> Result<(), LedgerError>;

    fn in_transaction(&self) -> bool;
}

/// A key and its stored bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub key: StateKey,
    pub value: Vec<u8>,
}

/// Key range for scans. `start` is inclusive, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyRange {
    pub start: Option<StateKey>,
    pub end: Option<StateKey>,
}

impl KeyRange {
    /// The whole key space.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: StateKey, end: StateKey) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Pagination metadata returned with each page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageMetadata {
    /// Entries in this page.
    pub fetched: u32,
    /// Continuation token; empty when no more pages exist.
    pub bookmark: String,
}

/// Ledger commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct LedgerTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl LedgerTimestamp {
    pub fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }
}

/// One committed change to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    pub tx_id: String,
    pub timestamp: LedgerTimestamp,
    /// Empty for deletions.
    pub value: Vec<u8>,
    pub is_delete: bool,
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: StateKey, value: Vec<u8> },
    /// Delete a key.
    Delete { key: StateKey },
}

impl BatchOperation {
    pub fn put(key: StateKey, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key,
            value: value.into(),
        }
    }

    pub fn delete(key: StateKey) -> Self {
        BatchOperation::Delete { key }
    }

    pub fn key(&self) -> &StateKey {
        match self {
            BatchOperation::Put { key, .. } | BatchOperation::Delete { key } => key,
        }
    }
}

/// Ordered set of writes applied atomically.
///
/// Later operations on the same key win.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriteBatch {
    operations: Vec<BatchOperation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: StateKey, value: impl Into<Vec<u8>>) {
        self.operations.push(BatchOperation::put(key, value));
    }

    pub fn delete(&mut self, key: StateKey) {
        self.operations.push(BatchOperation::delete(key));
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[BatchOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<BatchOperation> {
        self.operations
    }
}

/// Record serialization.
pub trait RecordCodec: Send + Sync {
    fn encode(&self, record: &SecurityRecord) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<SecurityRecord, CodecError>;
}

/// Submitter identity of the current invocation.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Result<String, IdentityError>;
}

/// Host event channel.
pub trait EventSink: Send + Sync {
    fn emit(&self, name: &str, payload: &[u8]) -> Result<(), EventError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

/// Source of fresh record ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RecordId;
}
