//! # Severity Index
//!
//! Secondary index from severity to record id.
//!
//! Each live record owns exactly one composite entry
//! `(namespace, severity, id) -> 0x00`. The index never writes on its own:
//! every delta is staged into the caller's [`WriteBatch`] so it commits
//! atomically with the primary write that caused it.

use super::entities::IndexEntry;
use super::errors::{KeyError, LedgerError, RecordError};
use super::keys::{CompositeKey, RecordId, StateKey};
use super::value_objects::{INDEX_SENTINEL, SEVERITY_INDEX};
use crate::ports::outbound::{LedgerState, StateEntry, WriteBatch};
use std::collections::BTreeMap;

/// Severity index manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityIndex {
    namespace: String,
}

impl Default for SeverityIndex {
    fn default() -> Self {
        Self::new(SEVERITY_INDEX)
    }
}

impl SeverityIndex {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Index key for `(severity, id)`.
    pub fn key_for(&self, severity: &str, id: &RecordId) -> Result<CompositeKey, KeyError> {
        CompositeKey::new(&self.namespace, &[severity, id.as_str()])
    }

    /// Stage the entry for `(severity, id)`. Writing it twice is harmless.
    pub fn install(
        &self,
        batch: &mut WriteBatch,
        severity: &str,
        id: &RecordId,
    ) -> Result<(), KeyError> {
        let key = self.key_for(severity, id)?;
        batch.put(StateKey::Composite(key), INDEX_SENTINEL.to_vec());
        Ok(())
    }

    /// Stage removal of the entry for `(severity, id)`, present or not.
    pub fn remove(
        &self,
        batch: &mut WriteBatch,
        severity: &str,
        id: &RecordId,
    ) -> Result<(), KeyError> {
        let key = self.key_for(severity, id)?;
        batch.delete(StateKey::Composite(key));
        Ok(())
    }

    /// Move `id` from `old` to `new`. Returns `false` and stages nothing when
    /// the severity is unchanged.
    pub fn rekey(
        &self,
        batch: &mut WriteBatch,
        old: &str,
        new: &str,
        id: &RecordId,
    ) -> Result<bool, KeyError> {
        if old == new {
            return Ok(false);
        }
        self.remove(batch, old, id)?;
        self.install(batch, new, id)?;
        Ok(true)
    }

    /// Ids indexed under `severity`, in key order.
    pub fn scan_by_severity<L>(&self, ledger: &L, severity: &str) -> Result<Vec<RecordId>, RecordError>
    where
        L: LedgerState + ?Sized,
    {
        let cursor = ledger.scan_prefix(&self.namespace, &[severity])?;
        let mut ids = Vec::new();
        for entry in cursor {
            ids.push(self.decompose(entry?)?.id);
        }
        Ok(ids)
    }

    /// Entry count per severity, in one pass over the namespace.
    pub fn counts_by_severity<L>(&self, ledger: &L) -> Result<BTreeMap<String, u64>, RecordError>
    where
        L: LedgerState + ?Sized,
    {
        let mut counts = BTreeMap::new();
        for entry in ledger.scan_prefix(&self.namespace, &[])? {
            let entry = self.decompose(entry?)?;
            *counts.entry(entry.severity).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Every entry in the namespace, decomposed.
    pub fn entries<L>(&self, ledger: &L) -> Result<Vec<IndexEntry>, RecordError>
    where
        L: LedgerState + ?Sized,
    {
        ledger
            .scan_prefix(&self.namespace, &[])?
            .map(|entry| -> Result<IndexEntry, RecordError> { Ok(self.decompose(entry?)?) })
            .collect()
    }

    fn decompose(&self, entry: StateEntry) -> Result<IndexEntry, LedgerError> {
        let malformed = |reason: &str| LedgerError::CorruptKey(KeyError::Malformed(reason.to_string()));

        let StateKey::Composite(key) = entry.key else {
            return Err(malformed("index scan returned a record key"));
        };
        if key.namespace() != self.namespace {
            return Err(malformed("index entry outside the index namespace"));
        }
        let (_, parts) = key.into_parts();
        let [severity, id]: [String; 2] = parts
            .try_into()
            .map_err(|_| malformed("index entry must have exactly two parts"))?;
        let id = RecordId::parse(id).map_err(LedgerError::CorruptKey)?;
        Ok(IndexEntry { severity, id })
    }
}
