use crate::domain::errors::LedgerError;
use crate::domain::keys::StateKey;
use crate::ports::outbound::{
    BatchOperation, HistoryCursor, KeyModification, KeyRange, LedgerState, LedgerTimestamp,
    PageMetadata, StateCursor, StateEntry, TransactionalLedger, WriteBatch,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Pending writes keyed by encoded key; `None` is a delete.
type WriteSet = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

struct PendingTransaction {
    tx_id: String,
    timestamp: LedgerTimestamp,
    writes: WriteSet,
}

/// In-memory ordered ledger for unit tests and local use.
///
/// Behaves like a host world state:
/// - keys are ordered byte-lexicographically
/// - writes inside a transaction are buffered and invisible to reads until
///   commit
/// - writes outside a transaction commit immediately as their own transaction
/// - every committed write is appended to the key's history
///
/// Open cursors are counted so tests can assert that scans release them.
pub struct InMemoryLedger {
    state: BTreeMap<Vec<u8>, Vec<u8>>,
    history: HashMap<Vec<u8>, Vec<KeyModification>>,
    pending: Option<PendingTransaction>,
    open_cursors: Arc<AtomicUsize>,
    failing_keys: HashSet<Vec<u8>>,
    scan_failure_after: Option<usize>,
    auto_commits: u64,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self {
            state: BTreeMap::new(),
            history: HashMap::new(),
            pending: None,
            open_cursors: Arc::new(AtomicUsize::new(0)),
            failing_keys: HashSet::new(),
            scan_failure_after: None,
            auto_commits: 0,
        }
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursors handed out and not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Committed key count, both tables.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Reject every write touching `key`. A rejected batch stages nothing.
    pub fn fail_writes_to(&mut self, key: &StateKey) {
        self.failing_keys.insert(key.encode());
    }

    /// Make every cursor yield an error after `n` entries.
    pub fn fail_scans_after(&mut self, n: usize) {
        self.scan_failure_after = Some(n);
    }

    pub fn clear_faults(&mut self) {
        self.failing_keys.clear();
        self.scan_failure_after = None;
    }

    /// Write raw bytes into committed state, bypassing history.
    pub fn insert_raw(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.state.insert(key, value);
    }

    fn check_writable(&self, key: &[u8]) -> Result<(), LedgerError> {
        if self.failing_keys.contains(key) {
            return Err(LedgerError::io(format!(
                "write rejected for key {}",
                String::from_utf8_lossy(key)
            )));
        }
        Ok(())
    }

    /// Stage into the open transaction, or commit immediately.
    fn write(&mut self, writes: WriteSet) {
        match self.pending.as_mut() {
            Some(tx) => tx.writes.extend(writes),
            None => {
                self.auto_commits += 1;
                let tx_id = format!("auto-{}", self.auto_commits);
                self.apply(writes, &tx_id, system_timestamp());
            }
        }
    }

    fn apply(&mut self, writes: WriteSet, tx_id: &str, timestamp: LedgerTimestamp) {
        for (key, value) in writes {
            let modification = match value {
                Some(value) => {
                    self.state.insert(key.clone(), value.clone());
                    KeyModification {
                        tx_id: tx_id.to_string(),
                        timestamp,
                        value,
                        is_delete: false,
                    }
                }
                None => {
                    if self.state.remove(&key).is_none() {
                        continue;
                    }
                    KeyModification {
                        tx_id: tx_id.to_string(),
                        timestamp,
                        value: Vec::new(),
                        is_delete: true,
                    }
                }
            };
            self.history.entry(key).or_default().push(modification);
        }
    }

    fn cursor<T: 'static>(&self, items: Vec<Result<T, LedgerError>>) -> TrackedCursor<T> {
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        TrackedCursor {
            items: items.into_iter(),
            fail_after: self.scan_failure_after,
            failed: false,
            open: Arc::clone(&self.open_cursors),
        }
    }

    fn range_bounds(range: &KeyRange) -> Option<(Vec<u8>, Option<Vec<u8>>)> {
        let start = range.start.as_ref().map(StateKey::encode).unwrap_or_default();
        let end = range.end.as_ref().map(StateKey::encode);
        match &end {
            Some(end) if *end <= start => None,
            _ => Some((start, end)),
        }
    }

    fn collect_range(&self, start: Vec<u8>, end: Option<Vec<u8>>) -> Vec<(Vec<u8>, Vec<u8>)> {
        let upper = match end {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        self.state
            .range((Bound::Included(start), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn decode_entry(key: Vec<u8>, value: Vec<u8>) -> Result<StateEntry, LedgerError> {
    let key = StateKey::decode(&key).map_err(LedgerError::CorruptKey)?;
    Ok(StateEntry { key, value })
}

fn system_timestamp() -> LedgerTimestamp {
    let elapsed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    LedgerTimestamp {
        seconds: i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
        nanos: elapsed.subsec_nanos(),
    }
}

impl LedgerState for InMemoryLedger {
    fn get(&self, key: &StateKey) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.state.get(&key.encode()).cloned())
    }

    fn put(&mut self, key: &StateKey, value: &[u8]) -> Result<(), LedgerError> {
        let mut batch = WriteBatch::new();
        batch.put(key.clone(), value);
        self.atomic_batch_write(batch)
    }

    fn delete(&mut self, key: &StateKey) -> Result<(), LedgerError> {
        let mut batch = WriteBatch::new();
        batch.delete(key.clone());
        self.atomic_batch_write(batch)
    }

    fn atomic_batch_write(&mut self, batch: WriteBatch) -> Result<(), LedgerError> {
        let mut writes = WriteSet::new();
        for op in batch.into_operations() {
            let (key, value) = match op {
                BatchOperation::Put { key, value } => (key.encode(), Some(value)),
                BatchOperation::Delete { key } => (key.encode(), None),
            };
            self.check_writable(&key)?;
            writes.insert(key, value);
        }
        self.write(writes);
        Ok(())
    }

    fn scan_range(&self, range: &KeyRange) -> Result<StateCursor<'_>, LedgerError> {
        let entries = match Self::range_bounds(range) {
            Some((start, end)) => self.collect_range(start, end),
            None => Vec::new(),
        };
        let items: Vec<_> = entries
            .into_iter()
            .map(|(k, v)| decode_entry(k, v))
            .collect();
        Ok(Box::new(self.cursor(items)))
    }

    fn scan_prefix(&self, namespace: &str, parts: &[&str]) -> Result<StateCursor<'_>, LedgerError> {
        let prefix = self
            .create_composite_key(namespace, parts)
            .map_err(|e| LedgerError::InvalidRequest(e.to_string()))?
            .encode();
        let items: Vec<_> = self
            .state
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| decode_entry(k.clone(), v.clone()))
            .collect();
        Ok(Box::new(self.cursor(items)))
    }

    fn scan_range_paginated(
        &self,
        range: &KeyRange,
        page_size: u32,
        bookmark: &str,
    ) -> Result<(Vec<StateEntry>, PageMetadata), LedgerError> {
        if page_size == 0 {
            return Err(LedgerError::InvalidRequest(
                "page size must be at least 1".to_string(),
            ));
        }
        let Some((mut start, end)) = Self::range_bounds(range) else {
            return Ok((Vec::new(), PageMetadata::default()));
        };
        if !bookmark.is_empty() {
            let resume =
                hex::decode(bookmark).map_err(|e| LedgerError::InvalidBookmark(e.to_string()))?;
            if resume < start || end.as_ref().map_or(false, |end| resume >= *end) {
                return Err(LedgerError::InvalidBookmark(
                    "bookmark lies outside the requested range".to_string(),
                ));
            }
            start = resume;
        }

        let limit = page_size as usize;
        let mut raw = self.collect_range(start, end);
        let bookmark = if raw.len() > limit {
            let next = hex::encode(&raw[limit].0);
            raw.truncate(limit);
            next
        } else {
            String::new()
        };

        let entries = raw
            .into_iter()
            .map(|(k, v)| decode_entry(k, v))
            .collect::<Result<Vec<_>, _>>()?;
        let metadata = PageMetadata {
            fetched: entries.len() as u32,
            bookmark,
        };
        Ok((entries, metadata))
    }

    fn history_for_key(&self, key: &StateKey) -> Result<HistoryCursor<'_>, LedgerError> {
        let items: Vec<Result<KeyModification, LedgerError>> = self
            .history
            .get(&key.encode())
            .map(|mods| mods.iter().cloned().map(Ok).collect())
            .unwrap_or_default();
        Ok(Box::new(self.cursor(items)))
    }
}

impl TransactionalLedger for InMemoryLedger {
    fn begin_transaction(&mut self, tx_id: &str, timestamp: LedgerTimestamp) -> Result<(), LedgerError> {
        if let Some(open) = &self.pending {
            return Err(LedgerError::Transaction(format!(
                "transaction {} is still open",
                open.tx_id
            )));
        }
        self.pending = Some(PendingTransaction {
            tx_id: tx_id.to_string(),
            timestamp,
            writes: WriteSet::new(),
        });
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<(), LedgerError> {
        let tx = self
            .pending
            .take()
            .ok_or_else(|| LedgerError::Transaction("no open transaction to commit".to_string()))?;
        self.apply(tx.writes, &tx.tx_id, tx.timestamp);
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<(), LedgerError> {
        self.pending
            .take()
            .map(|_| ())
            .ok_or_else(|| LedgerError::Transaction("no open transaction to roll back".to_string()))
    }

    fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }
}

/// Snapshot cursor that decrements the ledger's open-cursor count on drop.
struct TrackedCursor<T> {
    items: std::vec::IntoIter<Result<T, LedgerError>>,
    fail_after: Option<usize>,
    failed: bool,
    open: Arc<AtomicUsize>,
}

impl<T> Iterator for TrackedCursor<T> {
    type Item = Result<T, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.fail_after.as_mut() {
            Some(0) => {
                self.failed = true;
                return Some(Err(LedgerError::io("injected scan failure")));
            }
            Some(remaining) => *remaining -= 1,
            None => {}
        }
        self.items.next()
    }
}

impl<T> Drop for TrackedCursor<T> {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
