//! # Query Engine
//!
//! Every read access pattern of the store.
//!
//! Severity is served from the index with a prefix scan. Every other
//! predicate (time range, submitter, attachment, attack type) is a full scan
//! of the record table with in-memory filtering. Results keep the ledger's
//! key order and are never re-sorted.

use crate::domain::entities::{
    HistoryEntry, PaginatedRecords, ScanReport, SecurityRecord, SkippedEntry,
};
use crate::domain::errors::RecordError;
use crate::domain::index::SeverityIndex;
use crate::domain::keys::{RecordId, StateKey};
use crate::domain::value_objects::{format_ledger_timestamp, StoreConfig, Timestamp};
use crate::ports::outbound::{KeyRange, LedgerState, RecordCodec};
use seclog_telemetry::{log_event, log_record_event, metric_inc, SCAN_SKIPPED};
use std::collections::BTreeMap;

/// Read-side view over a ledger.
pub struct QueryEngine<'a, L: ?Sized, C: ?Sized> {
    ledger: &'a L,
    codec: &'a C,
    index: &'a SeverityIndex,
    config: &'a StoreConfig,
}

impl<'a, L, C> QueryEngine<'a, L, C>
where
    L: LedgerState + ?Sized,
    C: RecordCodec + ?Sized,
{
    pub fn new(
        ledger: &'a L,
        codec: &'a C,
        index: &'a SeverityIndex,
        config: &'a StoreConfig,
    ) -> Self {
        Self {
            ledger,
            codec,
            index,
            config,
        }
    }

    /// Fetch and decode one record.
    pub fn get_by_id(&self, id: &RecordId) -> Result<SecurityRecord, RecordError> {
        let bytes = self
            .ledger
            .get(&StateKey::Record(id.clone()))?
            .ok_or_else(|| RecordError::not_found(id.as_str()))?;
        Ok(self.codec.decode(&bytes)?)
    }

    /// Records indexed under `severity`, in index key order.
    ///
    /// An index entry pointing at a missing or undecodable record is skipped
    /// and reported. Ledger failures abort the query.
    pub fn get_by_severity(&self, severity: &str) -> Result<ScanReport<SecurityRecord>, RecordError> {
        let ids = self.index.scan_by_severity(self.ledger, severity)?;
        let mut report = ScanReport::default();

        for id in ids {
            match self.get_by_id(&id) {
                Ok(record) => report.items.push(record),
                Err(err @ (RecordError::NotFound { .. } | RecordError::Codec(_))) => {
                    log_record_event!(
                        warn,
                        "query_by_severity",
                        "Skipping index entry",
                        id,
                        severity = %severity,
                        reason = %err
                    );
                    metric_inc!(SCAN_SKIPPED, &["severity"]);
                    report.skipped.push(SkippedEntry {
                        key: id.to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    /// Every record in key order. Composite entries are skipped by type; a
    /// record that fails to decode fails the scan.
    pub fn scan_all(&self) -> Result<Vec<SecurityRecord>, RecordError> {
        let mut records = Vec::new();
        for entry in self.ledger.scan_range(&KeyRange::all())? {
            let entry = entry?;
            if !entry.key.is_record() {
                continue;
            }
            records.push(self.codec.decode(&entry.value)?);
        }
        Ok(records)
    }

    /// Records with `start <= created_at_epoch <= end`.
    pub fn filter_by_time_range(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<SecurityRecord>, RecordError> {
        if start > end {
            return Ok(Vec::new());
        }
        self.filter(|r| (start..=end).contains(&r.created_at_epoch))
    }

    pub fn filter_by_submitter(&self, submitter: &str) -> Result<Vec<SecurityRecord>, RecordError> {
        self.filter(|r| r.submitter == submitter)
    }

    pub fn filter_with_attachment(&self) -> Result<Vec<SecurityRecord>, RecordError> {
        self.filter(SecurityRecord::has_attachment)
    }

    /// One page of the record table.
    ///
    /// Sizes above the configured maximum are clamped. Composite entries
    /// count toward the page but are dropped from it, so a page may hold
    /// fewer records than requested while more remain.
    pub fn paginate(&self, page_size: u32, bookmark: &str) -> Result<PaginatedRecords, RecordError> {
        if page_size == 0 {
            return Err(RecordError::validation("page size must be at least 1"));
        }
        let size = page_size.min(self.config.max_page_size);
        let (entries, metadata) =
            self.ledger
                .scan_range_paginated(&KeyRange::all(), size, bookmark)?;

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries.into_iter().filter(|e| e.key.is_record()) {
            records.push(self.codec.decode(&entry.value)?);
        }

        log_event!(
            debug,
            "query_paginated",
            "Page fetched",
            requested = page_size,
            fetched = metadata.fetched,
            records = records.len()
        );

        Ok(PaginatedRecords {
            records,
            bookmark: metadata.bookmark,
        })
    }

    /// Record count per attack type.
    pub fn count_by_attack_type(&self) -> Result<BTreeMap<String, u64>, RecordError> {
        let mut counts = BTreeMap::new();
        for record in self.scan_all()? {
            *counts.entry(record.attack_type).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Version history in ledger order. Deletions become tombstones;
    /// undecodable versions are skipped and reported.
    pub fn history(&self, id: &RecordId) -> Result<ScanReport<HistoryEntry>, RecordError> {
        let mut report = ScanReport::default();

        for modification in self.ledger.history_for_key(&StateKey::Record(id.clone()))? {
            let modification = modification?;
            let timestamp = match format_ledger_timestamp(modification.timestamp.seconds) {
                Some(text) => text,
                None => {
                    log_record_event!(
                        warn,
                        "query_history",
                        "Commit time has no RFC 3339 form",
                        id,
                        tx_id = %modification.tx_id,
                        seconds = modification.timestamp.seconds
                    );
                    String::new()
                }
            };

            if modification.is_delete || modification.value.is_empty() {
                report.items.push(HistoryEntry {
                    tx_id: modification.tx_id,
                    timestamp,
                    record: None,
                });
                continue;
            }

            match self.codec.decode(&modification.value) {
                Ok(record) => report.items.push(HistoryEntry {
                    tx_id: modification.tx_id,
                    timestamp,
                    record: Some(record),
                }),
                Err(err) => {
                    log_record_event!(
                        warn,
                        "query_history",
                        "Skipping undecodable version",
                        id,
                        tx_id = %modification.tx_id,
                        reason = %err
                    );
                    metric_inc!(SCAN_SKIPPED, &["history"]);
                    report.skipped.push(SkippedEntry {
                        key: modification.tx_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn filter<P>(&self, predicate: P) -> Result<Vec<SecurityRecord>, RecordError>
    where
        P: Fn(&SecurityRecord) -> bool,
    {
        Ok(self
            .scan_all()?
            .into_iter()
            .filter(|r| predicate(r))
            .collect())
    }
}
