//! # Inbound Ports (Driving Ports)
//!
//! The public operation surface of the security log store.

use crate::domain::entities::{
    CreateOutcome, HistoryEntry, IndexAudit, NewRecord, PaginatedRecords, PurgeReport,
    RecordUpdate, ScanReport, SecurityRecord,
};
use crate::domain::errors::RecordError;
use crate::domain::value_objects::Timestamp;
use std::collections::BTreeMap;

/// Primary API of the security log store.
///
/// Every mutation runs inside the host's enclosing transaction. A mutation
/// that returns `Err` has staged no writes of its own; whether earlier writes
/// in the same transaction survive is up to the host.
///
/// Ids arrive as raw strings and are validated here: an empty id is a
/// `Validation` error, never a `NotFound`.
pub trait SecurityLogApi {
    /// Create a record without an attachment.
    ///
    /// The record and its index entry are written in one atomic batch. The
    /// creation event is emitted afterwards and its outcome reported in
    /// `CreateOutcome::event`; a failed emission does not fail the create.
    ///
    /// ## Errors
    ///
    /// - `Validation`: attack type, source IP or severity is empty
    /// - `Identity`: the submitter identity is unavailable
    /// - `Storage`: the batch write failed
    fn create(&mut self, input: NewRecord) -> Result<CreateOutcome, RecordError>;

    /// Create a record carrying an external attachment reference.
    fn create_with_attachment(
        &mut self,
        input: NewRecord,
        reference: &str,
    ) -> Result<CreateOutcome, RecordError>;

    /// Read one record.
    fn read(&self, id: &str) -> Result<SecurityRecord, RecordError>;

    /// Replace the mutable fields of a record and re-stamp it.
    ///
    /// A severity change moves the index entry in the same batch. Submitter
    /// and attachment reference are preserved.
    ///
    /// Fields are validated like [`create`](Self::create): an empty attack
    /// type, source IP or severity is a `Validation` error.
    fn update(&mut self, id: &str, changes: RecordUpdate) -> Result<SecurityRecord, RecordError>;

    /// Remove a record and its index entry.
    fn delete(&mut self, id: &str) -> Result<(), RecordError>;

    /// Set the attachment reference and re-stamp. The index is untouched.
    ///
    /// An empty reference clears the attachment.
    fn attach_reference(&mut self, id: &str, reference: &str) -> Result<SecurityRecord, RecordError>;

    /// Records with `severity`, in index key order.
    ///
    /// Index entries whose record is missing or undecodable are skipped and
    /// listed in the report.
    fn query_by_severity(&self, severity: &str) -> Result<ScanReport<SecurityRecord>, RecordError>;

    /// Every record in key order.
    fn query_all(&self) -> Result<Vec<SecurityRecord>, RecordError>;

    /// Records with a non-empty attachment reference.
    fn query_with_attachment(&self) -> Result<Vec<SecurityRecord>, RecordError>;

    /// Records created in `[start, end]` (epoch seconds, inclusive).
    fn query_by_time_range(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<SecurityRecord>, RecordError>;

    /// Records captured from `submitter` (exact match).
    fn query_by_submitter(&self, submitter: &str) -> Result<Vec<SecurityRecord>, RecordError>;

    /// One page of records. Pass the returned bookmark back for the next page.
    fn query_paginated(
        &self,
        page_size: u32,
        bookmark: &str,
    ) -> Result<PaginatedRecords, RecordError>;

    /// Every committed version of a record, tombstones included.
    fn query_history(&self, id: &str) -> Result<ScanReport<HistoryEntry>, RecordError>;

    /// Index entry count per severity.
    fn count_by_severity(&self) -> Result<BTreeMap<String, u64>, RecordError>;

    /// Record count per attack type.
    fn count_by_attack_type(&self) -> Result<BTreeMap<String, u64>, RecordError>;

    /// Delete every record created strictly before `threshold`.
    ///
    /// Each record is removed in its own batch. Failures are collected in the
    /// report and the purge moves on to the next record.
    fn purge_older_than(&mut self, threshold: Timestamp) -> Result<PurgeReport, RecordError>;

    /// Compare every record against the severity index.
    fn audit_index(&self) -> Result<IndexAudit, RecordError>;
}
