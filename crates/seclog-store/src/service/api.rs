//! # Security Log API Implementation
//!
//! Implements the SecurityLogApi trait on top of the record mutations and
//! the query engine.

use super::records::parse_id;
use super::*;
use crate::domain::entities::{
    validate_severity, CreateOutcome, HistoryEntry, IndexAudit, NewRecord, PaginatedRecords,
    PurgeReport, RecordUpdate, ScanReport, SecurityRecord,
};
use crate::domain::errors::RecordError;
use crate::domain::value_objects::Timestamp;
use crate::ports::inbound::SecurityLogApi;
use std::collections::BTreeMap;

impl<L, C, I, E, T, G> SecurityLogApi for SecurityLogService<L, C, I, E, T, G>
where
    L: LedgerState,
    C: RecordCodec,
    I: IdentityProvider,
    E: EventSink,
    T: TimeSource,
    G: IdGenerator,
{
    fn create(&mut self, input: NewRecord) -> Result<CreateOutcome, RecordError> {
        self.create_record(input, "")
    }

    fn create_with_attachment(
        &mut self,
        input: NewRecord,
        reference: &str,
    ) -> Result<CreateOutcome, RecordError> {
        self.create_record(input, reference)
    }

    fn read(&self, id: &str) -> Result<SecurityRecord, RecordError> {
        let id = parse_id(id)?;
        self.query().get_by_id(&id)
    }

    fn update(&mut self, id: &str, changes: RecordUpdate) -> Result<SecurityRecord, RecordError> {
        self.update_record(id, changes)
    }

    fn delete(&mut self, id: &str) -> Result<(), RecordError> {
        self.delete_record(id)
    }

    fn attach_reference(&mut self, id: &str, reference: &str) -> Result<SecurityRecord, RecordError> {
        self.attach(id, reference)
    }

    fn query_by_severity(&self, severity: &str) -> Result<ScanReport<SecurityRecord>, RecordError> {
        validate_severity(severity).map_err(RecordError::Validation)?;
        self.query().get_by_severity(severity)
    }

    fn query_all(&self) -> Result<Vec<SecurityRecord>, RecordError> {
        self.query().scan_all()
    }

    fn query_with_attachment(&self) -> Result<Vec<SecurityRecord>, RecordError> {
        self.query().filter_with_attachment()
    }

    fn query_by_time_range(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<SecurityRecord>, RecordError> {
        self.query().filter_by_time_range(start, end)
    }

    fn query_by_submitter(&self, submitter: &str) -> Result<Vec<SecurityRecord>, RecordError> {
        self.query().filter_by_submitter(submitter)
    }

    fn query_paginated(
        &self,
        page_size: u32,
        bookmark: &str,
    ) -> Result<PaginatedRecords, RecordError> {
        self.query().paginate(page_size, bookmark)
    }

    fn query_history(&self, id: &str) -> Result<ScanReport<HistoryEntry>, RecordError> {
        let id = parse_id(id)?;
        self.query().history(&id)
    }

    fn count_by_severity(&self) -> Result<BTreeMap<String, u64>, RecordError> {
        self.index.counts_by_severity(&self.ledger)
    }

    fn count_by_attack_type(&self) -> Result<BTreeMap<String, u64>, RecordError> {
        self.query().count_by_attack_type()
    }

    fn purge_older_than(&mut self, threshold: Timestamp) -> Result<PurgeReport, RecordError> {
        self.purge(threshold)
    }

    fn audit_index(&self) -> Result<IndexAudit, RecordError> {
        self.audit()
    }
}
