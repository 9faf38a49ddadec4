//! # Security Log Service - Record Mutations
//!
//! Create, update, attach, delete and purge. Each mutation builds one
//! [`WriteBatch`] holding the primary write and its index delta and hands it
//! to the ledger in a single call.

use super::*;
use crate::domain::entities::{
    validate_fields, CreateOutcome, EventDelivery, IndexAudit, NewRecord, PurgeFailure,
    PurgeReport, RecordCreatedEvent, RecordUpdate, SecurityRecord,
};
use crate::domain::errors::{LedgerError, RecordError};
use crate::domain::invariants::audit_index_consistency;
use crate::domain::keys::{RecordId, StateKey};
use crate::domain::value_objects::{RecordStamp, Timestamp};
use crate::ports::outbound::WriteBatch;
use seclog_telemetry::{
    log_event, log_record_event, metric_inc, EVENT_FAILURES, INDEX_OPERATIONS, PURGE_FAILURES,
    RECORD_MUTATIONS,
};

impl<L, C, I, E, T, G> SecurityLogService<L, C, I, E, T, G>
where
    L: LedgerState,
    C: RecordCodec,
    I: IdentityProvider,
    E: EventSink,
    T: TimeSource,
    G: IdGenerator,
{
    pub(crate) fn create_record(
        &mut self,
        input: NewRecord,
        reference: &str,
    ) -> Result<CreateOutcome, RecordError> {
        input.validate().map_err(RecordError::Validation)?;
        let submitter = self.identity.current_identity()?;

        let id = self.ids.next_id();
        let key = StateKey::Record(id.clone());
        if self.ledger.get(&key)?.is_some() {
            return Err(LedgerError::InvalidRequest(format!("record id {id} is already in use")).into());
        }

        let stamp = self.stamp_now()?;
        let record = SecurityRecord {
            id,
            created_at: stamp.text,
            created_at_epoch: stamp.epoch,
            attack_type: input.attack_type,
            source_ip: input.source_ip,
            severity: input.severity,
            description: input.description,
            submitter,
            attachment_reference: reference.to_string(),
        };

        let mut batch = WriteBatch::new();
        self.stage_record(&mut batch, &record)?;
        self.index.install(&mut batch, &record.severity, &record.id)?;
        self.ledger.atomic_batch_write(batch)?;

        metric_inc!(RECORD_MUTATIONS, &["created"]);
        metric_inc!(INDEX_OPERATIONS, &["install"]);
        log_record_event!(
            info,
            "create",
            "Security record created",
            record.id,
            severity = %record.severity,
            submitter = %record.submitter
        );

        let event = self.emit_created(&record);
        Ok(CreateOutcome { record, event })
    }

    pub(crate) fn update_record(
        &mut self,
        id: &str,
        changes: RecordUpdate,
    ) -> Result<SecurityRecord, RecordError> {
        let id = parse_id(id)?;
        validate_fields(&changes.attack_type, &changes.source_ip, &changes.severity)
            .map_err(RecordError::Validation)?;

        let mut record = self.query().get_by_id(&id)?;
        let old_severity = std::mem::replace(&mut record.severity, changes.severity);
        record.attack_type = changes.attack_type;
        record.source_ip = changes.source_ip;
        record.description = changes.description;
        self.restamp(&mut record)?;

        let mut batch = WriteBatch::new();
        self.stage_record(&mut batch, &record)?;
        let moved = self
            .index
            .rekey(&mut batch, &old_severity, &record.severity, &record.id)?;
        self.ledger.atomic_batch_write(batch)?;

        metric_inc!(RECORD_MUTATIONS, &["updated"]);
        if moved {
            metric_inc!(INDEX_OPERATIONS, &["remove"]);
            metric_inc!(INDEX_OPERATIONS, &["install"]);
        }
        log_record_event!(
            info,
            "update",
            "Security record updated",
            record.id,
            old_severity = %old_severity,
            severity = %record.severity
        );
        Ok(record)
    }

    pub(crate) fn attach(&mut self, id: &str, reference: &str) -> Result<SecurityRecord, RecordError> {
        let id = parse_id(id)?;
        let mut record = self.query().get_by_id(&id)?;
        record.attachment_reference = reference.to_string();
        self.restamp(&mut record)?;

        let mut batch = WriteBatch::new();
        self.stage_record(&mut batch, &record)?;
        self.ledger.atomic_batch_write(batch)?;

        metric_inc!(RECORD_MUTATIONS, &["attached"]);
        log_record_event!(
            info,
            "attach_reference",
            "Attachment reference set",
            record.id,
            cleared = reference.is_empty()
        );
        Ok(record)
    }

    pub(crate) fn delete_record(&mut self, id: &str) -> Result<(), RecordError> {
        let id = parse_id(id)?;
        let record = self.query().get_by_id(&id)?;
        self.remove_with_index(&record)?;

        metric_inc!(RECORD_MUTATIONS, &["deleted"]);
        log_record_event!(
            info,
            "delete",
            "Security record deleted",
            record.id,
            severity = %record.severity
        );
        Ok(())
    }

    pub(crate) fn purge(&mut self, threshold: Timestamp) -> Result<PurgeReport, RecordError> {
        let records = self.query().scan_all()?;
        let mut report = PurgeReport {
            examined: records.len(),
            ..PurgeReport::default()
        };

        for record in records
            .into_iter()
            .filter(|r| r.created_at_epoch < threshold)
        {
            match self.remove_with_index(&record) {
                Ok(()) => {
                    metric_inc!(RECORD_MUTATIONS, &["purged"]);
                    report.purged.push(record.id);
                }
                Err(err) => {
                    metric_inc!(PURGE_FAILURES);
                    log_record_event!(
                        warn,
                        "purge_older_than",
                        "Record left in place",
                        record.id,
                        reason = %err
                    );
                    report.failed.push(PurgeFailure {
                        id: record.id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        log_event!(
            info,
            "purge_older_than",
            "Purge finished",
            threshold = threshold,
            examined = report.examined,
            purged = report.purged.len(),
            failed = report.failed.len()
        );
        Ok(report)
    }

    pub(crate) fn audit(&self) -> Result<IndexAudit, RecordError> {
        let query = self.query();
        let records = query.scan_all()?;
        let entries = self.index.entries(&self.ledger)?;
        let audit = audit_index_consistency(&records, &entries);

        if !audit.is_consistent() {
            log_event!(
                warn,
                "audit_index",
                "Severity index diverges from records",
                missing = audit.missing.len(),
                orphaned = audit.orphaned.len(),
                stale = audit.stale.len()
            );
        }
        Ok(audit)
    }

    /// Record delete plus index entry removal, as one batch.
    fn remove_with_index(&mut self, record: &SecurityRecord) -> Result<(), RecordError> {
        let mut batch = WriteBatch::new();
        batch.delete(StateKey::Record(record.id.clone()));
        self.index.remove(&mut batch, &record.severity, &record.id)?;
        self.ledger.atomic_batch_write(batch)?;
        metric_inc!(INDEX_OPERATIONS, &["remove"]);
        Ok(())
    }

    fn stage_record(&self, batch: &mut WriteBatch, record: &SecurityRecord) -> Result<(), RecordError> {
        let bytes = self.codec.encode(record)?;
        batch.put(StateKey::Record(record.id.clone()), bytes);
        Ok(())
    }

    fn restamp(&self, record: &mut SecurityRecord) -> Result<(), RecordError> {
        let stamp = self.stamp_now()?;
        record.created_at = stamp.text;
        record.created_at_epoch = stamp.epoch;
        Ok(())
    }

    /// Current clock reading in both stored forms. A reading with no
    /// RFC 3339 form is refused rather than rewritten.
    fn stamp_now(&self) -> Result<RecordStamp, RecordError> {
        let now = self.clock.now();
        RecordStamp::at(now).ok_or_else(|| {
            log_event!(
                error,
                "stamp",
                "Clock reading cannot be represented",
                clock = now
            );
            RecordError::validation(format!("clock reading {now} is not a representable instant"))
        })
    }

    /// Emit the creation event. Failure is reported, never raised.
    fn emit_created(&self, record: &SecurityRecord) -> EventDelivery {
        let result = serde_json::to_vec(&RecordCreatedEvent::from(record))
            .map_err(|e| e.to_string())
            .and_then(|payload| {
                self.events
                    .emit(&self.config.created_event, &payload)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(()) => EventDelivery::Delivered,
            Err(reason) => {
                metric_inc!(EVENT_FAILURES);
                log_record_event!(
                    warn,
                    "create",
                    "Creation event not delivered",
                    record.id,
                    event = %self.config.created_event,
                    reason = %reason
                );
                EventDelivery::Failed(reason)
            }
        }
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<RecordId, RecordError> {
    RecordId::parse(raw).map_err(RecordError::from)
}
