//! # Domain Entities
//!
//! The security record and the result values returned by store operations.

use super::keys::RecordId;
use super::value_objects::Timestamp;
use serde::{Deserialize, Serialize};

/// A persisted security log record.
///
/// Serialized with the ledger's JSON field names so existing state decodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRecord {
    /// Generated at creation, never reused.
    pub id: RecordId,
    /// RFC 3339, seconds precision, UTC with `Z` suffix.
    #[serde(rename = "timestamp")]
    pub created_at: String,
    /// Same instant as `created_at`, in epoch seconds.
    #[serde(rename = "unixTime")]
    pub created_at_epoch: Timestamp,
    pub attack_type: String,
    #[serde(rename = "sourceIp")]
    pub source_ip: String,
    /// The only indexed field.
    pub severity: String,
    pub description: String,
    /// Identity captured at creation. Never changes.
    pub submitter: String,
    /// External content pointer; empty means none.
    #[serde(rename = "attachmentHash", default)]
    pub attachment_reference: String,
}

impl SecurityRecord {
    pub fn has_attachment(&self) -> bool {
        !self.attachment_reference.is_empty()
    }
}

/// Caller-supplied fields for a new record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRecord {
    pub attack_type: String,
    pub source_ip: String,
    pub severity: String,
    pub description: String,
}

impl NewRecord {
    pub fn new(
        attack_type: impl Into<String>,
        source_ip: impl Into<String>,
        severity: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            attack_type: attack_type.into(),
            source_ip: source_ip.into(),
            severity: severity.into(),
            description: description.into(),
        }
    }

    /// Required fields present and severity encodable as an index part.
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(&self.attack_type, &self.source_ip, &self.severity)
    }
}

/// Replacement fields for an existing record.
///
/// Submitter and attachment reference are not part of an update.
pub type RecordUpdate = NewRecord;

pub(crate) fn validate_fields(
    attack_type: &str,
    source_ip: &str,
    severity: &str,
) -> Result<(), String> {
    if attack_type.is_empty() {
        return Err("attack type is required".to_string());
    }
    if source_ip.is_empty() {
        return Err("source IP is required".to_string());
    }
    validate_severity(severity)
}

pub(crate) fn validate_severity(severity: &str) -> Result<(), String> {
    if severity.is_empty() {
        return Err("severity is required".to_string());
    }
    if severity.contains('\0') {
        return Err("severity must not contain the NUL character".to_string());
    }
    Ok(())
}

/// Payload of the creation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCreatedEvent {
    pub id: RecordId,
    pub severity: String,
    #[serde(rename = "attachmentHash", default)]
    pub attachment_reference: String,
}

impl From<&SecurityRecord> for RecordCreatedEvent {
    fn from(record: &SecurityRecord) -> Self {
        Self {
            id: record.id.clone(),
            severity: record.severity.clone(),
            attachment_reference: record.attachment_reference.clone(),
        }
    }
}

/// Outcome of the creation event emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EventDelivery {
    Delivered,
    /// The record was written but the host did not accept the event.
    Failed(String),
}

impl EventDelivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOutcome {
    pub record: SecurityRecord,
    pub event: EventDelivery,
}

/// One page of records plus the ledger's continuation token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PaginatedRecords {
    pub records: Vec<SecurityRecord>,
    /// Opaque; empty when there are no further pages.
    pub bookmark: String,
}

impl PaginatedRecords {
    pub fn is_last_page(&self) -> bool {
        self.bookmark.is_empty()
    }
}

/// A historical version of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub tx_id: String,
    /// RFC 3339 commit time.
    pub timestamp: String,
    /// `None` marks a deletion.
    pub record: Option<SecurityRecord>,
}

impl HistoryEntry {
    pub fn is_tombstone(&self) -> bool {
        self.record.is_none()
    }
}

/// An entry a broad scan could not turn into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Record id or history transaction id.
    pub key: String,
    pub reason: String,
}

/// Scan result with the entries that had to be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedEntry>,
}

impl<T> ScanReport<T> {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl<T> Default for ScanReport<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeFailure {
    pub id: RecordId,
    pub reason: String,
}

/// Result of a time-based purge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PurgeReport {
    /// Records scanned.
    pub examined: usize,
    pub purged: Vec<RecordId>,
    pub failed: Vec<PurgeFailure>,
}

impl PurgeReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One decomposed severity index entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct IndexEntry {
    pub severity: String,
    pub id: RecordId,
}

/// Record/index consistency report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IndexAudit {
    /// Live records examined.
    pub records: usize,
    /// Index entries examined.
    pub entries: usize,
    /// Records with no entry under their current severity.
    pub missing: Vec<IndexEntry>,
    /// Entries whose record does not exist.
    pub orphaned: Vec<IndexEntry>,
    /// Entries for an existing record under a severity it no longer has.
    pub stale: Vec<IndexEntry>,
}

impl IndexAudit {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.orphaned.is_empty() && self.stale.is_empty()
    }
}
