//! # Domain Invariants
//!
//! Record/index consistency.
//!
//! For every live record exactly one severity index entry exists, under the
//! record's current severity. No entry exists for a deleted record or for a
//! severity the record no longer has.

use super::entities::{IndexAudit, IndexEntry, SecurityRecord};
use super::keys::RecordId;
use std::collections::{BTreeMap, BTreeSet};

/// Brute-force comparison of primary records against index entries.
///
/// An entry whose record exists but with a different severity is `stale`;
/// one whose record is gone is `orphaned`. A record with no entry under its
/// current severity is `missing`.
pub fn audit_index_consistency(records: &[SecurityRecord], entries: &[IndexEntry]) -> IndexAudit {
    let live: BTreeMap<&RecordId, &str> = records
        .iter()
        .map(|r| (&r.id, r.severity.as_str()))
        .collect();
    let indexed: BTreeSet<(&str, &RecordId)> = entries
        .iter()
        .map(|e| (e.severity.as_str(), &e.id))
        .collect();

    let mut audit = IndexAudit {
        records: records.len(),
        entries: entries.len(),
        ..IndexAudit::default()
    };

    for record in records {
        if !indexed.contains(&(record.severity.as_str(), &record.id)) {
            audit.missing.push(IndexEntry {
                severity: record.severity.clone(),
                id: record.id.clone(),
            });
        }
    }

    for entry in entries {
        match live.get(&entry.id) {
            None => audit.orphaned.push(entry.clone()),
            Some(severity) if *severity != entry.severity => audit.stale.push(entry.clone()),
            Some(_) => {}
        }
    }

    audit
}

/// Invariant: every live record has exactly one entry, at its current severity.
pub fn invariant_index_consistent(records: &[SecurityRecord], entries: &[IndexEntry]) -> bool {
    audit_index_consistency(records, entries).is_consistent()
}
