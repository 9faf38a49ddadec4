//! # Severity Index Consistency
//!
//! Seeded random sequences of mutations, checked after every step against a
//! plain in-test model of which record has which severity.
//!
//! Faults are injected into index writes along the way; a rejected mutation
//! must leave both the records and the index exactly as they were.

#[cfg(test)]
mod tests {
    use crate::fixtures::{make_host, new_record, TestHost, BASE_TIME, SEVERITIES};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use seclog_store::{
        NewRecord, Operation, RecordErrorKind, RecordId, Response, SecurityLogApi, SeverityIndex,
        StateKey, TimeSource,
    };
    use std::collections::BTreeMap;

    /// id -> (severity, epoch)
    type Model = BTreeMap<String, (String, i64)>;

    fn pick_severity(rng: &mut StdRng) -> &'static str {
        SEVERITIES[rng.gen_range(0..SEVERITIES.len())]
    }

    fn pick_id(rng: &mut StdRng, model: &Model) -> Option<String> {
        if model.is_empty() {
            return None;
        }
        let n = rng.gen_range(0..model.len());
        model.keys().nth(n).cloned()
    }

    fn assert_matches_model(host: &TestHost, model: &Model) {
        let service = host.service();

        let audit = service.audit_index().unwrap();
        assert!(audit.is_consistent(), "index diverged: {audit:?}");
        assert_eq!(audit.records, model.len());

        let mut expected_counts = BTreeMap::new();
        for (severity, _) in model.values() {
            *expected_counts.entry(severity.clone()).or_insert(0u64) += 1;
        }
        assert_eq!(service.count_by_severity().unwrap(), expected_counts);

        for severity in SEVERITIES {
            let report = service.query_by_severity(severity).unwrap();
            assert!(report.is_complete());
            let mut found: Vec<_> = report.items.iter().map(|r| r.id.to_string()).collect();
            found.sort();
            let expected: Vec<_> = model
                .iter()
                .filter(|(_, (s, _))| s == severity)
                .map(|(id, _)| id.clone())
                .collect();
            assert_eq!(found, expected, "severity {severity}");
        }

        assert_eq!(service.ledger().open_cursors(), 0);
    }

    fn run_sequence(seed: u64, steps: usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let (mut host, handles) = make_host();
        let mut model = Model::new();

        for _ in 0..steps {
            handles.clock.advance(rng.gen_range(1..20));
            let now = handles.clock.now();

            match rng.gen_range(0..10) {
                0..=3 => {
                    let severity = pick_severity(&mut rng);
                    let outcome = match host
                        .invoke(Operation::Create(new_record("sqli", severity)))
                        .unwrap()
                    {
                        Response::Created(outcome) => outcome,
                        other => panic!("unexpected response {other:?}"),
                    };
                    model.insert(outcome.record.id.to_string(), (severity.to_string(), now));
                }
                4 | 5 => {
                    let Some(id) = pick_id(&mut rng, &model) else { continue };
                    let severity = pick_severity(&mut rng);
                    host.invoke(Operation::Update {
                        id: id.clone(),
                        changes: NewRecord::new("sqli", "192.168.1.20", severity, "rescored"),
                    })
                    .unwrap();
                    model.insert(id, (severity.to_string(), now));
                }
                6 => {
                    let Some(id) = pick_id(&mut rng, &model) else { continue };
                    host.invoke(Operation::AttachReference {
                        id: id.clone(),
                        reference: format!("Qm{}", rng.gen::<u32>()),
                    })
                    .unwrap();
                    if let Some(entry) = model.get_mut(&id) {
                        entry.1 = now;
                    }
                }
                7 => {
                    let Some(id) = pick_id(&mut rng, &model) else { continue };
                    host.invoke(Operation::Delete { id: id.clone() }).unwrap();
                    model.remove(&id);
                }
                8 => {
                    let threshold = now - rng.gen_range(0..200);
                    host.invoke(Operation::PurgeOlderThan { threshold }).unwrap();
                    model.retain(|_, (_, epoch)| *epoch >= threshold);
                }
                _ => {
                    // Update whose new index entry is rejected
                    let Some(id) = pick_id(&mut rng, &model) else { continue };
                    let severity = pick_severity(&mut rng);
                    if model[&id].0 == severity {
                        continue;
                    }
                    let record_id = RecordId::parse(&id).unwrap();
                    let key = StateKey::Composite(
                        SeverityIndex::default().key_for(severity, &record_id).unwrap(),
                    );
                    host.service_mut().ledger_mut().fail_writes_to(&key);
                    let err = host
                        .invoke(Operation::Update {
                            id,
                            changes: NewRecord::new("sqli", "192.168.1.20", severity, "rescored"),
                        })
                        .unwrap_err();
                    assert_eq!(err.kind(), RecordErrorKind::Storage);
                    host.service_mut().ledger_mut().clear_faults();
                }
            }

            assert_matches_model(&host, &model);
        }
    }

    #[test]
    fn test_random_sequences_keep_index_consistent() {
        for seed in [7, 42, 1337, 2024] {
            run_sequence(seed, 150);
        }
    }

    #[test]
    fn test_rejected_delete_keeps_record_and_entry() {
        let (mut host, _) = make_host();
        let record = match host
            .invoke(Operation::Create(new_record("rce", "critical")))
            .unwrap()
        {
            Response::Created(outcome) => outcome.record,
            other => panic!("unexpected response {other:?}"),
        };

        let key = StateKey::Composite(
            SeverityIndex::default()
                .key_for("critical", &record.id)
                .unwrap(),
        );
        host.service_mut().ledger_mut().fail_writes_to(&key);
        let err = host
            .invoke(Operation::Delete {
                id: record.id.to_string(),
            })
            .unwrap_err();
        assert_eq!(err.kind(), RecordErrorKind::Storage);
        host.service_mut().ledger_mut().clear_faults();

        let service = host.service();
        assert_eq!(service.read(record.id.as_str()).unwrap(), record);
        assert!(service.audit_index().unwrap().is_consistent());
    }

    #[test]
    fn test_purge_reports_records_it_could_not_remove() {
        let (mut host, handles) = make_host();
        let mut ids = Vec::new();
        for severity in ["low", "high", "low"] {
            let outcome = host
                .service_mut()
                .create(new_record("scan", severity))
                .unwrap();
            ids.push(outcome.record.id);
            handles.clock.advance(10);
        }

        let blocked = StateKey::Composite(SeverityIndex::default().key_for("high", &ids[1]).unwrap());
        host.service_mut().ledger_mut().fail_writes_to(&blocked);

        let report = host.service_mut().purge_older_than(BASE_TIME + 100).unwrap();
        assert_eq!(report.examined, 3);
        assert_eq!(report.purged, vec![ids[0].clone(), ids[2].clone()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, ids[1]);
        assert!(!report.is_complete());

        host.service_mut().ledger_mut().clear_faults();
        let audit = host.service().audit_index().unwrap();
        assert!(audit.is_consistent());
        assert_eq!(audit.records, 1);
    }
}
