//! # Record Lifecycle Flows
//!
//! Drives one record through create, update, attach and delete using the
//! host function names, then checks the history, events and JSON payloads
//! the host would return.

#[cfg(test)]
mod tests {
    use crate::fixtures::{args, create_via_host, make_host, make_host_with, BASE_TIME, SUBMITTER};
    use seclog_store::{
        LedgerState, Operation, RecordCreatedEvent, RecordError, RecordErrorKind, Response,
        SecurityLogApi, StoreConfig,
    };

    // =============================================================================
    // FULL LIFECYCLE
    // =============================================================================

    #[test]
    fn test_full_lifecycle_through_host() {
        let (mut host, handles) = make_host();

        // Create
        let record = create_via_host(&mut host, "xss", "medium");
        let id = record.id.to_string();
        assert_eq!(record.submitter, SUBMITTER);

        // Update moves the record to another severity
        handles.clock.advance(60);
        let updated = match host
            .invoke_raw(
                "UpdateLog",
                &args(&[&id, "xss", "192.168.1.20", "critical", "payload executed"]),
            )
            .unwrap()
        {
            Response::Record(record) => record,
            other => panic!("unexpected response {other:?}"),
        };
        assert_eq!(updated.severity, "critical");
        assert_eq!(updated.created_at_epoch, BASE_TIME + 60);
        assert_eq!(updated.submitter, SUBMITTER);

        // Attach an evidence pointer
        handles.clock.advance(60);
        host.invoke_raw("AddAttachmentToLog", &args(&[&id, "QmEvidence"]))
            .unwrap();

        let service = host.service();
        assert!(service.query_by_severity("medium").unwrap().items.is_empty());
        let critical = service.query_by_severity("critical").unwrap();
        assert_eq!(critical.items.len(), 1);
        assert_eq!(critical.items[0].attachment_reference, "QmEvidence");
        assert_eq!(service.query_with_attachment().unwrap().len(), 1);

        // Delete
        assert_eq!(
            host.invoke_raw("DeleteLog", &args(&[&id])).unwrap(),
            Response::Done
        );
        let err = host.invoke_raw("ReadLog", &args(&[&id])).unwrap_err();
        assert_eq!(err.kind(), RecordErrorKind::NotFound);

        // History keeps every version plus the tombstone, oldest first
        let history = host.service().query_history(&id).unwrap();
        assert!(history.is_complete());
        let tx_ids: Vec<_> = history.items.iter().map(|h| h.tx_id.as_str()).collect();
        assert_eq!(tx_ids, ["tx-000001", "tx-000002", "tx-000003", "tx-000004"]);
        assert!(history.items[3].is_tombstone());
        assert_eq!(history.items[0].timestamp, "2024-03-01T10:00:00Z");
        assert_eq!(
            history.items[2]
                .record
                .as_ref()
                .map(|r| r.attachment_reference.as_str()),
            Some("QmEvidence")
        );

        assert!(host.service().audit_index().unwrap().is_consistent());
        assert!(host.service().ledger().is_empty());
    }

    #[test]
    fn test_create_event_payload() {
        let (mut host, handles) = make_host();
        host.invoke_raw(
            "CreateLogWithAttachment",
            &args(&["ddos", "203.0.113.9", "high", "syn flood", "QmPcap"]),
        )
        .unwrap();

        let events = handles.events.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "SecurityLogCreated");

        let payload: RecordCreatedEvent = serde_json::from_slice(&events[0].payload).unwrap();
        assert_eq!(payload.severity, "high");
        assert_eq!(payload.attachment_reference, "QmPcap");
        assert_eq!(payload.id.as_str(), "log-000001");
    }

    #[test]
    fn test_event_failure_does_not_undo_create() {
        let (mut host, handles) = make_host();
        handles.events.set_failing(true);

        let outcome = match host
            .invoke(Operation::Create(crate::fixtures::new_record("sqli", "low")))
            .unwrap()
        {
            Response::Created(outcome) => outcome,
            other => panic!("unexpected response {other:?}"),
        };

        assert!(!outcome.event.is_delivered());
        assert!(host.service().read(outcome.record.id.as_str()).is_ok());
    }

    #[test]
    fn test_mutations_reach_registered_metrics() {
        let (mut host, _) = make_host();
        let record = create_via_host(&mut host, "sqli", "low");
        host.invoke_raw("DeleteLog", &args(&[record.id.as_str()]))
            .unwrap();

        let text = seclog_telemetry::encode_metrics().unwrap();
        assert!(text.contains("seclog_records_mutations_total"));
        assert!(text.contains("seclog_index_operations_total"));
    }

    #[test]
    fn test_read_payload_uses_ledger_field_names() {
        let (mut host, _) = make_host();
        let record = create_via_host(&mut host, "sqli", "high");

        let payload = host
            .invoke_raw("ReadLog", &args(&[record.id.as_str()]))
            .unwrap()
            .to_payload()
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();

        assert_eq!(json["id"], "log-000001");
        assert_eq!(json["timestamp"], "2024-03-01T10:00:00Z");
        assert_eq!(json["unixTime"], BASE_TIME);
        assert_eq!(json["attackType"], "sqli");
        assert_eq!(json["sourceIp"], "192.168.1.20");
        assert_eq!(json["attachmentHash"], "");
    }

    // =============================================================================
    // ERROR PATHS
    // =============================================================================

    #[test]
    fn test_bad_invocations_are_validation_errors() {
        let (mut host, _) = make_host();

        let cases = [
            ("Unknown", args(&[])),
            ("ReadLog", args(&[])),
            ("ReadLog", args(&[""])),
            ("GetLogsBySeverity", args(&[""])),
            ("GetLogsByTimeRange", args(&["yesterday", "1"])),
            ("GetAllLogsPaginated", args(&["0", ""])),
            ("CreateLog", args(&["sqli", "", "high", "x"])),
        ];
        for (function, arguments) in cases {
            let err = host.invoke_raw(function, &arguments).unwrap_err();
            assert!(
                matches!(err, RecordError::Validation(_)),
                "{function} gave {err:?}"
            );
        }
        assert!(host.service().ledger().is_empty());
    }

    #[test]
    fn test_missing_identity_rejects_create() {
        let (mut host, handles) = make_host();
        handles.identity.revoke();

        let err = host
            .invoke_raw("CreateLog", &args(&["sqli", "10.1.1.1", "low", ""]))
            .unwrap_err();
        assert_eq!(err.kind(), RecordErrorKind::Identity);
        assert!(handles.events.is_empty());
    }

    #[test]
    fn test_submitter_is_fixed_at_creation() {
        let (mut host, handles) = make_host();
        let record = create_via_host(&mut host, "sqli", "low");

        handles.identity.switch_to("Org2MSP");
        host.invoke_raw(
            "UpdateLog",
            &args(&[record.id.as_str(), "sqli", "10.0.0.9", "high", "rescored"]),
        )
        .unwrap();
        create_via_host(&mut host, "rce", "critical");

        let service = host.service();
        assert_eq!(service.query_by_submitter(SUBMITTER).unwrap().len(), 1);
        assert_eq!(service.query_by_submitter("Org2MSP").unwrap().len(), 1);
    }

    #[test]
    fn test_custom_index_namespace() {
        let config = StoreConfig {
            index_namespace: "sev~rid".to_string(),
            ..StoreConfig::default()
        };
        let (mut host, _) = make_host_with(config);
        create_via_host(&mut host, "sqli", "high");

        let service = host.service();
        let entries: Vec<_> = service
            .ledger()
            .scan_prefix("sev~rid", &["high"])
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(service.query_by_severity("high").unwrap().items.len(), 1);
    }
}
