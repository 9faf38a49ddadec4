//! # Scan Flows
//!
//! Pagination, time-window filters, purge and cursor release across a ledger
//! holding both records and index entries.

#[cfg(test)]
mod tests {
    use crate::fixtures::{args, create_via_host, make_host, make_host_with, BASE_TIME};
    use seclog_store::{PaginatedRecords, Response, SecurityLogApi, StoreConfig};
    use std::collections::BTreeSet;

    fn page(host: &mut crate::fixtures::TestHost, size: u32, bookmark: &str) -> PaginatedRecords {
        match host
            .invoke_raw("GetAllLogsPaginated", &args(&[&size.to_string(), bookmark]))
            .unwrap()
        {
            Response::Page(page) => page,
            other => panic!("unexpected response {other:?}"),
        }
    }

    // =============================================================================
    // PAGINATION
    // =============================================================================

    #[test]
    fn test_pages_concatenate_to_full_scan() {
        let (mut host, handles) = make_host();
        for i in 0..23 {
            let severity = if i % 3 == 0 { "high" } else { "low" };
            create_via_host(&mut host, "bruteforce", severity);
            handles.clock.advance(1);
        }

        let mut seen = Vec::new();
        let mut bookmark = String::new();
        let mut pages = 0;
        loop {
            let current = page(&mut host, 5, &bookmark);
            assert!(current.records.len() <= 5);
            seen.extend(current.records.into_iter().map(|r| r.id.to_string()));
            pages += 1;
            if current.bookmark.is_empty() {
                break;
            }
            bookmark = current.bookmark;
            assert!(pages < 100, "pagination did not terminate");
        }

        let all: Vec<_> = host
            .service()
            .query_all()
            .unwrap()
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(all.len(), 23);
        assert_eq!(seen, all);
        assert_eq!(seen.iter().collect::<BTreeSet<_>>().len(), 23);
        assert_eq!(host.service().ledger().open_cursors(), 0);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let config = StoreConfig {
            max_page_size: 4,
            ..StoreConfig::default()
        };
        let (mut host, _) = make_host_with(config);
        for _ in 0..10 {
            create_via_host(&mut host, "sqli", "medium");
        }

        let first = page(&mut host, 500, "");
        assert!(first.records.len() <= 4);
        assert!(!first.is_last_page());
    }

    #[test]
    fn test_foreign_bookmark_is_rejected() {
        let (mut host, _) = make_host();
        create_via_host(&mut host, "sqli", "medium");

        let err = host
            .invoke_raw("GetAllLogsPaginated", &args(&["5", "not-hex"]))
            .unwrap_err();
        assert_eq!(err.kind(), seclog_store::RecordErrorKind::Storage);
    }

    // =============================================================================
    // TIME WINDOWS AND PURGE
    // =============================================================================

    #[test]
    fn test_time_range_and_purge() {
        let (mut host, handles) = make_host();
        for offset in [-10, -1, 0, 5] {
            handles.clock.set(BASE_TIME + offset);
            create_via_host(&mut host, "portscan", "low");
        }

        let window = match host
            .invoke_raw(
                "GetLogsByTimeRange",
                &args(&[&(BASE_TIME - 1).to_string(), &BASE_TIME.to_string()]),
            )
            .unwrap()
        {
            Response::Records(records) => records,
            other => panic!("unexpected response {other:?}"),
        };
        assert_eq!(window.len(), 2);

        let report = match host
            .invoke_raw("PurgeLogsByTime", &args(&[&BASE_TIME.to_string()]))
            .unwrap()
        {
            Response::Purged(report) => report,
            other => panic!("unexpected response {other:?}"),
        };
        assert_eq!(report.examined, 4);
        assert_eq!(report.purged.len(), 2);
        assert!(report.is_complete());

        let remaining: Vec<_> = host
            .service()
            .query_all()
            .unwrap()
            .into_iter()
            .map(|r| r.created_at_epoch)
            .collect();
        assert_eq!(remaining, vec![BASE_TIME, BASE_TIME + 5]);
        assert_eq!(host.service().count_by_severity().unwrap()["low"], 2);
        assert!(host.service().audit_index().unwrap().is_consistent());
    }

    #[test]
    fn test_counts_by_attack_type() {
        let (mut host, _) = make_host();
        create_via_host(&mut host, "sqli", "low");
        create_via_host(&mut host, "sqli", "high");
        create_via_host(&mut host, "xss", "high");

        let counts = host.service().count_by_attack_type().unwrap();
        assert_eq!(counts["sqli"], 2);
        assert_eq!(counts["xss"], 1);
        assert_eq!(counts.len(), 2);
    }

    // =============================================================================
    // CURSOR RELEASE
    // =============================================================================

    #[test]
    fn test_failed_scans_release_cursors() {
        let (mut host, _) = make_host();
        for _ in 0..6 {
            create_via_host(&mut host, "sqli", "high");
        }

        host.service_mut().ledger_mut().fail_scans_after(2);
        assert!(host.service().query_all().is_err());
        assert!(host.service().query_by_severity("high").is_err());
        assert!(host.service().count_by_severity().is_err());
        assert!(host.service().audit_index().is_err());
        assert_eq!(host.service().ledger().open_cursors(), 0);

        host.service_mut().ledger_mut().clear_faults();
        assert_eq!(host.service().query_all().unwrap().len(), 6);
    }
}
