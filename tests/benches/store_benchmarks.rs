//! # Security Log Store Benchmarks
//!
//! | Operation | Expectation |
//! |-----------|-------------|
//! | Severity query | Touches only the index entries for one severity |
//! | Full scan | Linear in records plus index entries |
//! | Create | One batch: record plus index entry |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seclog_store::{InMemorySecurityLogService, NewRecord, SecurityLogApi, StoreConfig};
use std::time::Duration;

const SEVERITIES: [&str; 4] = ["low", "medium", "high", "critical"];

fn populated_service(records: usize) -> InMemorySecurityLogService {
    let mut rng = StdRng::seed_from_u64(records as u64);
    let mut service =
        InMemorySecurityLogService::new_in_memory("Org1MSP", StoreConfig::default());
    for _ in 0..records {
        let severity = SEVERITIES[rng.gen_range(0..SEVERITIES.len())];
        let ip = format!("10.0.{}.{}", rng.gen::<u8>(), rng.gen::<u8>());
        service
            .create(NewRecord::new("sqli", ip, severity, "benchmark"))
            .expect("create");
    }
    service
}

// ============================================================================
// Indexed lookup vs. full scan
// ============================================================================

fn bench_severity_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("seclog-severity-query");
    group.measurement_time(Duration::from_secs(5));

    for size in [100usize, 1_000, 10_000] {
        let service = populated_service(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("indexed", size), &service, |b, svc| {
            b.iter(|| black_box(svc.query_by_severity("critical").expect("query")))
        });

        group.bench_with_input(BenchmarkId::new("full_scan", size), &service, |b, svc| {
            b.iter(|| {
                let all = svc.query_all().expect("scan");
                black_box(all.into_iter().filter(|r| r.severity == "critical").count())
            })
        });
    }

    group.finish();
}

// ============================================================================
// Writes
// ============================================================================

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("seclog-create");

    group.bench_function("create_with_index", |b| {
        let mut service =
            InMemorySecurityLogService::new_in_memory("Org1MSP", StoreConfig::default());
        b.iter(|| {
            black_box(
                service
                    .create(NewRecord::new("xss", "192.168.0.1", "high", "bench"))
                    .expect("create"),
            )
        })
    });

    group.finish();
}

fn bench_pagination(c: &mut Criterion) {
    let service = populated_service(5_000);

    c.bench_function("seclog-paginate-all/page_100", |b| {
        b.iter(|| {
            let mut bookmark = String::new();
            let mut total = 0;
            loop {
                let page = service.query_paginated(100, &bookmark).expect("page");
                total += page.records.len();
                if page.is_last_page() {
                    break;
                }
                bookmark = page.bookmark;
            }
            black_box(total)
        })
    });
}

criterion_group!(benches, bench_severity_query, bench_create, bench_pagination);
criterion_main!(benches);
