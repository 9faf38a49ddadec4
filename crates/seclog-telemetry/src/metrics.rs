//! Prometheus metrics for the security log store.
//!
//! All metrics follow the naming convention: `seclog_<area>_<metric>_total`.
//! Counters are process-global; they count even when [`register_metrics`]
//! was never called, registration only makes them visible to
//! [`encode_metrics`].

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // RECORD METRICS
    // =========================================================================

    /// Record mutations by kind
    pub static ref RECORD_MUTATIONS: CounterVec = CounterVec::new(
        Opts::new("seclog_records_mutations_total", "Record mutations by kind"),
        &["kind"]  // kind: created/updated/attached/deleted/purged
    ).expect("metric creation failed");

    /// Records that failed to purge
    pub static ref PURGE_FAILURES: Counter = Counter::new(
        "seclog_records_purge_failures_total",
        "Records left in place because their purge batch failed"
    ).expect("metric creation failed");

    // =========================================================================
    // INDEX METRICS
    // =========================================================================

    /// Index entries staged for write or removal
    pub static ref INDEX_OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("seclog_index_operations_total", "Severity index entry operations"),
        &["op"]  // op: install/remove
    ).expect("metric creation failed");

    // =========================================================================
    // QUERY METRICS
    // =========================================================================

    /// Entries skipped during broad scans
    pub static ref SCAN_SKIPPED: CounterVec = CounterVec::new(
        Opts::new("seclog_scan_skipped_total", "Entries skipped during best-effort scans"),
        &["query"]  // query: severity/history
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT METRICS
    // =========================================================================

    /// Event emission failures
    pub static ref EVENT_FAILURES: Counter = Counter::new(
        "seclog_event_emit_failures_total",
        "Ledger events that could not be emitted"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(RECORD_MUTATIONS.clone()),
        Box::new(PURGE_FAILURES.clone()),
        Box::new(INDEX_OPERATIONS.clone()),
        Box::new(SCAN_SKIPPED.clone()),
        Box::new(EVENT_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all registered metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
