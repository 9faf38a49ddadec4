//! Shared fixtures for the integration suites.

use seclog_store::adapters::{
    ContractHost, InMemoryLedger, JsonRecordCodec, ManualClock, RecordingEventSink,
    SequentialIds, StaticIdentity,
};
use seclog_store::{
    NewRecord, Response, SecurityLogDependencies, SecurityLogService, SecurityRecord, StoreConfig,
};
use seclog_telemetry::{init_telemetry, TelemetryConfig};
use std::sync::Once;

static TELEMETRY: Once = Once::new();

/// 2024-03-01T10:00:00Z
pub const BASE_TIME: i64 = 1_709_287_200;

pub const SUBMITTER: &str = "Org1MSP";

pub const SEVERITIES: [&str; 4] = ["low", "medium", "high", "critical"];

pub type TestService = SecurityLogService<
    InMemoryLedger,
    JsonRecordCodec,
    StaticIdentity,
    RecordingEventSink,
    ManualClock,
    SequentialIds,
>;

pub type TestHost = ContractHost<
    InMemoryLedger,
    JsonRecordCodec,
    StaticIdentity,
    RecordingEventSink,
    ManualClock,
    SequentialIds,
>;

/// Handles shared with the adapters inside a [`TestHost`].
pub struct Handles {
    pub clock: ManualClock,
    pub identity: StaticIdentity,
    pub events: RecordingEventSink,
}

/// Install logging and register metrics once per test binary.
///
/// Logs at `warn` unless `SECLOG_LOG_LEVEL` or `RUST_LOG` says otherwise.
pub fn init_test_telemetry() {
    TELEMETRY.call_once(|| {
        let mut config = TelemetryConfig::from_env();
        if std::env::var("SECLOG_LOG_LEVEL").is_err() && std::env::var("RUST_LOG").is_err() {
            config.log_level = "warn".to_string();
        }
        init_telemetry(&config).expect("telemetry should initialize");
    });
}

pub fn make_service(config: StoreConfig) -> (TestService, Handles) {
    init_test_telemetry();
    let handles = Handles {
        clock: ManualClock::at(BASE_TIME),
        identity: StaticIdentity::new(SUBMITTER),
        events: RecordingEventSink::new(),
    };
    let deps = SecurityLogDependencies {
        ledger: InMemoryLedger::new(),
        codec: JsonRecordCodec,
        identity: handles.identity.clone(),
        events: handles.events.clone(),
        clock: handles.clock.clone(),
        ids: SequentialIds::new("log"),
    };
    (SecurityLogService::new(deps, config), handles)
}

pub fn make_host() -> (TestHost, Handles) {
    make_host_with(StoreConfig::default())
}

pub fn make_host_with(config: StoreConfig) -> (TestHost, Handles) {
    let (service, handles) = make_service(config);
    (ContractHost::new(service), handles)
}

pub fn new_record(attack_type: &str, severity: &str) -> NewRecord {
    NewRecord::new(attack_type, "192.168.1.20", severity, "blocked at edge")
}

pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Invoke `CreateLog` and return the stored record.
pub fn create_via_host(host: &mut TestHost, attack_type: &str, severity: &str) -> SecurityRecord {
    let response = host
        .invoke_raw(
            "CreateLog",
            &args(&[attack_type, "192.168.1.20", severity, "blocked at edge"]),
        )
        .expect("create should succeed");
    match response {
        Response::Created(outcome) => outcome.record,
        other => panic!("unexpected response {other:?}"),
    }
}
