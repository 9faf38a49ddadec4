use crate::adapters::{
    InMemoryLedger, JsonRecordCodec, ManualClock, RecordingEventSink, SequentialIds,
    StaticIdentity,
};
use crate::domain::entities::{NewRecord, SecurityRecord};
use crate::domain::keys::RecordId;
use crate::domain::value_objects::{RecordStamp, StoreConfig, Timestamp};
use crate::service::{SecurityLogDependencies, SecurityLogService};

/// 2024-03-01T10:00:00Z
pub const BASE_TIME: Timestamp = 1_709_287_200;

pub const TEST_SUBMITTER: &str = "Org1MSP";

pub type TestService = SecurityLogService<
    InMemoryLedger,
    JsonRecordCodec,
    StaticIdentity,
    RecordingEventSink,
    ManualClock,
    SequentialIds,
>;

/// Handles shared with a [`TestService`]'s adapters.
pub struct TestHandles {
    pub clock: ManualClock,
    pub identity: StaticIdentity,
    pub events: RecordingEventSink,
}

pub fn make_test_service() -> (TestService, TestHandles) {
    make_test_service_with(StoreConfig::default())
}

pub fn make_test_service_with(config: StoreConfig) -> (TestService, TestHandles) {
    let handles = TestHandles {
        clock: ManualClock::at(BASE_TIME),
        identity: StaticIdentity::new(TEST_SUBMITTER),
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

pub fn make_new_record(severity: &str) -> NewRecord {
    NewRecord::new("sqli", "10.0.0.1", severity, "union select")
}

pub fn make_test_record(id: &str, severity: &str, epoch: Timestamp) -> SecurityRecord {
    let stamp = RecordStamp::at(epoch).unwrap();
    SecurityRecord {
        id: RecordId::parse(id).unwrap(),
        created_at: stamp.text,
        created_at_epoch: stamp.epoch,
        attack_type: "sqli".to_string(),
        source_ip: "10.0.0.1".to_string(),
        severity: severity.to_string(),
        description: "union select".to_string(),
        submitter: TEST_SUBMITTER.to_string(),
        attachment_reference: String::new(),
    }
}
