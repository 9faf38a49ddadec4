use crate::domain::errors::EventError;
use crate::ports::outbound::EventSink;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An event accepted by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

/// Event sink that keeps every accepted event in memory.
///
/// Clones share the same log and failure switch.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent emission while `failing` is set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, name: &str, payload: &[u8]) -> Result<(), EventError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EventError::Rejected(format!("sink refused event {name}")));
        }
        self.events.lock().push(LedgerEvent {
            name: name.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
