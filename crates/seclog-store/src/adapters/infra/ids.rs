use crate::domain::keys::RecordId;
use crate::ports::outbound::IdGenerator;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Random v4 UUID ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> RecordId {
        RecordId::from_uuid(uuid::Uuid::new_v4())
    }
}

/// Deterministic ids `{prefix}-{n:06}` for tests. Zero padding keeps key
/// order equal to creation order.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: Arc<AtomicU64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("log")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> RecordId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        RecordId::from_sequence(&self.prefix, n)
    }
}
