//! Infrastructure Adapters
//!
//! Clock, id, identity and event adapters.

mod clock;
mod events;
mod identity;
mod ids;

pub use clock::{ManualClock, SystemTimeSource};
pub use events::{LedgerEvent, RecordingEventSink};
pub use identity::StaticIdentity;
pub use ids::{SequentialIds, UuidGenerator};
