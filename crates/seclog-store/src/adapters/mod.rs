//! # Adapters Module
//!
//! Adapter implementations for the security log store.
//!
//! ## Modules
//!
//! - `ledger`: In-memory ordered ledger with transactions and history
//! - `codec`: JSON and bincode record codecs
//! - `infra`: Clocks, id generators, identity and event sinks
//! - `dispatcher`: Host function dispatch with per-invocation transactions

pub mod codec;
pub mod dispatcher;
pub mod infra;
pub mod ledger;

#[cfg(feature = "bincode-codec")]
pub use codec::BincodeRecordCodec;
pub use codec::JsonRecordCodec;
pub use dispatcher::{ContractHost, Operation, Response};
pub use infra::{
    LedgerEvent, ManualClock, RecordingEventSink, SequentialIds, StaticIdentity,
    SystemTimeSource, UuidGenerator,
};
pub use ledger::InMemoryLedger;
