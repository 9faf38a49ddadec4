//! Ledger Adapters
//!
//! Reference implementations of the `LedgerState` port.

mod memory;

pub use memory::InMemoryLedger;
