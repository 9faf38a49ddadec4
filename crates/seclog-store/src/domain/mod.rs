//! # Domain Layer
//!
//! Pure domain logic for the security log store.
//!
//! ## Modules
//!
//! - `entities` - Security records and operation result values
//! - `keys` - Typed ledger keys and the composite key encoding
//! - `index` - Severity secondary index maintenance
//! - `invariants` - Record/index consistency checks
//! - `value_objects` - Timestamps and configuration
//! - `errors` - Domain and port error types

pub mod entities;
pub mod errors;
pub mod index;
pub mod invariants;
pub mod keys;
pub mod value_objects;
