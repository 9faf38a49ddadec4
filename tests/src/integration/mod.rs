//! # Integration Tests
//!
//! Cross-module flows through the contract host and the service API.

pub mod index_consistency;
pub mod lifecycle;
pub mod scans;
