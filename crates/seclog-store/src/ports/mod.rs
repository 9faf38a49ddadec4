//! # Ports Layer
//!
//! Defines the port traits for the security log store.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (operation surface exposed to the host)
//! - `outbound.rs` - Driven ports (ledger, codec, identity, events, clock, ids)

pub mod inbound;
pub mod outbound;
