//! Codec Adapters
//!
//! Implementations of the `RecordCodec` trait.

#[cfg(feature = "bincode-codec")]
mod bincode;
mod json;

#[cfg(feature = "bincode-codec")]
pub use self::bincode::BincodeRecordCodec;
pub use self::json::JsonRecordCodec;
