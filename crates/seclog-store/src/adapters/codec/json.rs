use crate::domain::entities::SecurityRecord;
use crate::domain::errors::CodecError;
use crate::ports::outbound::RecordCodec;
use chrono::DateTime;

/// JSON record codec matching the ledger's persisted layout.
///
/// Decoding also requires `timestamp` to be valid RFC 3339.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordCodec;

impl RecordCodec for JsonRecordCodec {
    fn encode(&self, record: &SecurityRecord) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(record).map_err(|e| CodecError::new(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<SecurityRecord, CodecError> {
        let record: SecurityRecord =
            serde_json::from_slice(bytes).map_err(|e| CodecError::new(e.to_string()))?;
        DateTime::parse_from_rfc3339(&record.created_at).map_err(|e| {
            CodecError::new(format!(
                "record {} has invalid timestamp {:?}: {}",
                record.id, record.created_at, e
            ))
        })?;
        Ok(record)
    }
}
