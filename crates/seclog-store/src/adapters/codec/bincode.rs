use crate::domain::entities::SecurityRecord;
use crate::domain::errors::CodecError;
use crate::ports::outbound::RecordCodec;

/// Compact binary record codec using bincode.
///
/// Not readable by clients expecting the JSON ledger layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeRecordCodec;

impl RecordCodec for BincodeRecordCodec {
    fn encode(&self, record: &SecurityRecord) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(record).map_err(|e| CodecError::new(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<SecurityRecord, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::new(e.to_string()))
    }
}
