//! On-disk encoding of plan records and keys

use planner_core::{PlanKey, PlanRecord, StoreError};

/// Current record format version (first byte of every stored value)
pub const RECORD_VERSION: u8 = 1;

/// Serialize a record: version byte followed by bincode
pub fn encode_record(record: &PlanRecord) -> Result<Vec<u8>, StoreError> {
    let body = bincode::serialize(record).map_err(|e| StoreError::Codec(e.to_string()))?;
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(RECORD_VERSION);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Deserialize a record written by `encode_record`
pub fn decode_record(bytes: &[u8]) -> Result<PlanRecord, StoreError> {
    match bytes.split_first() {
        Some((&RECORD_VERSION, body)) => {
            bincode::deserialize(body).map_err(|e| StoreError::Codec(e.to_string()))
        }
        Some((&version, _)) => Err(StoreError::Codec(format!(
            "unsupported record version {}",
            version
        ))),
        None => Err(StoreError::Codec("empty record".into())),
    }
}

/// Tree key for a composite key
///
/// Format: owner_len(4, BE) + owner + day index(1) + week start ("YYYY-MM-DD").
/// Keys of one owner and week sort by day.
pub fn key_bytes(key: &PlanKey) -> Vec<u8> {
    let owner = key.owner.as_str().as_bytes();
    let week = key.week_start.format("%Y-%m-%d").to_string();
    let mut out = Vec::with_capacity(4 + owner.len() + 1 + week.len());
    out.extend_from_slice(&(owner.len() as u32).to_be_bytes());
    out.extend_from_slice(owner);
    out.push(key.day.index() as u8);
    out.extend_from_slice(week.as_bytes());
    out
}
