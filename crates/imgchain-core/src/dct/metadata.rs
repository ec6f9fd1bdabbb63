use serde::{Deserialize, Serialize};

use crate::crypto::canonical;

pub const MAGIC: &[u8; 7] = b"ICMETA1";

/// What the DCT layer carries: enough to tell an extractor "this chain has
/// N versions, ending in this hash" even when the LSB layer is destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalMetadata {
    pub chain_id: String,
    pub version_count: u64,
    pub last_version_hash: String,
    pub checksum: String,
}

/// Metadata-level checksum: lower 32 bits of a rolling polynomial hash
/// (`31*prev + ord(c)`) over `"{chain_id}|{version_count}|{last_version_hash}"`,
/// hex-padded to 8 characters. Distinct from the framing checksum below.
pub fn metadata_checksum(chain_id: &str, version_count: u64, last_version_hash: &str) -> String {
    let s = format!("{chain_id}|{version_count}|{last_version_hash}");
    let mut acc: u32 = 0;
    for c in s.chars() {
        acc = acc.wrapping_mul(31).wrapping_add(c as u32);
    }
    format!("{acc:08x}")
}

impl CriticalMetadata {
    pub fn new(chain_id: String, version_count: u64, last_version_hash: String) -> Self {
        let checksum = metadata_checksum(&chain_id, version_count, &last_version_hash);
        CriticalMetadata {
            chain_id,
            version_count,
            last_version_hash,
            checksum,
        }
    }

    pub fn checksum_is_valid(&self) -> bool {
        self.checksum == metadata_checksum(&self.chain_id, self.version_count, &self.last_version_hash)
    }
}

/// Frame a `CriticalMetadata` record:
/// `[magic 7B]["ICMETA1"][length u16 BE][json payload][payload-byte-sum u32 BE]`
pub fn frame(metadata: &CriticalMetadata) -> Vec<u8> {
    let json = canonical::canonicalize_signable(metadata);
    let len = json.len() as u16;
    let sum: u32 = json.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32));

    let mut out = Vec::with_capacity(7 + 2 + json.len() + 4);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&json);
    out.extend_from_slice(&sum.to_be_bytes());
    out
}

/// Decode never throws: any malformed step returns `None`.
pub fn parse_frame(bytes: &[u8]) -> Option<CriticalMetadata> {
    if bytes.len() < 7 + 2 {
        return None;
    }
    if &bytes[0..7] != MAGIC {
        return None;
    }
    let len = u16::from_be_bytes([bytes[7], bytes[8]]) as usize;
    let json_start = 9;
    let json_end = json_start.checked_add(len)?;
    let sum_end = json_end.checked_add(4)?;
    if bytes.len() < sum_end {
        return None;
    }
    let json_bytes = &bytes[json_start..json_end];
    let expected_sum = u32::from_be_bytes([
        bytes[json_end],
        bytes[json_end + 1],
        bytes[json_end + 2],
        bytes[json_end + 3],
    ]);
    let actual_sum: u32 = json_bytes.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32));
    if actual_sum != expected_sum {
        return None;
    }
    let metadata: CriticalMetadata = serde_json::from_slice(json_bytes).ok()?;
    if !metadata.checksum_is_valid() {
        return None;
    }
    Some(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trips() {
        let m = CriticalMetadata::new("abc123".into(), 2, "def456".into());
        let framed = frame(&m);
        let parsed = parse_frame(&framed).expect("should parse");
        assert_eq!(parsed, m);
    }

    #[test]
    fn bad_magic_returns_none() {
        let mut framed = frame(&CriticalMetadata::new("a".into(), 1, "b".into()));
        framed[0] ^= 0xff;
        assert!(parse_frame(&framed).is_none());
    }

    #[test]
    fn tampered_payload_fails_checksum() {
        let mut framed = frame(&CriticalMetadata::new("a".into(), 1, "b".into()));
        let last = framed.len() - 5;
        framed[last] ^= 0x01;
        assert!(parse_frame(&framed).is_none());
    }

    #[test]
    fn truncated_frame_returns_none() {
        let framed = frame(&CriticalMetadata::new("a".into(), 1, "b".into()));
        assert!(parse_frame(&framed[..5]).is_none());
    }
}
