pub const MAGIC: &[u8; 7] = b"ICLSB01";
pub const END_MARKER: &[u8; 7] = b"ICEND01";

/// `[magic 7B][length u32 BE][checksum u32 BE][compressed payload][end-marker 7B]`
pub fn build_frame(compressed_payload: &[u8]) -> Vec<u8> {
    let length = compressed_payload.len() as u32;
    let checksum = checksum_of(compressed_payload);

    let mut out = Vec::with_capacity(7 + 4 + 4 + compressed_payload.len() + 7);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&checksum.to_be_bytes());
    out.extend_from_slice(compressed_payload);
    out.extend_from_slice(END_MARKER);
    out
}

pub fn checksum_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32))
}

/// Attempt to parse a frame starting at exactly `start`. Returns the
/// compressed payload bytes on success.
fn parse_at(buf: &[u8], start: usize) -> Option<Vec<u8>> {
    let header_end = start.checked_add(7 + 4 + 4)?;
    if buf.len() < header_end || &buf[start..start + 7] != MAGIC {
        return None;
    }
    let length = u32::from_be_bytes([
        buf[start + 7],
        buf[start + 8],
        buf[start + 9],
        buf[start + 10],
    ]) as usize;
    let expected_checksum = u32::from_be_bytes([
        buf[start + 11],
        buf[start + 12],
        buf[start + 13],
        buf[start + 14],
    ]);

    let payload_start = header_end;
    let payload_end = payload_start.checked_add(length)?;
    let end_marker_end = payload_end.checked_add(7)?;
    if buf.len() < end_marker_end {
        return None;
    }
    if &buf[payload_end..end_marker_end] != END_MARKER {
        return None;
    }
    let payload = &buf[payload_start..payload_end];
    if checksum_of(payload) != expected_checksum {
        return None;
    }
    Some(payload.to_vec())
}

/// Scan for the first byte offset at which a complete, checksum-valid
/// frame parses. False starts (a stray magic-looking byte sequence that
/// doesn't actually frame a valid record) are tolerated: the scanner just
/// advances to the next byte and retries.
pub fn scan_for_frame(buf: &[u8]) -> Option<Vec<u8>> {
    if buf.len() < 7 {
        return None;
    }
    for start in 0..=(buf.len() - 7) {
        if &buf[start..start + 7] != MAGIC {
            continue;
        }
        if let Some(payload) = parse_at(buf, start) {
            return Some(payload);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let payload = b"some compressed bytes".to_vec();
        let framed = build_frame(&payload);
        let found = scan_for_frame(&framed).expect("frame should parse");
        assert_eq!(found, payload);
    }

    #[test]
    fn tolerates_false_starts_before_real_frame() {
        let payload = b"hello".to_vec();
        let framed = build_frame(&payload);
        let mut buf = MAGIC.to_vec(); // a bare magic with no valid body: a false start
        buf.extend_from_slice(&framed);
        let found = scan_for_frame(&buf).expect("should skip false start and find real frame");
        assert_eq!(found, payload);
    }

    #[test]
    fn missing_end_marker_fails() {
        let payload = b"hello".to_vec();
        let mut framed = build_frame(&payload);
        let len = framed.len();
        framed[len - 1] ^= 0xff;
        assert!(scan_for_frame(&framed).is_none());
    }
}
