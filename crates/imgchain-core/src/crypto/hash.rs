use sha2::{Digest, Sha256};

/// SHA-256, hex-lowercase, used for every identifier in the chain
/// (`chain_id`, `sha256`, `parent_hash`).
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

pub fn sha256_raw(bytes: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        // SHA-256("") per FIPS 180-4 test vectors.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn deterministic() {
        let a = sha256_hex(b"imgchain");
        let b = sha256_hex(b"imgchain");
        assert_eq!(a, b);
    }
}
