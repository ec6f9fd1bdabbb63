pub mod canonical;
pub mod ecdsa_p256;
pub mod hash;
pub mod rsa_pss;
pub mod scheme;

pub use canonical::{canonicalize, canonicalize_signable, canonicalize_str};
pub use hash::{sha256_hex, sha256_raw};
pub use scheme::{KeyPair, SigScheme};

use base64::{engine::general_purpose, Engine as _};

use crate::error::{ImgChainError, Result};

/// The crypto-provider seam named in spec.md §9: three operations,
/// implemented once per scheme. Dispatch on `SigScheme` rather than trait
/// objects, since the two implementations use unrelated key types with no
/// shared upstream trait.
pub fn generate_keys(scheme: SigScheme) -> Result<KeyPair> {
    match scheme {
        SigScheme::RsaPssSha256 => rsa_pss::generate(),
        SigScheme::EcdsaP256Sha256 => ecdsa_p256::generate(),
    }
}

/// Sign canonical bytes, returning a base64-encoded signature.
pub fn sign(canonical_bytes: &[u8], private_pem: &str, scheme: SigScheme) -> Result<String> {
    let raw = match scheme {
        SigScheme::RsaPssSha256 => rsa_pss::sign(canonical_bytes, private_pem)?,
        SigScheme::EcdsaP256Sha256 => ecdsa_p256::sign(canonical_bytes, private_pem)?,
    };
    Ok(general_purpose::STANDARD.encode(raw))
}

/// Verify a base64-encoded signature. Returns `Ok(false)` for a
/// structurally valid-but-wrong signature; only returns `Err` for
/// malformed inputs (bad PEM, bad base64) — a normal "no" is a boolean,
/// not an error, per spec.md §7.
pub fn verify(
    canonical_bytes: &[u8],
    base64_signature: &str,
    public_pem: &str,
    scheme: SigScheme,
) -> Result<bool> {
    let raw = general_purpose::STANDARD
        .decode(base64_signature)
        .map_err(|e| ImgChainError::input(format!("invalid base64 signature: {e}")))?;
    match scheme {
        SigScheme::RsaPssSha256 => rsa_pss::verify(canonical_bytes, &raw, public_pem),
        SigScheme::EcdsaP256Sha256 => ecdsa_p256::verify(canonical_bytes, &raw, public_pem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn round_trips_both_schemes() {
        for scheme in [SigScheme::RsaPssSha256, SigScheme::EcdsaP256Sha256] {
            let kp = generate_keys(scheme).unwrap();
            let msg = b"canonical-bytes-under-test";
            let sig = sign(msg, kp.private_pem.expose_secret(), scheme).unwrap();
            assert!(verify(msg, &sig, &kp.public_pem, scheme).unwrap());
        }
    }
}
