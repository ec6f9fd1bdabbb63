//! ECDSA over P-256 / SHA-256, raw IEEE-P1363 `r‖s` signatures (64 bytes).
//! Resolves spec.md Q3: this repo always emits/expects raw `r‖s`, never DER.

use p256::ecdsa::{signature::Signer, signature::Verifier, Signature, SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand_core::OsRng;
use secrecy::ExposeSecret;

use crate::crypto::scheme::KeyPair;
use crate::error::{ImgChainError, Result};

pub fn generate() -> Result<KeyPair> {
    let signing_key = SigningKey::random(&mut OsRng);
    let verifying_key = VerifyingKey::from(&signing_key);

    let private_pem = secrecy::SecretString::new(
        signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| ImgChainError::crypto(format!("PKCS8 export failed: {e}")))?
            .to_string(),
    );
    let public_pem = verifying_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| ImgChainError::crypto(format!("SPKI export failed: {e}")))?;

    Ok(KeyPair {
        scheme: crate::crypto::scheme::SigScheme::EcdsaP256Sha256,
        private_pem,
        public_pem,
    })
}

pub fn sign(canonical_bytes: &[u8], private_pem: &str) -> Result<Vec<u8>> {
    let signing_key = SigningKey::from_pkcs8_pem(private_pem)
        .map_err(|e| ImgChainError::InputError(format!("invalid ECDSA private key PEM: {e}")))?;
    let signature: Signature = signing_key.sign(canonical_bytes);
    Ok(signature.to_bytes().to_vec())
}

pub fn verify(canonical_bytes: &[u8], signature_bytes: &[u8], public_pem: &str) -> Result<bool> {
    let verifying_key = VerifyingKey::from_public_key_pem(public_pem)
        .map_err(|e| ImgChainError::InputError(format!("invalid ECDSA public key PEM: {e}")))?;
    let signature = match Signature::from_slice(signature_bytes) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };
    Ok(verifying_key.verify(canonical_bytes, &signature).is_ok())
}
