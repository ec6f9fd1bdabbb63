//! RSA-PSS-3072 / SHA-256 signing, mirroring the shape of the teacher's
//! `pq` module: a thin, feature-gated wrapper around the upstream crate's
//! native types, with `keypair`/`sign`/`verify` free functions.

use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rsa::pss::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{RandomizedSigner, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use secrecy::ExposeSecret;
use sha2::Sha256;

use crate::crypto::scheme::KeyPair;
use crate::error::{ImgChainError, Result};

const MODULUS_BITS: usize = 3072;
const SALT_LEN: usize = 32;

pub fn generate() -> Result<KeyPair> {
    let mut rng = OsRng;
    let private_key = RsaPrivateKey::new(&mut rng, MODULUS_BITS)
        .map_err(|e| ImgChainError::crypto(format!("RSA key generation failed: {e}")))?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = secrecy::SecretString::new(
        private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| ImgChainError::crypto(format!("PKCS8 export failed: {e}")))?
            .to_string(),
    );
    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| ImgChainError::crypto(format!("SPKI export failed: {e}")))?;

    Ok(KeyPair {
        scheme: crate::crypto::scheme::SigScheme::RsaPssSha256,
        private_pem,
        public_pem,
    })
}

pub fn sign(canonical_bytes: &[u8], private_pem: &str) -> Result<Vec<u8>> {
    let private_key = RsaPrivateKey::from_pkcs8_pem(private_pem)
        .map_err(|e| ImgChainError::InputError(format!("invalid RSA private key PEM: {e}")))?;
    let signing_key: SigningKey<Sha256> = SigningKey::new_with_salt_len(private_key, SALT_LEN);
    let mut rng = OsRng;
    let signature = signing_key
        .try_sign_with_rng(&mut rng, canonical_bytes)
        .map_err(|e| ImgChainError::crypto(format!("RSA-PSS signing failed: {e}")))?;
    Ok(signature.to_vec())
}

pub fn verify(canonical_bytes: &[u8], signature_bytes: &[u8], public_pem: &str) -> Result<bool> {
    let public_key = RsaPublicKey::from_public_key_pem(public_pem)
        .map_err(|e| ImgChainError::InputError(format!("invalid RSA public key PEM: {e}")))?;
    let verifying_key: VerifyingKey<Sha256> = VerifyingKey::new_with_salt_len(public_key, SALT_LEN);
    let signature = match Signature::try_from(signature_bytes) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };
    Ok(verifying_key.verify(canonical_bytes, &signature).is_ok())
}
