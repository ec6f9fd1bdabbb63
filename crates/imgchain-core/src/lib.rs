//! Chain engine and dual-domain steganographic codec for provenance-bearing
//! images: canonical JSON, RSA-PSS-3072 / ECDSA-P256 signing, a DCT
//! frequency-domain layer for critical metadata, an LSB spatial-domain
//! layer (DEFLATE + 3x ECC) for the full payload, and the chain/session/
//! extraction logic that ties them together.

pub mod chain;
pub mod crypto;
pub mod dct;
pub mod error;
pub mod extraction;
pub mod image;
pub mod lsb;

pub use error::{ImgChainError, Result};

use crypto::{canonicalize as canonicalize_value, KeyPair, SigScheme};
use image::{Canvas, Snapshot};

/// `generate_keys(scheme)` from spec.md §6.
pub fn generate_keys(scheme: SigScheme) -> Result<KeyPair> {
    crypto::generate_keys(scheme)
}

/// `sign(canonical_bytes, private_key, scheme)` from spec.md §6.
pub fn sign(canonical_bytes: &[u8], private_pem: &str, scheme: SigScheme) -> Result<String> {
    crypto::sign(canonical_bytes, private_pem, scheme)
}

/// `verify(canonical_bytes, base64_signature, public_key, scheme)` from
/// spec.md §6.
pub fn verify(canonical_bytes: &[u8], base64_signature: &str, public_pem: &str, scheme: SigScheme) -> Result<bool> {
    crypto::verify(canonical_bytes, base64_signature, public_pem, scheme)
}

/// `sha256(bytes)` from spec.md §6: lowercase hex digest.
pub fn sha256(bytes: &[u8]) -> String {
    crypto::sha256_hex(bytes)
}

/// `canonicalize(record)` from spec.md §6: sort-recursive JSON, no
/// whitespace. Callers that need the signature field excluded should pass
/// a value with that field already stripped, or use
/// [`crypto::canonicalize_signable`] directly on a `HistoryEntry`.
pub fn canonicalize(value: &serde_json::Value) -> Vec<u8> {
    canonicalize_value(value)
}

/// `render(image_source)` from spec.md §6: decode an encoded image (PNG or
/// WebP bytes) into the uniform RGBA grid the rest of the engine operates
/// on.
pub fn render(image_bytes: &[u8]) -> Result<Canvas> {
    Canvas::decode(image_bytes)
}

/// `snapshot(canvas, width=160, quality=0.8)` from spec.md §6.
pub fn snapshot(canvas: &Canvas, width: u32, quality: f32) -> Result<Snapshot> {
    image::snapshot::snapshot(canvas, width, quality)
}

/// `embed(canvas, payload) -> canvas` from spec.md §6: canonicalize the
/// payload (sans `dct_metadata`, which only ever rides the DCT layer) and
/// write it through the LSB codec. This is the bare LSB-only primitive;
/// [`chain::append_commit`] is what drives both layers together for a
/// real commit.
pub fn embed(canvas: &Canvas, payload: &chain::ChainedPayload) -> Result<Canvas> {
    let sans_dct = payload.without_dct_metadata();
    let json = canonicalize_value(&serde_json::to_value(&sans_dct)?);
    lsb::embed(canvas, &json)
}

/// `extract_with_details(canvas)` from spec.md §6.
pub fn extract_with_details(canvas: &Canvas) -> extraction::ExtractionDetails {
    extraction::extract_with_details(canvas)
}

/// `extract_with_rotations(image)` from spec.md §6.
pub fn extract_with_rotations(image_bytes: &[u8]) -> Result<extraction::RotationOutcome> {
    extraction::extract_with_rotations(image_bytes)
}

/// `append_commit(session, canvas, edit_log) -> session'` from spec.md §6.
pub async fn append_commit(
    session: &mut chain::Session,
    canvas: &Canvas,
    edit_log: Vec<chain::EditOp>,
) -> Result<chain::CommitOutcome> {
    chain::append_commit(session, canvas, edit_log).await
}

/// `verify_chain(payload, public_key_pem, {is_uploaded}) -> per-entry
/// VerificationResult` from spec.md §6. `live_canvas_hash`/`is_uploaded`
/// feed the optional rendered-hash cross-check from §4.5; pass `None` for
/// `live_canvas_hash` when there is nothing to compare against.
pub fn verify_chain(
    payload: &chain::ChainedPayload,
    public_pems: &[(String, String)],
    live_canvas_hash: Option<&str>,
    is_uploaded: bool,
) -> (Vec<error::VerificationResult>, Option<bool>) {
    let per_entry = chain::verify_chain(payload, public_pems);
    let live_hash_matches = live_canvas_hash.and_then(|h| chain::verify_live_hash(payload, h, is_uploaded));
    (per_entry, live_hash_matches)
}
