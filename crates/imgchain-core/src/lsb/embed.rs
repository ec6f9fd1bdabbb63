use crate::error::{ImgChainError, Result};
use crate::image::Canvas;

use super::compress::deflate;
use super::ecc::triple_encode;
use super::frame::build_frame;

fn bytes_to_bits_msb_first(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1);
        }
    }
    bits
}

/// Indices (into `canvas.pixels`) of every non-alpha byte, in raster
/// order: R, G, B for each pixel, skipping every 4th (alpha) byte.
pub fn non_alpha_indices(canvas: &Canvas) -> impl Iterator<Item = usize> + '_ {
    (0..canvas.pixels.len()).filter(|i| i % 4 != 3)
}

/// Embed the canonical JSON bytes of a `ChainedPayload` (already excluding
/// `dct_metadata`, per spec) into the LSB plane. Fails hard with
/// `CapacityExceeded` — unlike the DCT layer, there is no "skip and flag"
/// option for the full payload.
pub fn embed(canvas: &Canvas, canonical_payload_json: &[u8]) -> Result<Canvas> {
    let compressed = deflate(canonical_payload_json)?;
    let framed = build_frame(&compressed);
    let replicated = triple_encode(&framed);
    let bits = bytes_to_bits_msb_first(&replicated);

    let available = canvas.non_alpha_bytes();
    if bits.len() > available {
        return Err(ImgChainError::CapacityExceeded {
            layer: "lsb",
            needed: bits.len(),
            available,
        });
    }

    let mut out = canvas.clone();
    for (bit, idx) in bits.iter().zip(non_alpha_indices(canvas)) {
        let byte = out.pixels[idx];
        out.pixels[idx] = (byte & !1) | bit;
    }
    Ok(out)
}

/// Bits required to embed `canonical_payload_json`, accounting for
/// DEFLATE compression, framing, and 3x replication — used by callers
/// that want to check capacity before paying for a full embed attempt.
pub fn required_bits(canonical_payload_json: &[u8]) -> Result<usize> {
    let compressed = deflate(canonical_payload_json)?;
    let framed = build_frame(&compressed);
    Ok(framed.len() * 3 * 8)
}
