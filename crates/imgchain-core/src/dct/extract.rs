use crate::image::Canvas;

use super::blocks::{block_origins, read_block};
use super::embed::{read_bit, BITS_PER_BLOCK, POSITIONS, QUANT_STEP};
use super::metadata::{parse_frame, CriticalMetadata};
use super::transform::forward_dct;

/// Bounds how many blocks we bother decoding: spec says a framed record is
/// "typically well under 2KB"; decoding more than a generous multiple of
/// that is pointless work, not a correctness requirement.
const MAX_METADATA_BYTES: usize = 8192;

fn bits_to_bytes_msb_first(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .filter(|chunk| chunk.len() == 8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
        .collect()
}

/// Try to recover a `CriticalMetadata` record from the canvas's
/// mid-frequency DCT coefficients. Never panics or errors — any failure at
/// any step (bad magic, bad framing checksum, bad JSON, bad internal
/// checksum) simply yields `None`.
pub fn extract(canvas: &Canvas) -> Option<CriticalMetadata> {
    let luma = canvas.luminance();
    let width = canvas.width;
    let origins = block_origins(canvas.width, canvas.height);

    let max_bits = MAX_METADATA_BYTES * 8;
    let mut bits = Vec::with_capacity(max_bits.min(origins.len() * BITS_PER_BLOCK));

    for origin in &origins {
        if bits.len() >= max_bits {
            break;
        }
        let block = read_block(&luma, width, *origin);
        let coeffs = forward_dct(&block);
        for &(u, v) in POSITIONS.iter() {
            bits.push(read_bit(coeffs[u][v], QUANT_STEP));
        }
    }

    let bytes = bits_to_bytes_msb_first(&bits);
    parse_frame(&bytes)
}
