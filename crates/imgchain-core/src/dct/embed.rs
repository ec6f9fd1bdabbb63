use crate::image::{luminance::apply_luma_delta, Canvas};

use super::blocks::{block_origins, read_block};
use super::metadata::{frame, CriticalMetadata};
use super::transform::{forward_dct, inverse_dct, BLOCK_SIZE};

/// Mid-frequency (u,v) positions carrying one bit each, in this fixed
/// order — five bits per block.
pub const POSITIONS: [(usize, usize); 5] = [(1, 2), (2, 1), (2, 2), (3, 1), (1, 3)];
pub const BITS_PER_BLOCK: usize = POSITIONS.len();
pub const QUANT_STEP: f64 = 4.0;

pub fn capacity_bits(width: u32, height: u32) -> usize {
    block_origins(width, height).len() * BITS_PER_BLOCK
}

/// Quantization-index-modulation embed: select the bucket (of width `Q`)
/// whose index parity matches `bit`, nudging one bucket away from zero if
/// the natural bucket has the wrong parity, then snap to that bucket's
/// center for margin against later lossy recompression.
pub fn quantize_for_bit(coeff: f64, bit: u8, q_step: f64) -> f64 {
    let mut q = (coeff / q_step).floor() as i64;
    let parity = q.rem_euclid(2) as u8;
    if parity != bit {
        if coeff >= 0.0 {
            q += 1;
        } else {
            q -= 1;
        }
    }
    (q as f64) * q_step + q_step / 2.0
}

pub fn read_bit(coeff: f64, q_step: f64) -> u8 {
    let q = (coeff / q_step).floor() as i64;
    (q.rem_euclid(2)) as u8
}

fn bytes_to_bits_msb_first(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1);
        }
    }
    bits
}

/// Embed a critical-metadata record into the mid-frequency DCT
/// coefficients of the canvas's luminance. Returns `None` (never an error)
/// when the canvas is too small — the caller decides whether that's fatal
/// (it isn't, per spec.md B2: commit still succeeds, DCT is just skipped).
pub fn try_embed(canvas: &Canvas, metadata: &CriticalMetadata) -> Option<Canvas> {
    let framed = frame(metadata);
    let bits = bytes_to_bits_msb_first(&framed);
    let origins = block_origins(canvas.width, canvas.height);
    if bits.len() > origins.len() * BITS_PER_BLOCK {
        return None;
    }

    let mut luma = canvas.luminance();
    let width = canvas.width;
    let mut bit_idx = 0usize;

    'blocks: for origin in &origins {
        if bit_idx >= bits.len() {
            break;
        }
        let block = read_block(&luma, width, *origin);
        let mut coeffs = forward_dct(&block);
        let mut touched = false;
        for &(u, v) in POSITIONS.iter() {
            if bit_idx >= bits.len() {
                break 'blocks;
            }
            let bit = bits[bit_idx];
            coeffs[u][v] = quantize_for_bit(coeffs[u][v], bit, QUANT_STEP);
            touched = true;
            bit_idx += 1;
        }
        if !touched {
            continue;
        }
        let new_block = inverse_dct(&coeffs);
        write_block_luma(&mut luma, width, *origin, &block, &new_block);
    }

    let mut out = canvas.clone();
    apply_luma_block_deltas(&mut out, canvas, &luma);
    Some(out)
}

fn write_block_luma(
    luma: &mut [f64],
    width: u32,
    origin: (u32, u32),
    _old_block: &[[f64; BLOCK_SIZE]; BLOCK_SIZE],
    new_block: &[[f64; BLOCK_SIZE]; BLOCK_SIZE],
) {
    let (ox, oy) = origin;
    for (dx, row) in new_block.iter().enumerate() {
        for (dy, &v) in row.iter().enumerate() {
            let idx = ((oy + dy as u32) as usize) * (width as usize) + (ox + dx as u32) as usize;
            luma[idx] = v.clamp(0.0, 255.0);
        }
    }
}

/// Re-project the updated luminance plane onto RGB: for every pixel whose
/// luminance changed, shift R,G,B by the weighted delta and clamp. Alpha
/// is left untouched.
fn apply_luma_block_deltas(out: &mut Canvas, original: &Canvas, new_luma: &[f64]) {
    let old_luma = original.luminance();
    for y in 0..original.height {
        for x in 0..original.width {
            let idx = (y as usize) * (original.width as usize) + (x as usize);
            let delta = new_luma[idx] - old_luma[idx];
            if delta.abs() < f64::EPSILON {
                continue;
            }
            let rgba = original.get_rgba(x, y);
            let new_rgb = apply_luma_delta([rgba[0], rgba[1], rgba[2]], delta);
            out.set_rgb(x, y, new_rgb);
        }
    }
}
