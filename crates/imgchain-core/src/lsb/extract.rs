use crate::error::CorruptionReport;
use crate::image::Canvas;

use super::compress::inflate;
use super::ecc::majority_decode;
use super::embed::non_alpha_indices;
use super::frame::scan_for_frame;

fn bits_to_bytes_msb_first(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .filter(|chunk| chunk.len() == 8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
        .collect()
}

#[derive(Debug, Clone)]
pub struct LsbExtraction {
    /// The canonical JSON bytes of the `ChainedPayload` (sans
    /// `dct_metadata`), if a valid frame was recovered.
    pub json_bytes: Option<Vec<u8>>,
    pub corruption: CorruptionReport,
}

/// Read the whole LSB plane, run 3x majority decode, then scan for the
/// frame. This never panics; a bad image just yields `json_bytes: None`.
pub fn extract(canvas: &Canvas) -> LsbExtraction {
    let bits: Vec<u8> = non_alpha_indices(canvas)
        .map(|idx| canvas.pixels[idx] & 1)
        .collect();
    let replicated_bytes = bits_to_bytes_msb_first(&bits);
    let majority = majority_decode(&replicated_bytes);

    match scan_for_frame(&majority.bytes) {
        Some(compressed) => match inflate(&compressed) {
            Ok(json_bytes) => LsbExtraction {
                json_bytes: Some(json_bytes),
                corruption: CorruptionReport {
                    recovered: true,
                    error_rate: majority.error_rate(),
                },
            },
            Err(_) => LsbExtraction {
                json_bytes: None,
                corruption: CorruptionReport {
                    recovered: false,
                    error_rate: majority.error_rate(),
                },
            },
        },
        None => LsbExtraction {
            json_bytes: None,
            corruption: CorruptionReport {
                recovered: false,
                error_rate: majority.error_rate(),
            },
        },
    }
}
