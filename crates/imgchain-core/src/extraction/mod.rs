use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::ChainedPayload;
use crate::dct::{self, CriticalMetadata};
use crate::error::Result;
use crate::image::Canvas;
use crate::lsb;

/// The four orientations the pipeline will try, in the fixed order spec.md
/// §4.6 names. 90°-multiples only: anything else would destroy the LSB
/// plane.
pub const ROTATIONS: [u32; 4] = [0, 90, 180, 270];

/// `extract_with_details` result: everything recoverable from one
/// already-oriented canvas, no rotation search.
#[derive(Debug, Clone)]
pub struct ExtractionDetails {
    pub payload: Option<ChainedPayload>,
    pub recovered: bool,
    pub corruption_detected: bool,
    pub error_rate: Option<f64>,
    pub critical_metadata: Option<CriticalMetadata>,
    pub dct_extracted: bool,
}

/// `extract_with_rotations` result: the orientation search outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationOutcome {
    pub payload: Option<ChainedPayload>,
    pub rotation: Option<u32>,
    pub critical_metadata: Option<CriticalMetadata>,
    pub error: Option<String>,
}

/// Try DCT-decode then LSB-decode-with-ECC on a single, already-oriented
/// canvas. DCT read strictly precedes LSB read (spec.md §5 ordering rule),
/// though the two layers are independent enough that the order only
/// matters for log sequencing here.
pub fn extract_with_details(canvas: &Canvas) -> ExtractionDetails {
    let critical_metadata = dct::extract(canvas);
    let dct_extracted = critical_metadata.is_some();

    let lsb_result = lsb::extract(canvas);
    let payload: Option<ChainedPayload> = lsb_result
        .json_bytes
        .as_deref()
        .and_then(|bytes| serde_json::from_slice(bytes).ok())
        .map(|mut p: ChainedPayload| {
            p.dct_metadata = critical_metadata.clone();
            p
        });

    ExtractionDetails {
        recovered: payload.is_some(),
        corruption_detected: lsb_result.corruption.error_rate > 0.0,
        error_rate: if lsb_result.corruption.recovered || lsb_result.corruption.error_rate > 0.0 {
            Some(lsb_result.corruption.error_rate)
        } else {
            None
        },
        payload,
        critical_metadata,
        dct_extracted,
    }
}

/// The full bounded orientation search (spec.md §4.6 steps 1-5): decode
/// once, try all four rotations in order, return at the first rotation
/// that yields a full payload, else the earliest metadata-only hit, else
/// nothing.
pub fn extract_with_rotations(image_bytes: &[u8]) -> Result<RotationOutcome> {
    let base = Canvas::decode(image_bytes)?;

    let mut earliest_metadata: Option<(u32, CriticalMetadata)> = None;

    for &degrees in ROTATIONS.iter() {
        let rotated = base.rotate(degrees)?;
        let details = extract_with_details(&rotated);
        debug!(degrees, recovered = details.recovered, dct = details.dct_extracted, "tried rotation");

        if details.recovered {
            return Ok(RotationOutcome {
                payload: details.payload,
                rotation: Some(degrees),
                critical_metadata: details.critical_metadata,
                error: None,
            });
        }
        if earliest_metadata.is_none() {
            if let Some(metadata) = details.critical_metadata {
                earliest_metadata = Some((degrees, metadata));
            }
        }
    }

    match earliest_metadata {
        Some((degrees, metadata)) => Ok(RotationOutcome {
            payload: None,
            rotation: Some(degrees),
            critical_metadata: Some(metadata),
            error: None,
        }),
        None => Ok(RotationOutcome {
            payload: None,
            rotation: None,
            critical_metadata: None,
            error: Some("no payload or metadata recoverable at any rotation".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{append_commit, Session};
    use crate::crypto::{sha256_hex, SigScheme};

    fn gradient(w: u32, h: u32) -> Canvas {
        let mut c = Canvas::new(w, h);
        for y in 0..h {
            for x in 0..w {
                c.set_rgb(x, y, [(x % 256) as u8, (y % 256) as u8, 90]);
                let i = c.pixel_index(x, y);
                c.pixels[i + 3] = 255;
            }
        }
        c
    }

    #[tokio::test]
    async fn recovers_full_payload_at_zero_rotation() {
        let mut session = Session::new();
        session.configure("Studio", SigScheme::EcdsaP256Sha256).unwrap();
        let canvas = gradient(256, 256);
        let chain_id = sha256_hex(&canvas.canonical_pixel_encoding().unwrap());
        session.initialize(chain_id, None).unwrap();
        let outcome = append_commit(&mut session, &canvas, vec![]).await.unwrap();

        let details = extract_with_details(&outcome.canvas);
        assert!(details.recovered);
        assert!(details.dct_extracted);
        assert_eq!(details.payload.unwrap().chain_id, outcome.payload.chain_id);
    }

    #[tokio::test]
    async fn rotated_180_image_still_recovers_via_search() {
        let mut session = Session::new();
        session.configure("Studio", SigScheme::EcdsaP256Sha256).unwrap();
        let canvas = gradient(256, 256);
        let chain_id = sha256_hex(&canvas.canonical_pixel_encoding().unwrap());
        session.initialize(chain_id, None).unwrap();
        let outcome = append_commit(&mut session, &canvas, vec![]).await.unwrap();

        let rotated = outcome.canvas.rotate(180).unwrap();
        let bytes = rotated.encode_lossless().unwrap();

        let result = extract_with_rotations(&bytes).unwrap();
        assert_eq!(result.rotation, Some(180));
        assert!(result.payload.is_some());
    }

    #[test]
    fn empty_image_yields_nothing() {
        let canvas = Canvas::new(32, 32);
        let bytes = canvas.encode_lossless().unwrap();
        let result = extract_with_rotations(&bytes).unwrap();
        assert!(result.payload.is_none());
        assert!(result.rotation.is_none());
        assert!(result.critical_metadata.is_none());
    }
}
