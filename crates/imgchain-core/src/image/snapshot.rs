use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::Canvas;

/// Small preview embedded in a `HistoryEntry`. Present on the initial
/// version and on any version whose edit log contains a destructive op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub codec: String,
    /// base64-encoded lossy bytes.
    pub bytes: String,
}

pub const DEFAULT_SNAPSHOT_WIDTH: u32 = 160;
pub const DEFAULT_SNAPSHOT_QUALITY: f32 = 0.8;

/// Produce a thumbnail snapshot: scale to `width` (preserving aspect
/// ratio), encode lossily, and base64 it for embedding in JSON.
pub fn snapshot(canvas: &Canvas, width: u32, quality: f32) -> Result<Snapshot> {
    let width = width.max(1);
    let aspect = canvas.height as f64 / canvas.width.max(1) as f64;
    let height = ((width as f64) * aspect).round().max(1.0) as u32;

    let dynamic = image::DynamicImage::ImageRgba8(
        image::RgbaImage::from_raw(canvas.width, canvas.height, canvas.pixels.clone())
            .ok_or_else(|| crate::error::ImgChainError::internal("bad canvas buffer"))?,
    );
    let thumb = dynamic.resize_exact(width, height, image::imageops::FilterType::Triangle);
    let thumb_canvas = Canvas {
        width: thumb.width(),
        height: thumb.height(),
        pixels: thumb.to_rgba8().into_raw(),
    };
    let bytes = thumb_canvas.encode_lossy(quality, "webp")?;

    Ok(Snapshot {
        width: thumb_canvas.width,
        height: thumb_canvas.height,
        codec: "webp".to_string(),
        bytes: general_purpose::STANDARD.encode(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_preserves_aspect_ratio() {
        let canvas = Canvas::new(320, 160);
        let snap = snapshot(&canvas, 160, 0.8).unwrap();
        assert_eq!(snap.width, 160);
        assert_eq!(snap.height, 80);
        assert_eq!(snap.codec, "webp");
    }
}
