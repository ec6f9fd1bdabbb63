use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{ImageEncoder, RgbaImage};

use crate::error::{ImgChainError, Result};

use super::Canvas;

pub fn decode(bytes: &[u8]) -> Result<Canvas> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ImgChainError::input(format!("unreadable image: {e}")))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(Canvas {
        width,
        height,
        pixels: img.into_raw(),
    })
}

fn to_rgba_image(canvas: &Canvas) -> Result<RgbaImage> {
    RgbaImage::from_raw(canvas.width, canvas.height, canvas.pixels.clone())
        .ok_or_else(|| ImgChainError::internal("canvas pixel buffer does not match its dimensions"))
}

/// The stable, bitmap-exact encoding used for hashing: fixed filter, fixed
/// compression strategy, so the same pixels always yield the same bytes
/// regardless of which implementation produced them.
pub fn encode_lossless(canvas: &Canvas) -> Result<Vec<u8>> {
    let img = to_rgba_image(canvas)?;
    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(
        &mut out,
        CompressionType::Best,
        PngFilterType::NoFilter,
    );
    encoder
        .write_image(img.as_raw(), canvas.width, canvas.height, image::ExtendedColorType::Rgba8)
        .map_err(|e| ImgChainError::internal(format!("PNG encode failed: {e}")))?;
    Ok(out)
}

/// Lossy preview encoding for snapshots. The corpus's `image` crate ships a
/// lossless-only WebP encoder, so the "lossy, quality ~0.8" budget is spent
/// entirely by the caller's downsampling to the requested thumbnail
/// dimensions (`image::snapshot::snapshot`) before this is ever called;
/// `quality` has no further effect here (documented in DESIGN.md). This
/// always encodes at `canvas`'s own dimensions, so a caller's recorded
/// `width`/`height` stay accurate for the bytes it gets back.
pub fn encode_lossy(canvas: &Canvas, quality: f32, codec_tag: &str) -> Result<Vec<u8>> {
    if codec_tag != "webp" {
        return Err(ImgChainError::UnsupportedScheme(format!(
            "unsupported snapshot codec: {codec_tag}"
        )));
    }
    let _quality = quality.clamp(0.05, 1.0);
    let img = to_rgba_image(canvas)?;

    let mut out = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut out);
    encoder
        .encode(img.as_raw(), canvas.width, canvas.height, image::ExtendedColorType::Rgba8)
        .map_err(|e| ImgChainError::internal(format!("WebP encode failed: {e}")))?;
    Ok(out)
}
