use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::{ImgChainError, Result};

pub fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(bytes)
        .map_err(|e| ImgChainError::internal(format!("deflate failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| ImgChainError::internal(format!("deflate failed: {e}")))
}

pub fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| ImgChainError::input(format!("inflate failed: {e}")))?;
    Ok(out)
}
