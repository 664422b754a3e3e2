use std::path::Path;

use anyhow::Context;

use crate::foundation::core::RgbaBuffer;
use crate::foundation::error::BoothResult;

/// Decode encoded image bytes (PNG, JPEG, ...) into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> BoothResult<RgbaBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(RgbaBuffer::from_image(dyn_img.to_rgba8()))
}

/// Read and decode an image file.
pub fn read_image(path: &Path) -> BoothResult<RgbaBuffer> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
