use std::sync::Arc;

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::compose::strip::CompositeResult;
use crate::foundation::error::{BoothError, BoothResult};

/// Encoded strip ready for download or sharing.
///
/// Clones share the byte buffer; every consumer sees identical bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedStrip {
    bytes: Arc<[u8]>,
    file_name: String,
    digest: [u8; 32],
}

impl EncodedStrip {
    /// PNG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Suggested download file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// SHA-256 of the bytes.
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    /// Lowercase hex SHA-256 of the bytes.
    pub fn digest_hex(&self) -> String {
        self.digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the encoding is empty (never true for a real PNG).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Serialize a composited strip as RGBA8 PNG. Deterministic for a given result.
pub fn encode_png(result: &CompositeResult) -> BoothResult<Vec<u8>> {
    let px = result.pixels();
    px.check()?;
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&px.data, px.width, px.height, image::ExtendedColorType::Rgba8)
        .map_err(|e| BoothError::encode(format!("png encode failed: {e}")))?;
    Ok(out)
}

/// Encode `result` and wrap it with its file name and digest.
#[tracing::instrument(skip(result), fields(width = result.width(), height = result.height()))]
pub fn encode_strip(result: &CompositeResult, file_name: &str) -> BoothResult<EncodedStrip> {
    if file_name.is_empty() {
        return Err(BoothError::validation("strip file name must be non-empty"));
    }
    let bytes = encode_png(result)?;
    let digest: [u8; 32] = Sha256::digest(&bytes).into();
    let strip = EncodedStrip {
        bytes: bytes.into(),
        file_name: file_name.to_string(),
        digest,
    };
    info!(bytes = strip.len(), digest = %strip.digest_hex(), "strip encoded");
    Ok(strip)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
