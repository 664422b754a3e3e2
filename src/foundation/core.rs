use crate::foundation::error::{BoothError, BoothResult};

pub use kurbo::{Point, Rect, Size};

/// Straight-alpha RGBA8 pixel buffer.
///
/// Pixels are tightly packed and row-major; `data.len()` is `width * height * 4` for every buffer
/// built through [`RgbaBuffer::new`]. Fields are public, so consumers re-check the length with
/// [`RgbaBuffer::check`] before reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl RgbaBuffer {
    /// Wrap raw RGBA8 bytes, validating the length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> BoothResult<Self> {
        let buf = Self {
            width,
            height,
            data,
        };
        buf.check()?;
        Ok(buf)
    }

    /// A buffer with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: [u8; 4]) -> Self {
        let n = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: px.repeat(n),
        }
    }

    /// Byte length of a `width x height` RGBA8 buffer, rejecting overflow.
    pub fn byte_len(width: u32, height: u32) -> BoothResult<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| BoothError::validation("rgba buffer size overflow"))
    }

    /// Verify the buffer is non-empty and its length matches `width * height * 4`.
    pub fn check(&self) -> BoothResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BoothError::validation(
                "rgba buffer dimensions must be non-zero",
            ));
        }
        if self.data.len() != Self::byte_len(self.width, self.height)? {
            return Err(BoothError::validation(format!(
                "rgba buffer expects {}x{}x4 bytes, got {}",
                self.width,
                self.height,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(idx..idx + 4)?.try_into().ok()
    }

    /// Convert into an `image` crate buffer for resampling and encoding.
    pub fn to_image(&self) -> BoothResult<image::RgbaImage> {
        self.check()?;
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| BoothError::validation("rgba buffer does not fit its dimensions"))
    }

    /// Take ownership of an `image` crate buffer.
    pub fn from_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

/// Rational aspect ratio `num:den` (width to height).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Aspect {
    /// Width term, must be non-zero.
    pub num: u32,
    /// Height term, must be non-zero.
    pub den: u32,
}

impl Aspect {
    /// Classic 4:3 still-camera aspect used for every capture.
    pub const FOUR_THREE: Aspect = Aspect { num: 4, den: 3 };

    /// Create a validated aspect ratio.
    pub fn new(num: u32, den: u32) -> BoothResult<Self> {
        let a = Self { num, den };
        a.validate()?;
        Ok(a)
    }

    /// Reject zero terms.
    pub fn validate(self) -> BoothResult<()> {
        if self.num == 0 || self.den == 0 {
            return Err(BoothError::validation("aspect terms must be > 0"));
        }
        Ok(())
    }

    /// Convert to a floating-point ratio.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl Default for Aspect {
    fn default() -> Self {
        Self::FOUR_THREE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
