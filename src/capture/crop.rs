use crate::foundation::core::{Aspect, RgbaBuffer};
use crate::foundation::error::{BoothError, BoothResult};

/// Source-space rectangle selected by the center crop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    /// Left column in the source frame.
    pub x: u32,
    /// Top row in the source frame.
    pub y: u32,
    /// Width of the crop, equal to the output width.
    pub width: u32,
    /// Height of the crop, equal to the output height.
    pub height: u32,
}

/// Largest centered rectangle of `aspect` that fits inside a `src_w x src_h` frame.
///
/// Wider sources lose columns on both sides, taller sources lose rows top and bottom. Both sides are
/// whole multiples of the reduced aspect terms, so the output ratio is exact for every source size;
/// odd leftovers are split with the extra pixel on the right or bottom.
pub fn center_crop_rect(src_w: u32, src_h: u32, aspect: Aspect) -> BoothResult<CropRect> {
    aspect.validate()?;
    let g = gcd(aspect.num, aspect.den);
    let (num, den) = (aspect.num / g, aspect.den / g);

    let k = (src_w / num).min(src_h / den);
    if k == 0 {
        return Err(BoothError::validation(format!(
            "source frame {src_w}x{src_h} is too small for a {}:{} capture",
            aspect.num, aspect.den
        )));
    }
    // k <= src_w / num, so neither product can overflow
    let (width, height) = (num * k, den * k);
    Ok(CropRect {
        x: (src_w - width) / 2,
        y: (src_h - height) / 2,
        width,
        height,
    })
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Center-crop `src` to `aspect`, optionally flipping it horizontally.
///
/// With `mirror` set, output column `x` samples source column `crop.x + (crop.width - 1 - x)`, so the
/// capture reads the way the subject saw themselves in the self-view.
pub fn crop_frame(src: &RgbaBuffer, aspect: Aspect, mirror: bool) -> BoothResult<RgbaBuffer> {
    src.check()?;
    let crop = center_crop_rect(src.width, src.height, aspect)?;

    let src_stride = src.width as usize * 4;
    let row_len = crop.width as usize * 4;
    let mut data = Vec::with_capacity(RgbaBuffer::byte_len(crop.width, crop.height)?);

    for row in 0..crop.height as usize {
        let start = (crop.y as usize + row) * src_stride + crop.x as usize * 4;
        let src_row = &src.data[start..start + row_len];
        if mirror {
            for px in src_row.chunks_exact(4).rev() {
                data.extend_from_slice(px);
            }
        } else {
            data.extend_from_slice(src_row);
        }
    }

    RgbaBuffer::new(crop.width, crop.height, data)
}

/// Horizontal flip of a whole buffer.
pub fn mirror_horizontal(buf: &RgbaBuffer) -> BoothResult<RgbaBuffer> {
    buf.check()?;
    let mut data = Vec::with_capacity(buf.data.len());
    for row in buf.data.chunks_exact(buf.width as usize * 4) {
        for px in row.chunks_exact(4).rev() {
            data.extend_from_slice(px);
        }
    }
    RgbaBuffer::new(buf.width, buf.height, data)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/crop.rs"]
mod tests;
