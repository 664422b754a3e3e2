use std::fmt;
use std::str::FromStr;

use crate::foundation::core::RgbaBuffer;
use crate::foundation::error::{BoothError, BoothResult};
use crate::foundation::math::weighted_channel;

/// Straight RGBA8 pixel.
pub type Rgba8 = [u8; 4];

const LUMA: [u32; 3] = [299, 587, 114];
const SEPIA_R: [u32; 3] = [393, 769, 189];
const SEPIA_G: [u32; 3] = [349, 686, 168];
const SEPIA_B: [u32; 3] = [272, 534, 131];

/// Pixel filter selected for a whole session.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Identity.
    #[default]
    Normal,
    /// BT.601 luma on all three channels.
    #[serde(alias = "blackwhite")]
    Grayscale,
    /// Classic sepia tone matrix, clamped at 255.
    Sepia,
}

impl Filter {
    /// All selectable filters, in picker order.
    pub const ALL: [Filter; 3] = [Filter::Normal, Filter::Grayscale, Filter::Sepia];

    /// Stable identifier used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Filter::Normal => "normal",
            Filter::Grayscale => "grayscale",
            Filter::Sepia => "sepia",
        }
    }

    /// Transform one pixel. Alpha is never touched.
    pub fn apply_px(self, px: Rgba8) -> Rgba8 {
        match self {
            Filter::Normal => px,
            Filter::Grayscale => grayscale_px(px),
            Filter::Sepia => sepia_px(px),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = BoothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "none" => Ok(Filter::Normal),
            "grayscale" | "greyscale" | "blackwhite" => Ok(Filter::Grayscale),
            "sepia" => Ok(Filter::Sepia),
            other => Err(BoothError::validation(format!("unknown filter '{other}'"))),
        }
    }
}

/// Grayscale one pixel; alpha is kept.
pub fn grayscale_px(px: Rgba8) -> Rgba8 {
    let g = weighted_channel([px[0], px[1], px[2]], LUMA);
    [g, g, g, px[3]]
}

/// Sepia-tone one pixel; alpha is kept.
pub fn sepia_px(px: Rgba8) -> Rgba8 {
    let rgb = [px[0], px[1], px[2]];
    [
        weighted_channel(rgb, SEPIA_R),
        weighted_channel(rgb, SEPIA_G),
        weighted_channel(rgb, SEPIA_B),
        px[3],
    ]
}

/// Apply `filter` to tightly packed RGBA8 bytes in place.
pub fn apply_filter_in_place(data: &mut [u8], filter: Filter) -> BoothResult<()> {
    if !data.len().is_multiple_of(4) {
        return Err(BoothError::validation(
            "apply_filter_in_place expects rgba8 bytes",
        ));
    }
    if filter == Filter::Normal {
        return Ok(());
    }
    for d in data.chunks_exact_mut(4) {
        let out = filter.apply_px([d[0], d[1], d[2], d[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Pure form: returns a filtered copy with the same dimensions.
pub fn apply_filter(buf: &RgbaBuffer, filter: Filter) -> BoothResult<RgbaBuffer> {
    buf.check()?;
    let mut out = buf.clone();
    apply_filter_in_place(&mut out.data, filter)?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
