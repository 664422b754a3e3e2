use std::sync::Arc;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::compose::layout::{StripLayout, contain_fit};
use crate::foundation::core::{Rect, RgbaBuffer};
use crate::foundation::error::{BoothError, BoothResult};
use crate::foundation::math::round_px;

/// A cropped, filtered capture. Immutable once produced; clones share the pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedFrame {
    pixels: Arc<RgbaBuffer>,
}

impl CapturedFrame {
    /// Wrap finished capture pixels.
    pub fn new(pixels: RgbaBuffer) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Borrow the pixels.
    pub fn pixels(&self) -> &RgbaBuffer {
        &self.pixels
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height
    }
}

impl From<RgbaBuffer> for CapturedFrame {
    fn from(pixels: RgbaBuffer) -> Self {
        Self::new(pixels)
    }
}

/// Decoded background plus the slot rectangles derived from its size.
#[derive(Clone, Debug)]
pub struct Template {
    background: Arc<RgbaBuffer>,
    slots: Vec<Rect>,
}

impl Template {
    /// Derive `count` slots for `background` using `layout`.
    pub fn new(background: RgbaBuffer, layout: &StripLayout, count: u32) -> BoothResult<Self> {
        background.check()?;
        let slots = layout.slots(background.width, background.height, count)?;
        Ok(Self {
            background: Arc::new(background),
            slots,
        })
    }

    /// Background pixels, drawn full-size under every frame.
    pub fn background(&self) -> &RgbaBuffer {
        &self.background
    }

    /// Slots in capture order (first capture goes to the topmost slot).
    pub fn slots(&self) -> &[Rect] {
        &self.slots
    }

    /// Background width.
    pub fn width(&self) -> u32 {
        self.background.width
    }

    /// Background height.
    pub fn height(&self) -> u32 {
        self.background.height
    }
}

/// The finished strip, sized like the template background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeResult {
    pixels: Arc<RgbaBuffer>,
}

impl CompositeResult {
    /// Borrow the composited pixels.
    pub fn pixels(&self) -> &RgbaBuffer {
        &self.pixels
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height
    }
}

/// Place every frame into its slot over the template background.
///
/// All frames are prepared before anything is drawn. If any frame cannot be prepared the whole
/// operation fails with [`BoothError::CompositionIncomplete`] naming every bad frame; a partial strip
/// is never returned. Draw order is always capture order. Frames are only scaled and placed, never
/// recoloured.
#[tracing::instrument(skip_all, fields(slots = template.slots.len(), frames = frames.len()))]
pub fn compose_strip(template: &Template, frames: &[CapturedFrame]) -> BoothResult<CompositeResult> {
    if frames.len() != template.slots.len() {
        return Err(BoothError::composition_incomplete(format!(
            "template has {} slots but {} frames were captured",
            template.slots.len(),
            frames.len()
        )));
    }

    let prepared = prepare_frames(frames)?;
    let mut canvas = template.background.to_image().map_err(|e| {
        BoothError::composition_incomplete(format!("background is not drawable: {e}"))
    })?;

    for (i, (img, slot)) in prepared.iter().zip(&template.slots).enumerate() {
        let fit = contain_fit(img.width(), img.height(), *slot);
        let x = round_px(fit.x0);
        let y = round_px(fit.y0);
        let w = (round_px(fit.x1) - x).max(1) as u32;
        let h = (round_px(fit.y1) - y).max(1) as u32;

        if img.dimensions() == (w, h) {
            imageops::overlay(&mut canvas, img, x, y);
        } else {
            let scaled = imageops::resize(img, w, h, FilterType::Triangle);
            imageops::overlay(&mut canvas, &scaled, x, y);
        }
        debug!(slot = i, x, y, w, h, "placed frame");
    }

    Ok(CompositeResult {
        pixels: Arc::new(RgbaBuffer::from_image(canvas)),
    })
}

fn prepare_frames(frames: &[CapturedFrame]) -> BoothResult<Vec<RgbaImage>> {
    let mut ready = Vec::with_capacity(frames.len());
    let mut failed = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        match frame.pixels().to_image() {
            Ok(img) => ready.push(img),
            Err(e) => failed.push(format!("frame {}: {e}", i + 1)),
        }
    }
    if !failed.is_empty() {
        return Err(BoothError::composition_incomplete(failed.join("; ")));
    }
    Ok(ready)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/strip.rs"]
mod tests;
