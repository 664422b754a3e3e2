use crate::foundation::core::Rect;
use crate::foundation::error::{BoothError, BoothResult};

const EPS: f64 = 1e-9;

/// Proportional slot layout for a single-column strip.
///
/// For a `W x H` background and `N` slots:
///
/// - `slot_w = W * width_ratio * scale_factor`, centered horizontally
/// - `slot_h = (H / N) * height_ratio * scale_factor`
/// - `spacing = (H / N) * spacing_ratio`
/// - `slot_y(i) = spacing * top_offset_ratio + spacing * i`
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StripLayout {
    /// Slot width as a fraction of the background width, before scaling.
    pub width_ratio: f64,
    /// Slot height as a fraction of one row (`H / N`), before scaling.
    pub height_ratio: f64,
    /// Vertical pitch between slot tops as a fraction of one row.
    pub spacing_ratio: f64,
    /// First slot's top offset as a fraction of the pitch.
    pub top_offset_ratio: f64,
    /// Uniform scale applied to slot width and height.
    pub scale_factor: f64,
}

impl Default for StripLayout {
    fn default() -> Self {
        Self {
            width_ratio: 0.7,
            height_ratio: 0.65,
            spacing_ratio: 0.85,
            top_offset_ratio: 0.225,
            scale_factor: 1.2,
        }
    }
}

impl StripLayout {
    /// Reject layouts whose `count` slots would overlap or leave the background.
    pub fn validate(&self, count: u32) -> BoothResult<()> {
        if count == 0 {
            return Err(BoothError::validation("strip layout needs at least one slot"));
        }
        for (name, v) in [
            ("width_ratio", self.width_ratio),
            ("height_ratio", self.height_ratio),
            ("spacing_ratio", self.spacing_ratio),
            ("scale_factor", self.scale_factor),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(BoothError::validation(format!(
                    "layout {name} must be finite and > 0"
                )));
            }
        }
        if !self.top_offset_ratio.is_finite() || self.top_offset_ratio < 0.0 {
            return Err(BoothError::validation(
                "layout top_offset_ratio must be finite and >= 0",
            ));
        }

        if self.width_ratio * self.scale_factor > 1.0 + EPS {
            return Err(BoothError::validation(
                "layout slots are wider than the background",
            ));
        }
        let slot_h = self.height_ratio * self.scale_factor;
        if slot_h > self.spacing_ratio + EPS {
            return Err(BoothError::validation(
                "layout slots are taller than their spacing and would overlap",
            ));
        }
        // in units of one row (H / N)
        let bottom = self.spacing_ratio * self.top_offset_ratio
            + self.spacing_ratio * f64::from(count - 1)
            + slot_h;
        if bottom > f64::from(count) + EPS {
            return Err(BoothError::validation(
                "layout last slot extends past the bottom of the background",
            ));
        }
        Ok(())
    }

    /// Slot rectangles in background pixel space, top to bottom.
    pub fn slots(&self, width: u32, height: u32, count: u32) -> BoothResult<Vec<Rect>> {
        self.validate(count)?;
        if width == 0 || height == 0 {
            return Err(BoothError::validation(
                "background dimensions must be non-zero",
            ));
        }

        let w = f64::from(width);
        let row = f64::from(height) / f64::from(count);
        let slot_w = w * self.width_ratio * self.scale_factor;
        let slot_h = row * self.height_ratio * self.scale_factor;
        let slot_x = (w - slot_w) / 2.0;
        let spacing = row * self.spacing_ratio;
        let start_y = spacing * self.top_offset_ratio;

        Ok((0..count)
            .map(|i| {
                Rect::from_origin_size(
                    (slot_x, start_y + spacing * f64::from(i)),
                    (slot_w, slot_h),
                )
            })
            .collect())
    }
}

/// Aspect-preserving fit of a `frame_w x frame_h` image inside `slot`, centered on the free axis.
pub fn contain_fit(frame_w: u32, frame_h: u32, slot: Rect) -> Rect {
    let frame_aspect = f64::from(frame_w) / f64::from(frame_h);
    let slot_aspect = slot.width() / slot.height();

    if frame_aspect > slot_aspect {
        let draw_w = slot.width();
        let draw_h = draw_w / frame_aspect;
        Rect::from_origin_size(
            (slot.x0, slot.y0 + (slot.height() - draw_h) / 2.0),
            (draw_w, draw_h),
        )
    } else {
        let draw_h = slot.height();
        let draw_w = draw_h * frame_aspect;
        Rect::from_origin_size(
            (slot.x0 + (slot.width() - draw_w) / 2.0, slot.y0),
            (draw_w, draw_h),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layout.rs"]
mod tests;
