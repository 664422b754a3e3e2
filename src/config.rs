use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::assets::store::normalize_rel_path;
use crate::compose::layout::StripLayout;
use crate::effects::filter::Filter;
use crate::foundation::core::Aspect;
use crate::foundation::error::{BoothError, BoothResult};
use crate::session::capture_session::SessionOpts;

/// A selectable background.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackgroundEntry {
    /// Display name, matched case-insensitively.
    pub name: String,
    /// Image path relative to the assets root.
    pub path: String,
}

/// Booth configuration, loaded from JSON. Every field is optional.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoothConfig {
    /// Frames per session.
    pub target_count: u32,
    /// Countdown start value.
    pub countdown_from: u32,
    /// Countdown tick interval in milliseconds.
    pub tick_ms: u64,
    /// Pause between a capture and the next countdown, in milliseconds.
    pub advance_delay_ms: u64,
    /// How long the capture flash signal stays raised, in milliseconds.
    pub flash_ms: u64,
    /// Aspect captures are cropped to.
    pub capture_aspect: Aspect,
    /// Mirror captures horizontally.
    pub mirror: bool,
    /// Filter selected when a session starts.
    pub filter: Filter,
    /// Slot layout constants.
    pub layout: StripLayout,
    /// Background catalog.
    pub backgrounds: Vec<BackgroundEntry>,
    /// Download file name of the strip.
    pub output_name: String,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            target_count: 4,
            countdown_from: 3,
            tick_ms: 1000,
            advance_delay_ms: 1000,
            flash_ms: 200,
            capture_aspect: Aspect::FOUR_THREE,
            mirror: true,
            filter: Filter::Normal,
            layout: StripLayout::default(),
            backgrounds: vec![BackgroundEntry {
                name: "Hearts".to_string(),
                path: "assets/hearts.png".to_string(),
            }],
            output_name: "photobooth-image.png".to_string(),
        }
    }
}

impl BoothConfig {
    /// Parse a configuration from a JSON reader. The result is not validated.
    pub fn from_reader<R: std::io::Read>(r: R) -> BoothResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| BoothError::serde(format!("parse booth config JSON: {e}")))
    }

    /// Parse and validate a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> BoothResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BoothError::validation(format!("open booth config '{}': {e}", path.display()))
        })?;
        let cfg = Self::from_reader(BufReader::new(f))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations a session cannot run with.
    pub fn validate(&self) -> BoothResult<()> {
        if self.tick_ms == 0 {
            return Err(BoothError::validation("tick_ms must be > 0"));
        }
        if self.advance_delay_ms == 0 {
            return Err(BoothError::validation("advance_delay_ms must be > 0"));
        }
        if self.flash_ms == 0 {
            return Err(BoothError::validation("flash_ms must be > 0"));
        }
        self.session_opts().validate()?;
        self.layout.validate(self.target_count)?;

        if self.backgrounds.is_empty() {
            return Err(BoothError::validation(
                "background catalog must list at least one entry",
            ));
        }
        for (i, bg) in self.backgrounds.iter().enumerate() {
            if bg.name.trim().is_empty() {
                return Err(BoothError::validation(format!(
                    "backgrounds[{i}] has an empty name"
                )));
            }
            normalize_rel_path(&bg.path)?;
            if self.backgrounds[..i]
                .iter()
                .any(|b| b.name.eq_ignore_ascii_case(&bg.name))
            {
                return Err(BoothError::validation(format!(
                    "duplicate background name '{}'",
                    bg.name
                )));
            }
        }

        let name = self.output_name.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || name.contains(':')
        {
            return Err(BoothError::validation(format!(
                "output_name '{name}' must be a plain file name"
            )));
        }
        Ok(())
    }

    /// Timing and geometry for a [`CaptureSession`](crate::session::capture_session::CaptureSession).
    pub fn session_opts(&self) -> SessionOpts {
        SessionOpts {
            target_count: self.target_count,
            countdown_from: self.countdown_from,
            tick: Duration::from_millis(self.tick_ms),
            advance_delay: Duration::from_millis(self.advance_delay_ms),
            flash: Duration::from_millis(self.flash_ms),
            capture_aspect: self.capture_aspect,
            mirror: self.mirror,
            output_name: self.output_name.clone(),
        }
    }

    /// Resolve a background by catalog name, or accept a relative image path as is.
    ///
    /// Returns the normalized relative path used as the template identity.
    pub fn resolve_background(&self, key: &str) -> BoothResult<String> {
        if let Some(bg) = self
            .backgrounds
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(key.trim()))
        {
            return normalize_rel_path(&bg.path);
        }
        normalize_rel_path(key).map_err(|e| {
            BoothError::validation(format!(
                "background '{key}' is neither a catalog name nor a relative path ({e})"
            ))
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
