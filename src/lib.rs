//! Photostrip is the capture and compositing core of a photo-booth kiosk.
//!
//! A [`CaptureSession`] runs a countdown, takes N frames from a camera, crops and filters each
//! one, and composites them into a vertical strip over a background [`Template`]. The finished
//! strip is encoded to PNG for export.
//!
//! - Pick a [`Filter`] and a background, then [`CaptureSession::start`]
//! - Feed camera and timer signals in, or let [`run_session`] drive it in virtual time
//! - Take the [`CompositeResult`] and [`CaptureSession::export_strip`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod assets;
pub mod capture;
pub mod compose;
/// JSON booth configuration.
pub mod config;
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod session;

pub use crate::foundation::core::{Aspect, Point, Rect, RgbaBuffer, Size};
pub use crate::foundation::error::{BoothError, BoothResult, FailureKind};

pub use crate::assets::store::{
    FsTemplateLoader, MemoryTemplateLoader, TemplateCache, TemplateLoader,
};
pub use crate::capture::camera::{
    CameraDevice, ExclusiveCamera, FrameSource, RawFrame, StillCamera,
};
pub use crate::capture::crop::{CropRect, center_crop_rect, crop_frame};
pub use crate::compose::layout::{StripLayout, contain_fit};
pub use crate::compose::strip::{CapturedFrame, CompositeResult, Template, compose_strip};
pub use crate::config::{BackgroundEntry, BoothConfig};
pub use crate::effects::filter::{Filter, apply_filter};
pub use crate::encode::png::{EncodedStrip, encode_png, encode_strip};
pub use crate::encode::sink::{ExportSink, FileExport, InMemoryExport};
pub use crate::session::capture_session::{CaptureOutcome, CaptureSession, SessionOpts};
pub use crate::session::driver::run_session;
pub use crate::session::progress::{
    InMemoryProgress, ProgressSink, ProgressSnapshot, Stage, TracingProgress,
};
