use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::foundation::core::RgbaBuffer;
use crate::foundation::error::{BoothError, BoothResult};

/// Raw frame as delivered by the camera, in sensor orientation and resolution.
pub type RawFrame = RgbaBuffer;

/// A live video source handed out by a [`CameraDevice`].
///
/// `release` must be safe to call when no frame was ever read.
pub trait FrameSource: Send {
    /// Grab the current frame of the feed.
    fn read_frame(&mut self) -> BoothResult<RawFrame>;
    /// Stop the feed and give the device back.
    fn release(&mut self);
}

/// Camera acquisition seam. Denied or absent devices report [`BoothError::CameraUnavailable`].
pub trait CameraDevice: Send {
    /// Request a live video frame source.
    fn acquire(&mut self) -> BoothResult<Box<dyn FrameSource>>;
}

/// Wraps a device so that at most one holder can have it open at a time.
///
/// A second `acquire` while a source is still outstanding fails fast instead of sharing the feed.
/// Releasing (or dropping) the handed-out source frees the device again.
#[derive(Debug)]
pub struct ExclusiveCamera<D> {
    inner: D,
    held: Arc<AtomicBool>,
}

impl<D: CameraDevice> ExclusiveCamera<D> {
    /// Guard `inner`.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            held: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a source is currently outstanding.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

impl<D: CameraDevice> CameraDevice for ExclusiveCamera<D> {
    fn acquire(&mut self) -> BoothResult<Box<dyn FrameSource>> {
        if self.held.swap(true, Ordering::AcqRel) {
            return Err(BoothError::camera_unavailable(
                "camera is already held by another session",
            ));
        }
        match self.inner.acquire() {
            Ok(src) => Ok(Box::new(HeldSource {
                inner: Some(src),
                held: Arc::clone(&self.held),
            })),
            Err(e) => {
                self.held.store(false, Ordering::Release);
                Err(e)
            }
        }
    }
}

struct HeldSource {
    inner: Option<Box<dyn FrameSource>>,
    held: Arc<AtomicBool>,
}

impl FrameSource for HeldSource {
    fn read_frame(&mut self) -> BoothResult<RawFrame> {
        self.inner
            .as_mut()
            .ok_or_else(|| BoothError::camera_unavailable("frame source already released"))?
            .read_frame()
    }

    fn release(&mut self) {
        if let Some(mut src) = self.inner.take() {
            src.release();
            self.held.store(false, Ordering::Release);
        }
    }
}

impl Drop for HeldSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Counters shared between a [`StillCamera`] and the sources it hands out.
#[derive(Debug, Default)]
pub struct CameraStats {
    acquires: AtomicUsize,
    reads: AtomicUsize,
    releases: AtomicUsize,
}

impl CameraStats {
    /// Successful acquisitions.
    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::Acquire)
    }

    /// Frames read across all sources.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Acquire)
    }

    /// `release` calls across all sources, including redundant ones.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Acquire)
    }
}

/// In-memory camera that replays a fixed set of frames in a loop.
///
/// Used by the CLI (captures from image files or a generated pattern) and by tests that need to
/// observe acquire/read/release ordering.
#[derive(Debug)]
pub struct StillCamera {
    frames: Arc<[RawFrame]>,
    denied: Option<String>,
    stats: Arc<CameraStats>,
}

impl StillCamera {
    /// Replay `frames` in order, wrapping around.
    pub fn new(frames: Vec<RawFrame>) -> BoothResult<Self> {
        if frames.is_empty() {
            return Err(BoothError::validation("still camera needs at least one frame"));
        }
        for f in &frames {
            f.check()?;
        }
        Ok(Self {
            frames: frames.into(),
            denied: None,
            stats: Arc::new(CameraStats::default()),
        })
    }

    /// A device whose every acquisition is refused with `reason`.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            frames: Arc::from(Vec::<RawFrame>::new()),
            denied: Some(reason.into()),
            stats: Arc::new(CameraStats::default()),
        }
    }

    /// Generated colour-bar frames, each `count`-th shifted so captures are distinguishable.
    pub fn test_pattern(width: u32, height: u32, count: usize) -> BoothResult<Self> {
        const BARS: [[u8; 3]; 6] = [
            [235, 235, 235],
            [235, 235, 16],
            [16, 235, 235],
            [16, 235, 16],
            [235, 16, 235],
            [16, 16, 235],
        ];
        if width == 0 || height == 0 {
            return Err(BoothError::validation("test pattern dimensions must be > 0"));
        }
        let mut frames = Vec::with_capacity(count.max(1));
        for shot in 0..count.max(1) {
            let mut data = Vec::with_capacity(RgbaBuffer::byte_len(width, height)?);
            for _y in 0..height {
                for x in 0..width {
                    let bar = (x as usize * BARS.len() / width as usize + shot) % BARS.len();
                    let [r, g, b] = BARS[bar];
                    data.extend_from_slice(&[r, g, b, 255]);
                }
            }
            frames.push(RgbaBuffer::new(width, height, data)?);
        }
        Self::new(frames)
    }

    /// Shared counters, still readable after the camera has been moved into a session driver.
    pub fn stats(&self) -> Arc<CameraStats> {
        Arc::clone(&self.stats)
    }
}

impl CameraDevice for StillCamera {
    fn acquire(&mut self) -> BoothResult<Box<dyn FrameSource>> {
        if let Some(reason) = &self.denied {
            return Err(BoothError::camera_unavailable(reason.clone()));
        }
        self.stats.acquires.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(StillSource {
            frames: Arc::clone(&self.frames),
            next: 0,
            released: false,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct StillSource {
    frames: Arc<[RawFrame]>,
    next: usize,
    released: bool,
    stats: Arc<CameraStats>,
}

impl FrameSource for StillSource {
    fn read_frame(&mut self) -> BoothResult<RawFrame> {
        if self.released {
            return Err(BoothError::camera_unavailable("frame source already released"));
        }
        let frame = self.frames[self.next % self.frames.len()].clone();
        self.next += 1;
        self.stats.reads.fetch_add(1, Ordering::AcqRel);
        Ok(frame)
    }

    fn release(&mut self) {
        self.released = true;
        self.stats.releases.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/camera.rs"]
mod tests;
