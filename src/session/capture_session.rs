use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::capture::camera::{CameraDevice, FrameSource};
use crate::capture::crop::crop_frame;
use crate::compose::strip::{CapturedFrame, CompositeResult, Template, compose_strip};
use crate::effects::filter::{Filter, apply_filter};
use crate::encode::png::{EncodedStrip, encode_strip};
use crate::foundation::core::Aspect;
use crate::foundation::error::{BoothError, BoothResult, FailureKind};
use crate::session::progress::{ProgressSnapshot, Stage};
use crate::session::timer::{TimerKind, TimerQueue};

/// Options controlling session timing and capture geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOpts {
    /// Frames per session (N).
    pub target_count: u32,
    /// Countdown start value; one decrement per `tick`.
    pub countdown_from: u32,
    /// Countdown tick interval.
    pub tick: Duration,
    /// Pause after a capture before the next countdown starts.
    pub advance_delay: Duration,
    /// How long the capture flash signal stays raised.
    pub flash: Duration,
    /// Aspect every capture is center-cropped to.
    pub capture_aspect: Aspect,
    /// Mirror captures horizontally (front-facing self-view).
    pub mirror: bool,
    /// File name attached to the encoded strip.
    pub output_name: String,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            target_count: 4,
            countdown_from: 3,
            tick: Duration::from_secs(1),
            advance_delay: Duration::from_secs(1),
            flash: Duration::from_millis(200),
            capture_aspect: Aspect::FOUR_THREE,
            mirror: true,
            output_name: "photobooth-image.png".to_string(),
        }
    }
}

impl SessionOpts {
    /// Reject options the state machine cannot run with.
    pub fn validate(&self) -> BoothResult<()> {
        if self.target_count == 0 {
            return Err(BoothError::validation("target_count must be > 0"));
        }
        if self.countdown_from == 0 {
            return Err(BoothError::validation("countdown_from must be > 0"));
        }
        if self.tick.is_zero() {
            return Err(BoothError::validation("countdown tick must be > 0"));
        }
        if self.output_name.is_empty() {
            return Err(BoothError::validation("output_name must be non-empty"));
        }
        self.capture_aspect.validate()
    }
}

/// Result of a capture request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A frame was appended at this 0-based index.
    Captured(usize),
    /// The session already holds every frame; the request was ignored.
    Skipped,
}

#[derive(Clone, Debug)]
enum TemplateState {
    Pending,
    Ready(Arc<Template>),
    Failed(TemplateFailure),
}

#[derive(Clone, Debug)]
struct TemplateFailure {
    id: String,
    reason: String,
}

/// One photo-booth run: countdown, capture, filter, and composite for N frames.
///
/// The session is single-threaded and event driven. Collaborators push signals in
/// ([`start`](Self::start), [`camera_ready`](Self::camera_ready), [`advance`](Self::advance), ...)
/// and drain [`ProgressSnapshot`]s out with [`take_snapshots`](Self::take_snapshots). Time is virtual:
/// nothing happens between calls.
///
/// The camera source is released exactly once per session: right after the last capture (before
/// compositing starts), or on failure, restart, or drop.
pub struct CaptureSession {
    opts: SessionOpts,
    stage: Stage,
    filter: Filter,
    frames: Vec<CapturedFrame>,
    countdown_remaining: Option<u32>,
    flash: bool,
    failure: Option<FailureKind>,
    source: Option<Box<dyn FrameSource>>,
    template: TemplateState,
    result: Option<CompositeResult>,
    encoded: Option<EncodedStrip>,
    timers: TimerQueue,
    outbox: Vec<ProgressSnapshot>,
}

impl CaptureSession {
    /// Create a session in `Setup`.
    pub fn new(opts: SessionOpts) -> BoothResult<Self> {
        opts.validate()?;
        let mut s = Self {
            opts,
            stage: Stage::Setup,
            filter: Filter::Normal,
            frames: Vec::new(),
            countdown_remaining: None,
            flash: false,
            failure: None,
            source: None,
            template: TemplateState::Pending,
            result: None,
            encoded: None,
            timers: TimerQueue::default(),
            outbox: Vec::new(),
        };
        s.emit();
        Ok(s)
    }

    /// Options the session was created with.
    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Selected filter.
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Captured frames in capture order.
    pub fn frames(&self) -> &[CapturedFrame] {
        &self.frames
    }

    /// Frames captured so far.
    pub fn photos_taken(&self) -> u32 {
        self.frames.len() as u32
    }

    /// Countdown value, present only in `Countdown`.
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown_remaining
    }

    /// Why the session ended without a strip, if it did.
    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    /// The finished strip, present only in `Result` when compositing succeeded.
    pub fn result(&self) -> Option<&CompositeResult> {
        self.result.as_ref()
    }

    /// Whether the session currently holds the camera source.
    pub fn holds_camera(&self) -> bool {
        self.source.is_some()
    }

    /// Timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Virtual time elapsed since the session was created.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Whether a template is ready for compositing.
    pub fn has_template(&self) -> bool {
        matches!(self.template, TemplateState::Ready(_))
    }

    /// Current view state.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            stage: self.stage,
            photos_taken: self.photos_taken(),
            target_count: self.opts.target_count,
            countdown_remaining: self.countdown_remaining,
            flash: self.flash,
            failure: self.failure,
        }
    }

    /// Drain snapshots emitted since the last call, oldest first.
    pub fn take_snapshots(&mut self) -> Vec<ProgressSnapshot> {
        std::mem::take(&mut self.outbox)
    }

    /// Choose the filter. Only possible before the first countdown begins.
    pub fn set_filter(&mut self, filter: Filter) -> BoothResult<()> {
        if !matches!(self.stage, Stage::Setup | Stage::AwaitingCamera) {
            return Err(BoothError::validation(format!(
                "filter is fixed once capturing starts (stage {})",
                self.stage.as_str()
            )));
        }
        if self.filter != filter {
            info!(filter = filter.as_str(), "filter selected");
            self.filter = filter;
        }
        Ok(())
    }

    /// Supply the template to composite into. If the session was waiting in `Compositing`, the
    /// strip is built immediately.
    pub fn set_template(&mut self, template: Arc<Template>) -> BoothResult<()> {
        if template.slots().len() != self.opts.target_count as usize {
            return Err(BoothError::validation(format!(
                "template has {} slots, session takes {} frames",
                template.slots().len(),
                self.opts.target_count
            )));
        }
        self.template = TemplateState::Ready(template);
        if self.stage == Stage::Compositing {
            self.try_composite();
        }
        Ok(())
    }

    /// Report that the template could not be loaded. A session already in `Compositing` ends
    /// without a strip.
    pub fn template_failed(&mut self, err: &BoothError) {
        let (id, reason) = match err {
            BoothError::AssetLoadFailed { id, reason } => (id.clone(), reason.clone()),
            other => (String::new(), other.to_string()),
        };
        warn!(id = %id, reason = %reason, "template unavailable");
        self.template = TemplateState::Failed(TemplateFailure { id, reason });
        if self.stage == Stage::Compositing {
            self.try_composite();
        }
    }

    /// `Setup -> AwaitingCamera`, with an empty frame list.
    pub fn start(&mut self) -> BoothResult<()> {
        if self.stage != Stage::Setup {
            return Err(BoothError::validation(format!(
                "start requires setup stage, session is in {}",
                self.stage.as_str()
            )));
        }
        self.frames.clear();
        self.result = None;
        self.encoded = None;
        self.failure = None;
        self.transition(Stage::AwaitingCamera);
        Ok(())
    }

    /// The camera produced a live source: begin the first countdown.
    ///
    /// A source that arrives outside `AwaitingCamera` (the session was restarted or failed in the
    /// meantime) is released on the spot and never used.
    pub fn camera_ready(&mut self, mut source: Box<dyn FrameSource>) -> BoothResult<()> {
        if self.stage != Stage::AwaitingCamera {
            warn!(stage = self.stage.as_str(), "stale camera source released");
            source.release();
            return Err(BoothError::validation(format!(
                "camera became ready outside awaiting_camera (stage {})",
                self.stage.as_str()
            )));
        }
        info!("camera acquired");
        self.source = Some(source);
        self.begin_countdown();
        Ok(())
    }

    /// Camera acquisition failed: the session ends in `Failed`.
    pub fn camera_failed(&mut self, err: &BoothError) {
        if self.stage != Stage::AwaitingCamera {
            debug!(stage = self.stage.as_str(), "ignoring stale camera failure");
            return;
        }
        warn!(error = %err, "camera unavailable");
        self.fail(err);
    }

    /// Acquire from `device` and feed the outcome into the state machine.
    pub fn acquire_from(&mut self, device: &mut dyn CameraDevice) -> BoothResult<()> {
        if self.stage != Stage::AwaitingCamera {
            return Err(BoothError::validation(
                "camera acquisition requires awaiting_camera stage",
            ));
        }
        match device.acquire() {
            Ok(source) => self.camera_ready(source),
            Err(e) => {
                self.camera_failed(&e);
                Err(e)
            }
        }
    }

    /// Let `dt` of virtual time pass, firing every timer that falls due, in order.
    ///
    /// Returns the first capture error encountered; the session is already `Failed` by then.
    pub fn advance(&mut self, dt: Duration) -> BoothResult<()> {
        let until = self.timers.now() + dt;
        while let Some(kind) = self.timers.pop_due(until) {
            self.fire(kind)?;
        }
        self.timers.set_now(until);
        Ok(())
    }

    /// Capture immediately, skipping whatever is left of the countdown.
    ///
    /// Once every frame is taken this is a no-op returning [`CaptureOutcome::Skipped`], which
    /// absorbs duplicate shutter or timer triggers.
    pub fn capture_now(&mut self) -> BoothResult<CaptureOutcome> {
        if self.frames.len() >= self.opts.target_count as usize {
            debug!("capture skipped: session already holds every frame");
            return Ok(CaptureOutcome::Skipped);
        }
        if self.stage != Stage::Countdown {
            return Err(BoothError::validation(format!(
                "capture requires countdown stage, session is in {}",
                self.stage.as_str()
            )));
        }
        self.capture_step()
    }

    /// Encode the strip for download/share. Encodes once; later calls return the same bytes.
    pub fn export_strip(&mut self) -> BoothResult<EncodedStrip> {
        if let Some(strip) = &self.encoded {
            return Ok(strip.clone());
        }
        let result = self.result.as_ref().ok_or_else(|| {
            BoothError::validation("no strip to export: session has not produced a result")
        })?;
        let strip = encode_strip(result, &self.opts.output_name)?;
        self.encoded = Some(strip.clone());
        Ok(strip)
    }

    /// Return to `Setup` from any stage: cancel timers, release the camera, and drop frames and
    /// results. Filter and template selections are kept for the next session.
    pub fn restart(&mut self) {
        self.timers.cancel_all();
        self.release_camera();
        self.frames.clear();
        self.result = None;
        self.encoded = None;
        self.failure = None;
        self.countdown_remaining = None;
        self.flash = false;
        if matches!(self.template, TemplateState::Failed(_)) {
            self.template = TemplateState::Pending;
        }
        self.transition(Stage::Setup);
    }

    fn fire(&mut self, kind: TimerKind) -> BoothResult<()> {
        match kind {
            TimerKind::CountdownTick => {
                if self.stage != Stage::Countdown {
                    return Ok(());
                }
                let remaining = self.countdown_remaining.unwrap_or(0).saturating_sub(1);
                self.countdown_remaining = Some(remaining);
                self.transition(Stage::Countdown);
                if remaining == 0 {
                    self.capture_step()?;
                } else {
                    self.timers.schedule(TimerKind::CountdownTick, self.opts.tick);
                }
            }
            TimerKind::Advance => {
                if self.stage == Stage::Advancing {
                    self.begin_countdown();
                }
            }
            TimerKind::FlashEnd => {
                self.flash = false;
                self.emit();
            }
        }
        Ok(())
    }

    fn begin_countdown(&mut self) {
        self.countdown_remaining = Some(self.opts.countdown_from);
        self.timers.schedule(TimerKind::CountdownTick, self.opts.tick);
        self.transition(Stage::Countdown);
    }

    /// crop -> filter -> append, then decide where to go next.
    fn capture_step(&mut self) -> BoothResult<CaptureOutcome> {
        if self.frames.len() >= self.opts.target_count as usize {
            debug!("capture skipped: session already holds every frame");
            return Ok(CaptureOutcome::Skipped);
        }
        self.timers.cancel(TimerKind::CountdownTick);
        self.countdown_remaining = None;
        self.transition(Stage::Capturing);

        let frame = match self.grab_frame() {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "capture failed");
                self.fail(&e);
                return Err(e);
            }
        };
        let index = self.frames.len();
        self.frames.push(frame);
        info!(
            photo = index + 1,
            of = self.opts.target_count,
            filter = self.filter.as_str(),
            "photo captured"
        );

        self.flash = true;
        if self.timers.is_pending(TimerKind::FlashEnd) {
            debug!("flash still raised, restarting its timer");
            self.timers.cancel(TimerKind::FlashEnd);
        }
        self.timers.schedule(TimerKind::FlashEnd, self.opts.flash);
        self.emit();

        if self.frames.len() < self.opts.target_count as usize {
            self.timers.schedule(TimerKind::Advance, self.opts.advance_delay);
            self.transition(Stage::Advancing);
        } else {
            // nothing may fire once the session heads for its result
            self.timers.cancel_all();
            self.flash = false;
            self.release_camera();
            self.transition(Stage::Compositing);
            self.try_composite();
        }
        Ok(CaptureOutcome::Captured(index))
    }

    fn grab_frame(&mut self) -> BoothResult<CapturedFrame> {
        let source = self
            .source
            .as_mut()
            .ok_or_else(|| BoothError::camera_unavailable("no live frame source"))?;
        let raw = source.read_frame()?;
        let cropped = crop_frame(&raw, self.opts.capture_aspect, self.opts.mirror)
            .map_err(|e| BoothError::camera_unavailable(format!("unusable camera frame: {e}")))?;
        Ok(CapturedFrame::new(apply_filter(&cropped, self.filter)?))
    }

    fn try_composite(&mut self) {
        debug_assert_eq!(self.stage, Stage::Compositing);
        let template = match &self.template {
            TemplateState::Pending => {
                info!("waiting for template before compositing");
                return;
            }
            TemplateState::Failed(f) => {
                let e = BoothError::asset_load_failed(f.id.clone(), f.reason.clone());
                self.finish_incomplete(&e);
                return;
            }
            TemplateState::Ready(t) => Arc::clone(t),
        };

        match compose_strip(&template, &self.frames) {
            Ok(result) => {
                info!(
                    width = result.width(),
                    height = result.height(),
                    "strip composited"
                );
                self.result = Some(result);
                self.transition(Stage::Result);
            }
            Err(e) => self.finish_incomplete(&e),
        }
    }

    /// Compositing could not proceed: show the result stage without an image.
    fn finish_incomplete(&mut self, err: &BoothError) {
        warn!(error = %err, "composition incomplete");
        self.result = None;
        self.failure = Some(err.failure_kind().unwrap_or(FailureKind::CompositionIncomplete));
        self.transition(Stage::Result);
    }

    /// Only camera problems end a session in `Failed`; errors without a session-level kind count
    /// as the camera going away.
    fn fail(&mut self, err: &BoothError) {
        self.timers.cancel_all();
        self.release_camera();
        self.countdown_remaining = None;
        self.flash = false;
        self.failure = Some(err.failure_kind().unwrap_or(FailureKind::CameraUnavailable));
        self.transition(Stage::Failed);
    }

    fn release_camera(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
            info!("camera released");
        }
    }

    fn transition(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.stage,
            next
        );
        if self.stage != next {
            debug!(from = self.stage.as_str(), to = next.as_str(), "stage");
        }
        self.stage = next;
        self.emit();
    }

    fn emit(&mut self) {
        let snap = self.snapshot();
        self.outbox.push(snap);
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.timers.cancel_all();
        self.release_camera();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/capture_session.rs"]
mod tests;
