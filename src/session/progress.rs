use tracing::info;

use crate::foundation::error::FailureKind;

/// Session stage, in forward order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Choosing background and filter.
    Setup,
    /// Waiting for the camera to come up.
    AwaitingCamera,
    /// Counting down to the next capture.
    Countdown,
    /// Taking one frame.
    Capturing,
    /// Pause between a capture and the next countdown.
    Advancing,
    /// All frames taken; building the strip.
    Compositing,
    /// Terminal display state; carries the strip unless compositing failed.
    Result,
    /// Terminal for this session until restart.
    Failed,
}

impl Stage {
    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// Transitions are forward-only, except that any stage may fail and restart always returns
    /// to `Setup`.
    pub fn can_transition_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (_, Failed)
                | (_, Setup)
                | (Setup, AwaitingCamera)
                | (AwaitingCamera, Countdown)
                | (Countdown, Countdown)
                | (Countdown, Capturing)
                | (Capturing, Advancing)
                | (Capturing, Compositing)
                | (Advancing, Countdown)
                | (Compositing, Result)
        )
    }

    /// Stable identifier for logs and serialized snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Setup => "setup",
            Stage::AwaitingCamera => "awaiting_camera",
            Stage::Countdown => "countdown",
            Stage::Capturing => "capturing",
            Stage::Advancing => "advancing",
            Stage::Compositing => "compositing",
            Stage::Result => "result",
            Stage::Failed => "failed",
        }
    }
}

/// What a view layer needs to render the session. Emitted after every transition.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProgressSnapshot {
    /// Current stage.
    pub stage: Stage,
    /// Frames captured so far.
    pub photos_taken: u32,
    /// Frames the session will take.
    pub target_count: u32,
    /// Seconds left on the countdown; only present in `Countdown`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_remaining: Option<u32>,
    /// Capture flash feedback is showing.
    pub flash: bool,
    /// Why the session ended without a strip, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

/// Presentation-layer seam. The core never reads anything back.
pub trait ProgressSink {
    /// Receive one snapshot, in emission order.
    fn emit(&mut self, snapshot: &ProgressSnapshot);
}

/// Collects snapshots in memory.
#[derive(Debug, Default)]
pub struct InMemoryProgress {
    snapshots: Vec<ProgressSnapshot>,
}

impl InMemoryProgress {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots received so far.
    pub fn snapshots(&self) -> &[ProgressSnapshot] {
        &self.snapshots
    }

    /// Stages in emission order, with consecutive repeats kept.
    pub fn stages(&self) -> Vec<Stage> {
        self.snapshots.iter().map(|s| s.stage).collect()
    }
}

impl ProgressSink for InMemoryProgress {
    fn emit(&mut self, snapshot: &ProgressSnapshot) {
        self.snapshots.push(snapshot.clone());
    }
}

/// Logs every snapshot through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&mut self, s: &ProgressSnapshot) {
        info!(
            stage = s.stage.as_str(),
            photos = s.photos_taken,
            of = s.target_count,
            countdown = ?s.countdown_remaining,
            flash = s.flash,
            failure = ?s.failure,
            "progress"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/progress.rs"]
mod tests;
