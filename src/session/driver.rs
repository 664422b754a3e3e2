use crate::capture::camera::CameraDevice;
use crate::compose::strip::CompositeResult;
use crate::foundation::error::{BoothError, BoothResult};
use crate::session::capture_session::CaptureSession;
use crate::session::progress::{ProgressSink, Stage};

/// Drive `session` from `Setup` to its end, stepping virtual time one countdown tick at a time.
///
/// Every snapshot the session emits is forwarded to `progress`, including those emitted before the
/// call. A session that reaches `Compositing` without a template ends without a strip.
///
/// Returns the finished strip, or the error that ended the session.
#[tracing::instrument(skip_all, fields(frames = session.opts().target_count))]
pub fn run_session(
    session: &mut CaptureSession,
    camera: &mut dyn CameraDevice,
    progress: &mut dyn ProgressSink,
) -> BoothResult<CompositeResult> {
    let outcome = drive(session, camera, progress);
    forward(session, progress);
    outcome?;

    if session.stage() == Stage::Failed {
        return Err(BoothError::camera_unavailable("session failed"));
    }
    session.result().cloned().ok_or_else(|| {
        BoothError::composition_incomplete("session reached result without a strip")
    })
}

fn drive(
    session: &mut CaptureSession,
    camera: &mut dyn CameraDevice,
    progress: &mut dyn ProgressSink,
) -> BoothResult<()> {
    if session.stage() != Stage::Setup {
        session.restart();
    }
    session.start()?;
    forward(session, progress);
    session.acquire_from(camera)?;

    let step = session.opts().tick;
    loop {
        forward(session, progress);
        match session.stage() {
            Stage::Result | Stage::Failed => return Ok(()),
            Stage::Compositing if !session.has_template() => {
                session.template_failed(&BoothError::composition_incomplete(
                    "no template was supplied",
                ));
            }
            stage if session.pending_timers() == 0 => {
                return Err(BoothError::validation(format!(
                    "session stalled in {} with nothing scheduled",
                    stage.as_str()
                )));
            }
            _ => session.advance(step)?,
        }
    }
}

fn forward(session: &mut CaptureSession, progress: &mut dyn ProgressSink) {
    for snap in session.take_snapshots() {
        progress.emit(&snap);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/driver.rs"]
mod tests;
