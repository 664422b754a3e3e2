use super::*;
use crate::capture::camera::{ExclusiveCamera, RawFrame, StillCamera};
use crate::compose::layout::StripLayout;
use crate::foundation::core::RgbaBuffer;

const SEC: Duration = Duration::from_secs(1);

fn template() -> Arc<Template> {
    Arc::new(
        Template::new(
            RgbaBuffer::filled(60, 180, [20, 20, 20, 255]),
            &StripLayout::default(),
            4,
        )
        .unwrap(),
    )
}

fn ready_session() -> CaptureSession {
    let mut s = CaptureSession::new(SessionOpts::default()).unwrap();
    s.set_template(template()).unwrap();
    s
}

fn advance_secs(s: &mut CaptureSession, n: u32) {
    for _ in 0..n {
        s.advance(SEC).unwrap();
    }
}

struct BrokenSource;

impl FrameSource for BrokenSource {
    fn read_frame(&mut self) -> BoothResult<RawFrame> {
        Err(BoothError::camera_unavailable("sensor unplugged"))
    }

    fn release(&mut self) {}
}

#[test]
fn full_session_reaches_result_and_releases_camera_after_fourth_capture() {
    let mut cam = StillCamera::test_pattern(64, 36, 4).unwrap();
    let stats = cam.stats();
    let mut s = ready_session();

    s.start().unwrap();
    assert_eq!(s.stage(), Stage::AwaitingCamera);
    s.acquire_from(&mut cam).unwrap();
    assert_eq!(s.stage(), Stage::Countdown);
    assert_eq!(s.countdown_remaining(), Some(3));

    // captures land at t = 3, 7, 11, 15
    advance_secs(&mut s, 14);
    assert_eq!(s.photos_taken(), 3);
    assert_eq!(s.stage(), Stage::Countdown);
    assert!(s.holds_camera());
    assert_eq!(stats.releases(), 0);

    advance_secs(&mut s, 1);
    assert_eq!(s.stage(), Stage::Result);
    assert_eq!(s.frames().len(), 4);
    assert_eq!(stats.releases(), 1);
    assert!(!s.holds_camera());
    assert!(s.failure().is_none());
    assert_eq!(s.pending_timers(), 0);
    assert!(!s.snapshot().flash);

    s.take_snapshots();
    advance_secs(&mut s, 5);
    assert!(s.take_snapshots().is_empty());

    let result = s.result().unwrap();
    assert_eq!((result.width(), result.height()), (60, 180));
    for f in s.frames() {
        assert_eq!((f.width(), f.height()), (48, 36));
    }
}

#[test]
fn snapshots_trace_countdown_and_stage_order() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let mut s = ready_session();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    advance_secs(&mut s, 15);

    let snaps = s.take_snapshots();
    assert_eq!(snaps.first().unwrap().stage, Stage::Setup);
    assert_eq!(snaps.last().unwrap().stage, Stage::Result);

    let first_countdown: Vec<u32> = snaps
        .iter()
        .take_while(|s| s.stage != Stage::Capturing)
        .filter_map(|s| s.countdown_remaining)
        .collect();
    assert_eq!(first_countdown, vec![3, 2, 1, 0]);

    let mut stages: Vec<Stage> = snaps.iter().map(|s| s.stage).collect();
    stages.dedup();
    let mut expected = vec![Stage::Setup, Stage::AwaitingCamera];
    for i in 0..4 {
        expected.extend([Stage::Countdown, Stage::Capturing]);
        expected.push(if i < 3 {
            Stage::Advancing
        } else {
            Stage::Compositing
        });
    }
    expected.push(Stage::Result);
    assert_eq!(stages, expected);

    for pair in snaps.windows(2) {
        let (a, b) = (pair[0].stage, pair[1].stage);
        assert!(a == b || a.can_transition_to(b), "{a:?} -> {b:?}");
    }
    assert!(snaps.iter().any(|s| s.flash));
    assert!(
        snaps
            .iter()
            .filter(|s| s.stage != Stage::Countdown)
            .all(|s| s.countdown_remaining.is_none())
    );
    assert!(s.take_snapshots().is_empty());
}

#[test]
fn camera_failure_ends_session_without_frames_or_timers() {
    let mut cam = StillCamera::denied("permission denied");
    let mut s = ready_session();
    s.start().unwrap();
    let err = s.acquire_from(&mut cam).err().unwrap();
    assert!(matches!(err, BoothError::CameraUnavailable(_)));

    assert_eq!(s.stage(), Stage::Failed);
    assert_eq!(s.failure(), Some(FailureKind::CameraUnavailable));
    assert_eq!(s.failure(), err.failure_kind());
    assert!(s.frames().is_empty());
    assert_eq!(s.pending_timers(), 0);
    assert_eq!(
        s.take_snapshots().last().unwrap().failure,
        Some(FailureKind::CameraUnavailable)
    );

    s.restart();
    assert_eq!(s.stage(), Stage::Setup);
    assert!(s.failure().is_none());
}

#[test]
fn restart_from_result_discards_previous_strip() {
    let mut cam = StillCamera::test_pattern(64, 48, 4).unwrap();
    let mut s = ready_session();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    advance_secs(&mut s, 15);
    let first = s.result().unwrap().clone();

    s.restart();
    assert_eq!(s.stage(), Stage::Setup);
    assert!(s.frames().is_empty());
    assert!(s.result().is_none());
    assert!(s.export_strip().is_err());

    s.set_filter(Filter::Sepia).unwrap();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    advance_secs(&mut s, 15);
    assert_eq!(s.stage(), Stage::Result);
    assert_ne!(s.result().unwrap(), &first);
}

#[test]
fn duplicate_capture_triggers_after_last_frame_are_noops() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let stats = cam.stats();
    let mut s = ready_session();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    advance_secs(&mut s, 15);
    let reads = stats.reads();

    assert_eq!(s.capture_now().unwrap(), CaptureOutcome::Skipped);
    assert_eq!(s.capture_now().unwrap(), CaptureOutcome::Skipped);
    advance_secs(&mut s, 10);
    assert_eq!(s.frames().len(), 4);
    assert_eq!(s.stage(), Stage::Result);
    assert_eq!(stats.reads(), reads);
    assert_eq!(stats.releases(), 1);
}

#[test]
fn capture_now_skips_rest_of_countdown() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let mut s = ready_session();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();

    assert_eq!(s.capture_now().unwrap(), CaptureOutcome::Captured(0));
    assert_eq!(s.stage(), Stage::Advancing);
    // the stale countdown tick must not fire a second capture
    s.advance(Duration::from_millis(999)).unwrap();
    assert_eq!(s.photos_taken(), 1);
    assert_eq!(s.stage(), Stage::Advancing);
    s.advance(Duration::from_millis(1)).unwrap();
    assert_eq!(s.stage(), Stage::Countdown);
    assert_eq!(s.countdown_remaining(), Some(3));

    assert!(s.capture_now().is_ok());
    assert!(matches!(
        ready_session().capture_now(),
        Err(BoothError::Validation(_))
    ));
}

#[test]
fn filter_is_applied_and_frozen_once_countdown_starts() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let mut s = ready_session();
    s.start().unwrap();
    s.set_filter(Filter::Grayscale).unwrap();
    s.acquire_from(&mut cam).unwrap();
    assert!(s.set_filter(Filter::Sepia).is_err());
    assert_eq!(s.filter(), Filter::Grayscale);

    advance_secs(&mut s, 3);
    let px = s.frames()[0].pixels();
    for chunk in px.data.chunks_exact(4) {
        assert_eq!(chunk[0], chunk[1]);
        assert_eq!(chunk[1], chunk[2]);
    }
}

#[test]
fn captures_are_mirrored_center_crops() {
    let mut data = Vec::new();
    for _y in 0..3u32 {
        for x in 0..8u32 {
            data.extend_from_slice(&[x as u8, 0, 0, 255]);
        }
    }
    let frame = RgbaBuffer::new(8, 3, data).unwrap();
    let mut cam = StillCamera::new(vec![frame]).unwrap();
    let mut s = ready_session();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    s.capture_now().unwrap();

    let px = s.frames()[0].pixels();
    assert_eq!((px.width, px.height), (4, 3));
    assert_eq!(px.pixel(0, 0).unwrap()[0], 5);
    assert_eq!(px.pixel(3, 0).unwrap()[0], 2);
}

#[test]
fn compositing_waits_for_late_template() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let stats = cam.stats();
    let mut s = CaptureSession::new(SessionOpts::default()).unwrap();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    advance_secs(&mut s, 15);

    assert_eq!(s.stage(), Stage::Compositing);
    assert_eq!(stats.releases(), 1);
    assert!(s.result().is_none());

    s.set_template(template()).unwrap();
    assert_eq!(s.stage(), Stage::Result);
    assert!(s.result().is_some());
}

#[test]
fn template_failure_yields_result_without_image() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let mut s = CaptureSession::new(SessionOpts::default()).unwrap();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    s.template_failed(&BoothError::asset_load_failed(
        "assets/hearts.png",
        "decode failed",
    ));
    advance_secs(&mut s, 15);

    assert_eq!(s.stage(), Stage::Result);
    assert_eq!(s.failure(), Some(FailureKind::CompositionIncomplete));
    assert!(s.result().is_none());
    assert!(s.export_strip().is_err());
}

#[test]
fn template_with_wrong_slot_count_is_rejected() {
    let t = Template::new(
        RgbaBuffer::filled(60, 180, [0, 0, 0, 255]),
        &StripLayout::default(),
        3,
    )
    .unwrap();
    let mut s = CaptureSession::new(SessionOpts::default()).unwrap();
    assert!(s.set_template(Arc::new(t)).is_err());
    assert!(!s.has_template());
}

#[test]
fn frame_read_failure_fails_session_and_releases_source() {
    let mut s = ready_session();
    s.start().unwrap();
    s.camera_ready(Box::new(BrokenSource)).unwrap();
    let err = s.advance(SEC * 3).err().unwrap();
    assert!(matches!(err, BoothError::CameraUnavailable(_)));
    assert_eq!(s.stage(), Stage::Failed);
    assert!(!s.holds_camera());
    assert_eq!(s.pending_timers(), 0);
}

#[test]
fn restart_mid_countdown_cancels_timers_and_releases_once() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let stats = cam.stats();
    let mut s = ready_session();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    advance_secs(&mut s, 2);

    s.restart();
    assert_eq!(s.pending_timers(), 0);
    assert_eq!(stats.releases(), 1);
    advance_secs(&mut s, 20);
    assert_eq!(s.stage(), Stage::Setup);
    assert_eq!(stats.reads(), 0);
    drop(s);
    assert_eq!(stats.releases(), 1);
}

#[test]
fn stale_camera_after_restart_is_released_unused() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let stats = cam.stats();
    let mut s = ready_session();
    s.start().unwrap();
    s.restart();

    let late = cam.acquire().unwrap();
    assert!(s.camera_ready(late).is_err());
    assert_eq!(stats.releases(), 1);
    assert_eq!(s.stage(), Stage::Setup);
    assert!(!s.holds_camera());
}

#[test]
fn dropping_a_session_releases_the_camera() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let stats = cam.stats();
    {
        let mut s = ready_session();
        s.start().unwrap();
        s.acquire_from(&mut cam).unwrap();
        advance_secs(&mut s, 5);
    }
    assert_eq!(stats.releases(), 1);
}

#[test]
fn exclusive_camera_allows_one_session_at_a_time() {
    let mut cam = ExclusiveCamera::new(StillCamera::test_pattern(64, 48, 1).unwrap());
    let mut a = ready_session();
    let mut b = ready_session();
    a.start().unwrap();
    b.start().unwrap();
    a.acquire_from(&mut cam).unwrap();
    assert!(b.acquire_from(&mut cam).is_err());
    assert_eq!(b.stage(), Stage::Failed);

    advance_secs(&mut a, 15);
    assert_eq!(a.stage(), Stage::Result);
    assert!(!cam.is_held());

    b.restart();
    b.start().unwrap();
    assert!(b.acquire_from(&mut cam).is_ok());
}

#[test]
fn export_encodes_once_and_repeats_identical_bytes() {
    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let mut s = ready_session();
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    advance_secs(&mut s, 15);

    let a = s.export_strip().unwrap();
    let b = s.export_strip().unwrap();
    assert_eq!(a, b);
    assert!(std::ptr::eq(a.bytes().as_ptr(), b.bytes().as_ptr()));
    assert_eq!(a.file_name(), "photobooth-image.png");
}

#[test]
fn start_is_only_valid_from_setup() {
    let mut s = ready_session();
    s.start().unwrap();
    assert!(s.start().is_err());
}

#[test]
fn invalid_opts_are_rejected() {
    let zero = SessionOpts {
        target_count: 0,
        ..SessionOpts::default()
    };
    assert!(CaptureSession::new(zero).is_err());
    let no_tick = SessionOpts {
        tick: Duration::ZERO,
        ..SessionOpts::default()
    };
    assert!(CaptureSession::new(no_tick).is_err());
}

#[test]
fn uncategorized_errors_keep_the_stage_failure_kind() {
    let mut s = ready_session();
    s.start().unwrap();
    s.camera_failed(&BoothError::validation("driver returned garbage"));
    assert_eq!(s.stage(), Stage::Failed);
    assert_eq!(s.failure(), Some(FailureKind::CameraUnavailable));

    let mut cam = StillCamera::test_pattern(64, 48, 1).unwrap();
    let mut s = CaptureSession::new(SessionOpts::default()).unwrap();
    s.template_failed(&BoothError::validation("bad template"));
    s.start().unwrap();
    s.acquire_from(&mut cam).unwrap();
    advance_secs(&mut s, 15);
    assert_eq!(s.stage(), Stage::Result);
    assert_eq!(s.failure(), Some(FailureKind::CompositionIncomplete));
}
