//! The capture session state machine and its collaborators.

/// The session state machine.
pub mod capture_session;
/// Run one complete session against a camera device in virtual time.
pub mod driver;
/// Progress snapshots emitted after every transition.
pub mod progress;
pub(crate) mod timer;
