//! Camera acquisition and frame cropping.

/// Camera device and frame source seams.
pub mod camera;
/// Center crop to the capture aspect, with optional mirroring.
pub mod crop;
