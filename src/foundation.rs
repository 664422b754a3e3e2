//! Shared building blocks: pixel buffers, geometry, errors, and fixed-point channel math.

/// Pixel buffers, aspect ratios and geometry re-exports.
pub mod core;
/// Error types.
pub mod error;
pub(crate) mod math;
