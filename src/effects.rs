//! Per-pixel effects applied to captured frames.

/// Normal, grayscale and sepia pixel filters.
pub mod filter;
