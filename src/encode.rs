//! Output encoding and export handoff.
//!
//! The composited strip is encoded once to PNG and handed to export sinks as an
//! [`EncodedStrip`](png::EncodedStrip).

/// Lossless PNG encoding of composited strips.
pub mod png;
/// Export sink trait and built-in sinks.
pub mod sink;
