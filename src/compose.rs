//! Photo-strip compositing: slot layout, contain fit, and frame placement over a template.

/// Slot formula and contain fit.
pub mod layout;
/// Templates and all-or-nothing strip compositing.
pub mod strip;
