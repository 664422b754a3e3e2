use serde::{Deserialize, Serialize};

/// Convenience result type used across the booth pipeline.
pub type BoothResult<T> = Result<T, BoothError>;

/// Top-level error taxonomy used by the capture and compositing APIs.
#[derive(thiserror::Error, Debug)]
pub enum BoothError {
    /// Invalid caller-provided data or an operation requested in the wrong stage.
    #[error("validation error: {0}")]
    Validation(String),

    /// The camera device was denied, absent, already held, or stopped producing frames.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// A template background could not be read or decoded.
    #[error("asset load failed for '{id}': {reason}")]
    AssetLoadFailed {
        /// Identity of the background asset.
        id: String,
        /// Human-readable cause.
        reason: String,
    },

    /// Compositing could not place every frame; no partial strip is produced.
    #[error("composition incomplete: {0}")]
    CompositionIncomplete(String),

    /// Serializing the composited strip failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoothError {
    /// Build a [`BoothError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BoothError::CameraUnavailable`] value.
    pub fn camera_unavailable(msg: impl Into<String>) -> Self {
        Self::CameraUnavailable(msg.into())
    }

    /// Build a [`BoothError::AssetLoadFailed`] value.
    pub fn asset_load_failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetLoadFailed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`BoothError::CompositionIncomplete`] value.
    pub fn composition_incomplete(msg: impl Into<String>) -> Self {
        Self::CompositionIncomplete(msg.into())
    }

    /// Build a [`BoothError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`BoothError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// The session-level failure this error surfaces as, if any.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::CameraUnavailable(_) => Some(FailureKind::CameraUnavailable),
            Self::AssetLoadFailed { .. } | Self::CompositionIncomplete(_) => {
                Some(FailureKind::CompositionIncomplete)
            }
            _ => None,
        }
    }
}

/// Failure signal carried by progress snapshots for a view layer to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The camera could not be acquired or stopped delivering frames.
    CameraUnavailable,
    /// The strip could not be composited; the result carries no image.
    CompositionIncomplete,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
