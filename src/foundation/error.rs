/// Convenience result type used across the animator.
pub type AnimatorResult<T> = Result<T, AnimatorError>;

/// Top-level error taxonomy used by the timeline and pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum AnimatorError {
    /// Invalid run configuration or caller-supplied data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A keyframe payload that cannot be turned into a timeline.
    #[error("keyframe error: {0}")]
    Keyframe(String),

    /// A referenced asset (image, font, source frame) could not be used.
    #[error("asset error: {0}")]
    Asset(String),

    /// Pixel-level failures while transforming or compositing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// The generation backend failed to produce a frame.
    #[error("backend error: {0}")]
    Backend(String),

    /// A `model` keyframe named a checkpoint the backend cannot resolve.
    #[error("unknown checkpoint: {0}")]
    UnknownCheckpoint(String),

    /// Errors when serializing or deserializing settings and tables.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimatorError {
    /// Build an [`AnimatorError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AnimatorError::Keyframe`] value.
    pub fn keyframe(msg: impl Into<String>) -> Self {
        Self::Keyframe(msg.into())
    }

    /// Build an [`AnimatorError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build an [`AnimatorError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build an [`AnimatorError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build an [`AnimatorError::UnknownCheckpoint`] value.
    pub fn unknown_checkpoint(name: impl Into<String>) -> Self {
        Self::UnknownCheckpoint(name.into())
    }

    /// Build an [`AnimatorError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the error only means a referenced file is missing or unusable, so the
    /// caller may skip it instead of treating the input as malformed.
    pub fn is_missing_asset(&self) -> bool {
        matches!(self, Self::Asset(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
