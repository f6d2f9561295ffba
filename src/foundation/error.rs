/// Convenience result type used across postreel.
pub type PostreelResult<T> = Result<T, PostreelError>;

/// Top-level error taxonomy used by the layout, render and encode APIs.
#[derive(thiserror::Error, Debug)]
pub enum PostreelError {
    /// Invalid configuration values.
    #[error("validation error: {0}")]
    Validation(String),

    /// A post record is missing a required field or is malformed.
    #[error("input error: {0}")]
    Input(String),

    /// A font could not be loaded or a font size could not be resolved.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failures while compositing a canvas.
    #[error("render error: {0}")]
    Render(String),

    /// Failures while producing a video file.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PostreelError {
    /// Build a [`PostreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PostreelError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`PostreelError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`PostreelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PostreelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PostreelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
