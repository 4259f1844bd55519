/// Convenience result type used across CheckForge.
pub type CheckForgeResult<T> = Result<T, CheckForgeError>;

/// Top-level error taxonomy used by renderer APIs.
#[derive(thiserror::Error, Debug)]
pub enum CheckForgeError {
    /// Malformed check document field.
    #[error("validation error: {field}: {reason}")]
    Validation {
        /// Name of the offending field, as it appears in the JSON payload.
        field: String,
        /// Human-readable reason.
        reason: String,
    },

    /// MICR or amount formatting could not produce valid output.
    #[error("format error: {0}")]
    Format(String),

    /// An image or font could not be loaded.
    ///
    /// The renderer substitutes a fallback for these; they only surface from loader APIs.
    #[error("resource load error: {0}")]
    ResourceLoad(String),

    /// Errors while rasterizing a draw list onto a surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CheckForgeError {
    /// Build a [`CheckForgeError::Validation`] value.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`CheckForgeError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`CheckForgeError::ResourceLoad`] value.
    pub fn resource_load(msg: impl Into<String>) -> Self {
        Self::ResourceLoad(msg.into())
    }

    /// Build a [`CheckForgeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CheckForgeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Field name for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
