//! Capture errors.

use thiserror::Error;

/// Errors raised while turning a mutation into a change log.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A column value has no JSON representation.
    #[error("cannot serialize {table}.{field}: {reason}")]
    Unserializable {
        table: String,
        field: String,
        reason: String,
    },

    /// Encoding or decoding a JSON payload failed.
    #[error("change log payload error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored payload is valid JSON but not an object.
    #[error("change log payload is not a JSON object")]
    NotAnObject,
}

impl CaptureError {
    /// Create an unserializable-value error.
    pub fn unserializable(
        table: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Unserializable {
            table: table.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}
