//! Entity store errors.

use crate::migration::MigrationError;
use sandstock_changelog_types::CaptureError;
use thiserror::Error;

/// Errors raised by the entity store and change log repository.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A mutation hook rejected the change; the unit of work must not commit.
    #[error("change capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("listener '{listener}' is already subscribed to {table}")]
    DuplicateSubscription {
        table: &'static str,
        listener: &'static str,
    },

    #[error("{table} row {id} not found")]
    NotFound { table: &'static str, id: i64 },

    /// Update or delete of an entity that was never inserted.
    #[error("{table} entity has no id; insert it first")]
    NotPersisted { table: &'static str },

    /// A hook failed earlier in this unit of work; it can only be rolled back.
    #[error("unit of work aborted by a failed mutation hook")]
    Aborted,

    #[error("invalid row in {table}: {message}")]
    InvalidRow { table: &'static str, message: String },

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_capture(&self) -> bool {
        matches!(self, Self::Capture(_))
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound {
            table: "dim_product",
            id: 4,
        };
        assert_eq!(err.to_string(), "dim_product row 4 not found");
        assert!(err.is_not_found());

        let err = StoreError::DuplicateSubscription {
            table: "fact_order",
            listener: "changelog",
        };
        assert_eq!(
            err.to_string(),
            "listener 'changelog' is already subscribed to fact_order"
        );
    }

    #[test]
    fn test_capture_error_converts() {
        let err: StoreError = CaptureError::unserializable("t", "f", "bad").into();
        assert!(err.is_capture());
        assert!(err.to_string().contains("t.f"));
    }
}
