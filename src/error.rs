//! Error types shared by the content store, moderation engine and scheduler

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::moderation::ContentStatus;

/// Errors returned by core study operations
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition for content item {id}: {from} -> {to}")]
    InvalidTransition {
        id: i64,
        from: ContentStatus,
        to: ContentStatus,
    },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The transaction could not be serialized against a concurrent writer.
    /// Callers may retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudyError {
    /// Whether the caller may retry the operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, StudyError::Conflict(_))
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        StudyError::NotFound(what.into())
    }

    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        StudyError::InvalidArgument(what.into())
    }
}

impl From<rusqlite::Error> for StudyError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                StudyError::Conflict(err.to_string())
            }
            _ => StudyError::Sqlite(err),
        }
    }
}

impl From<StudyError> for String {
    fn from(err: StudyError) -> Self {
        err.to_string()
    }
}

/// Result type alias for study operations
pub type Result<T> = std::result::Result<T, StudyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_maps_to_conflict() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        );
        let err = StudyError::from(busy);
        assert!(matches!(err, StudyError::Conflict(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_other_sqlite_errors_are_not_retryable() {
        let err = StudyError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, StudyError::Sqlite(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = StudyError::InvalidTransition {
            id: 4,
            from: ContentStatus::Approved,
            to: ContentStatus::Rejected,
        };
        assert_eq!(
            err.to_string(),
            "Invalid transition for content item 4: approved -> rejected"
        );
    }
}
