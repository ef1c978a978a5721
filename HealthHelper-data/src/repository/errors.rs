use std::sync::PoisonError;
use thiserror::Error;
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Not found error
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Mutex lock error
    #[error("Mutex lock error: {0}")]
    MutexLock(String),
}

impl RepositoryError {
    /// Whether the failure came from the storage backend itself, as opposed
    /// to an answer about the data (missing record, duplicate key)
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            RepositoryError::Database(_)
                | RepositoryError::Sqlite(_)
                | RepositoryError::Pool(_)
                | RepositoryError::MutexLock(_)
        )
    }
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::MutexLock(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_failure_classification() {
        assert!(RepositoryError::MutexLock("poisoned".into()).is_backend_failure());
        assert!(RepositoryError::Database(DatabaseError::PoolNotInitialized).is_backend_failure());
        assert!(!RepositoryError::NotFound("user".into()).is_backend_failure());
        assert!(!RepositoryError::Conflict("email".into()).is_backend_failure());
    }
}
