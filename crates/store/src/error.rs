use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be reached (pool timeout, closed pool, I/O).
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// Another account already uses this email.
    #[error("An account with email {0} already exists")]
    DuplicateEmail(String),

    /// The record to update does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The record changed between read and write.
    #[error("{entity} {id} was modified concurrently (expected {expected})")]
    ConcurrencyConflict {
        entity: &'static str,
        id: String,
        expected: String,
    },

    /// A stored value could not be mapped back to a domain type.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True when the failure is the database being unreachable rather
    /// than a problem with the request.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            other => StoreError::Database(other),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_unavailable() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_unavailable());
    }

    #[test]
    fn row_not_found_is_a_database_error() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(!err.is_unavailable());
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn conflict_message_names_expected_state() {
        let err = StoreError::ConcurrencyConflict {
            entity: "Order",
            id: "abc".to_string(),
            expected: "pending".to_string(),
        };
        assert_eq!(err.to_string(), "Order abc was modified concurrently (expected pending)");
        assert!(!err.is_unavailable());
    }

    #[test]
    fn not_found_message() {
        let err = StoreError::not_found("Order", "abc");
        assert_eq!(err.to_string(), "Order not found: abc");
    }
}
