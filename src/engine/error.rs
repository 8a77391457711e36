use thiserror::Error;

/// Typed errors surfaced by the engine to the transport layer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("instrument not found")]
    UnknownInstrument,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("entity not found")]
    NotFound,

    #[error("already exists")]
    Duplicate,

    #[error("transaction conflict")]
    Conflict,

    #[error("{0}")]
    Validation(String),

    #[error("invariant violation: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return EngineError::NotFound;
        }
        if let Some(db) = err.as_database_error() {
            // 23514 = check_violation (balances CHECK amount >= 0)
            // 23505 = unique_violation
            // 40001 = serialization_failure, 40P01 = deadlock_detected
            match db.code().as_deref() {
                Some("23514") => return EngineError::InsufficientFunds,
                Some("23505") => return EngineError::Duplicate,
                Some("40001") | Some("40P01") => return EngineError::Conflict,
                _ => {}
            }
        }
        EngineError::Database(err)
    }
}
