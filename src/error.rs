//! Error types for the correlation core

use thiserror::Error;

/// Errors surfaced by the log store and its callers.
///
/// Context-manager operations deliberately have no error type: correlation
/// tracking is best-effort infrastructure and must never interrupt the
/// operation it is observing.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Required field missing or an immutable field present in an update
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown durable id
    #[error("log entry not found: {0}")]
    NotFound(String),

    /// Underlying storage medium unavailable or query failed
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// JSON (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Migration failure during store initialization
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;
