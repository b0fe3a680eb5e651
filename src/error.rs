//! Error types for Marryroute

use thiserror::Error;

/// Result type alias for Marryroute operations
pub type Result<T> = std::result::Result<T, MarryError>;

/// Main error type for Marryroute
#[derive(Error, Debug)]
pub enum MarryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarryError {
    /// True for faults the caller may retry (transient storage problems).
    pub fn is_retryable(&self) -> bool {
        matches!(self, MarryError::Database(_) | MarryError::Storage(_) | MarryError::Io(_))
    }
}
