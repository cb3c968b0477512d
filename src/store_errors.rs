//! # Store Error Types Module
//!
//! Error types for the response store. "Not found" is never an error here:
//! lookups return `Option` for that, so every variant below is a genuine
//! backend or input fault.

/// Custom error types for response store operations
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Backend unreachable (pool exhausted, network, TLS)
    Connection(String),
    /// Query rejected or failed on the backend
    Query(String),
    /// Operation exceeded the configured store timeout
    Timeout(String),
    /// Malformed collection or document path
    InvalidPath(String),
    /// Stored fields could not be encoded or decoded
    Serialization(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "Connection error: {msg}"),
            StoreError::Query(msg) => write!(f, "Query error: {msg}"),
            StoreError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            StoreError::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            StoreError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Connection(err.to_string()),
            sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => {
                StoreError::Serialization(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
