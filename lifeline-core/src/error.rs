//! Error types for LIFELINE operations

use thiserror::Error;

/// Connection-level errors. Retryable up to the configured attempt bound.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Failed to create client: {reason}")]
    ClientCreation { reason: String },

    #[error("Probe failed: {reason}")]
    ProbeFailed { reason: String },

    #[error("Connection attempts exhausted after {attempts} tries: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("No live connection available")]
    NotConnected,
}

/// Deadline errors. Treated exactly like a [`ConnectionError`] by the retry loop.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimeoutError {
    #[error("Probe timed out after {after_ms}ms")]
    Probe { after_ms: u64 },

    #[error("Client creation timed out after {after_ms}ms")]
    ClientCreation { after_ms: u64 },
}

/// A query callback failed on an otherwise healthy client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Query failed: {reason}")]
    Failed { reason: String },
}

/// Cache-tier errors. The offline store recovers from all of these locally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },

    #[error("Serialization failed for {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Deserialization failed for {key}: {reason}")]
    Deserialization { key: String, reason: String },
}

impl StorageError {
    /// True when the persistent tier ran out of space.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config: {reason}")]
    Parse { reason: String },
}

/// Master error type for all LIFELINE errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifelineError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Timeout error: {0}")]
    Timeout(#[from] TimeoutError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl LifelineError {
    /// Shorthand for wrapping a failed query callback.
    pub fn query(reason: impl Into<String>) -> Self {
        LifelineError::Query(QueryError::Failed {
            reason: reason.into(),
        })
    }

    /// Connection and timeout errors count against the retry budget; nothing else does.
    pub fn is_connection_level(&self) -> bool {
        matches!(self, LifelineError::Connection(_) | LifelineError::Timeout(_))
    }
}

/// Result type alias for LIFELINE operations.
pub type LifelineResult<T> = Result<T, LifelineError>;
