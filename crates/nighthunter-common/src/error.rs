//! Error types for NightHunter.

use thiserror::Error;

/// Top-level error type for NightHunter operations.
#[derive(Debug, Error)]
pub enum NightHunterError {
    /// Catalog schema errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while checking a catalog's schema version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Version string could not be parsed
    #[error("Malformed schema version: {0:?}")]
    Malformed(String),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },
}

/// Result type alias for NightHunter operations.
pub type NightHunterResult<T> = Result<T, NightHunterError>;
