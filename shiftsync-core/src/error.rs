//! Error types for shiftsync operations.

use thiserror::Error;

/// Errors that can occur while reconciling shifts.
#[derive(Error, Debug)]
pub enum ShiftSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid time span: {0}")]
    InvalidSpan(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("State error: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for shiftsync operations.
pub type ShiftSyncResult<T> = Result<T, ShiftSyncError>;
