//! Error types for the vault client

use thiserror::Error;

/// Client-wide vault errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    // Transport errors
    #[error("Connection is not open")]
    NotConnected,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    // Ledger protocol errors
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid JSON: {0}")]
    Json(String),

    // Layer errors, flattened to strings at the vault boundary
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for VaultError {
    fn from(e: serde_json::Error) -> Self {
        VaultError::Json(e.to_string())
    }
}

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;
