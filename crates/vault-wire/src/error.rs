//! Encoding errors

use thiserror::Error;

use vault_core::VaultError;

/// Errors raised while building an encoding. Fatal to the single call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("{what} out of range: {value} not in [{min}, {max}]")]
    Range {
        what: &'static str,
        value: i128,
        min: i128,
        max: i128,
    },

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),
}

impl WireError {
    pub(crate) fn range(what: &'static str, value: i128, min: i128, max: i128) -> Self {
        WireError::Range {
            what,
            value,
            min,
            max,
        }
    }
}

impl From<WireError> for VaultError {
    fn from(e: WireError) -> Self {
        VaultError::Encoding(e.to_string())
    }
}

/// Result type for encoding operations
pub type WireResult<T> = Result<T, WireError>;
