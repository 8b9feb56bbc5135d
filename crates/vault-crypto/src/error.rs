//! Cryptographic and decoding errors

use thiserror::Error;

use vault_core::VaultError;
use vault_wire::WireError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid base64 in {field}")]
    InvalidBase64 { field: &'static str },

    #[error("Invalid IV length: {0}")]
    InvalidIv(usize),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Decrypted value is not UTF-8")]
    InvalidUtf8,

    #[error(transparent)]
    Encoding(#[from] WireError),
}

impl From<CryptoError> for VaultError {
    fn from(e: CryptoError) -> Self {
        VaultError::Crypto(e.to_string())
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;
