//! Ledger Vault Crypto - Value encryption and transaction signing
//!
//! Provides the cryptographic side of a vault write:
//! - Vault key pairs (X25519)
//! - Keccak-256 session key derivation
//! - AES-256-CBC session cipher
//! - Per-value hybrid encryption with ephemeral keys
//! - XEdDSA-style signatures with the same Curve25519 key

pub mod cipher;
pub mod error;
pub mod hybrid;
pub mod keys;
pub mod signing;
pub mod xeddsa;

pub use cipher::*;
pub use error::*;
pub use hybrid::*;
pub use keys::*;
pub use signing::*;
pub use xeddsa::*;
