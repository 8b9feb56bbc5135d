//! Ledger Vault Wire Format - Deterministic binary encoding
//!
//! This crate implements the encodings the ledger parses:
//! - Typed primitives (byte, byte array, long, string)
//! - Tagged either for the plaintext/encrypted value branch
//! - Composite field lists, concatenated in order
//! - Data-vault transactions, signature triples and wrapped messages
//!
//! All integers are big-endian. Encoding only: the ledger answers in JSON.

pub mod error;
pub mod field;
pub mod message;
pub mod primitives;
pub mod transaction;

pub use error::*;
pub use field::*;
pub use message::*;
pub use primitives::*;
pub use transaction::*;
