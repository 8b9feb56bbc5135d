//! Ledger Vault Core - Fundamental types shared by every layer
//!
//! This crate defines the data model of the vault client:
//! - Vault identity (node id + tag partition)
//! - Replica values (`ValVer`) and the plaintext/encrypted value union
//! - Encrypted envelopes as carried on the ledger
//! - Update outcomes and ledger command codes
//! - The client-wide error type

pub mod command;
pub mod envelope;
pub mod error;
pub mod id;
pub mod value;

pub use command::*;
pub use envelope::*;
pub use error::*;
pub use id::*;
pub use value::*;
