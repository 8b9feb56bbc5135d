//! Ledger Vault Runtime - The ledger-backed replica and its surroundings
//!
//! This crate ties the lower layers together:
//! - `LedgerVault`, the `KeyData` store that talks to the ledger
//! - Client configuration from file and environment
//! - Logging setup for binaries
//! - The `sync` entry point used by the `vault-sync` binary

pub mod config;
pub mod ledger;
pub mod logging;
pub mod sync;

pub use config::*;
pub use ledger::*;
pub use logging::*;
pub use sync::*;
