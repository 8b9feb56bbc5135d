//! Ledger Vault Transport - Request/response over one persistent connection
//!
//! This crate provides:
//! - The `Transport` capability the vault stores are written against
//! - Ticket correlation of responses to outstanding requests
//! - A WebSocket implementation

pub mod protocol;
pub mod tickets;
pub mod ws;

pub use protocol::*;
pub use tickets::*;
pub use ws::*;

use async_trait::async_trait;
use serde_json::Value;

use vault_core::VaultResult;

/// Request/response channel to the ledger.
///
/// Both calls fail with `VaultError::NotConnected` unless the connection is
/// open. Neither applies a timeout; callers bound the wait themselves.
#[async_trait]
pub trait Transport: Send + Sync {
    /// JSON request `{type, ticket, data}`; resolves with the response `data`
    async fn send(&self, request_type: &str, data: Value) -> VaultResult<Value>;

    /// Binary request `[Long ticket] ++ payload`; resolves with the response
    /// `data` as a string
    async fn send_bin(&self, payload: &[u8]) -> VaultResult<String>;

    /// Whether requests can currently be sent
    fn is_open(&self) -> bool;
}
