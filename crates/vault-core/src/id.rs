//! Identity types for the vault
//!
//! A vault is the key-value namespace partitioned by node identifier and tag
//! on the ledger.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the data-vault ledger in a wrapped message
pub const DATA_VAULT_LEDGER_ID: i8 = 80;

/// Vault partition: the sender's node id and tag
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultIdentity {
    pub node_id: String,
    pub tag: String,
}

impl VaultIdentity {
    pub fn new(node_id: impl Into<String>, tag: impl Into<String>) -> Self {
        VaultIdentity {
            node_id: node_id.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Debug for VaultIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vault({}/{})", self.node_id, self.tag)
    }
}

impl fmt::Display for VaultIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.node_id, self.tag)
    }
}
