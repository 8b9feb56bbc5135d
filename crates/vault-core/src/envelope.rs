//! Encrypted value envelope
//!
//! The envelope is what the hybrid scheme produces for one value and what the
//! ledger stores in place of the plaintext. Binary fields travel as standard
//! base64. `node_id` and `tag` are advisory routing metadata: nothing in the
//! scheme authenticates them.

use serde::{Deserialize, Serialize};

/// Ciphertext plus everything the recipient needs to rebuild the session key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    #[serde(rename = "encBase64")]
    ciphertext_b64: String,
    #[serde(rename = "iv")]
    iv_b64: String,
    #[serde(rename = "ephermalPubKey")]
    ephemeral_public_key_b64: String,
    #[serde(rename = "nodeId")]
    node_id: String,
    tag: String,
}

impl EncryptedEnvelope {
    pub fn new(
        ciphertext_b64: String,
        iv_b64: String,
        ephemeral_public_key_b64: String,
        node_id: String,
        tag: String,
    ) -> Self {
        EncryptedEnvelope {
            ciphertext_b64,
            iv_b64,
            ephemeral_public_key_b64,
            node_id,
            tag,
        }
    }

    pub fn ciphertext_b64(&self) -> &str {
        &self.ciphertext_b64
    }

    pub fn iv_b64(&self) -> &str {
        &self.iv_b64
    }

    pub fn ephemeral_public_key_b64(&self) -> &str {
        &self.ephemeral_public_key_b64
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}
