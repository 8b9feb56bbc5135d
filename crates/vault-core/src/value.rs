//! Replica values and write outcomes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::EncryptedEnvelope;

/// One key's value and version in a replica.
///
/// Value and version are always replaced together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValVer {
    pub value: String,
    pub version: u64,
}

impl ValVer {
    pub fn new(value: impl Into<String>, version: u64) -> Self {
        ValVer {
            value: value.into(),
            version,
        }
    }
}

/// Full contents of a replica, ordered by key
pub type Replica = BTreeMap<String, ValVer>;

/// A value as stored on the ledger: plaintext or an encrypted envelope
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VaultValue {
    Encrypted(EncryptedEnvelope),
    Plain(String),
}

impl VaultValue {
    /// Lift a plaintext that is itself a JSON-encoded envelope into
    /// `Encrypted`. The ledger returns envelopes in either form.
    pub fn normalize(self) -> Self {
        match self {
            VaultValue::Plain(s) if s.trim_start().starts_with('{') => {
                match serde_json::from_str::<EncryptedEnvelope>(&s) {
                    Ok(env) => VaultValue::Encrypted(env),
                    Err(_) => VaultValue::Plain(s),
                }
            }
            other => other,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, VaultValue::Encrypted(_))
    }
}

/// One entry of the ledger's `keys` response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub value: VaultValue,
    pub version: u64,
}

/// Acknowledged write
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSuccess {
    pub key: String,
    pub version: u64,
}

/// Terminal outcome of one `set` call. Never retried internally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateResult {
    Success(SetSuccess),
    Error(String),
}

impl UpdateResult {
    pub fn success(key: impl Into<String>, version: u64) -> Self {
        UpdateResult::Success(SetSuccess {
            key: key.into(),
            version,
        })
    }

    pub fn error(msg: impl ToString) -> Self {
        UpdateResult::Error(msg.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UpdateResult::Success(_))
    }
}
