//! Vault client configuration
//!
//! Loaded from a JSON file, then overridden by `VAULT_*` environment
//! variables:
//!
//! | variable                     | field                  |
//! |------------------------------|------------------------|
//! | `VAULT_URL`                  | `url`                  |
//! | `VAULT_NODE_ID`              | `node_id`              |
//! | `VAULT_TAG`                  | `tag`                  |
//! | `VAULT_PUBLIC_KEY`           | `public_key`           |
//! | `VAULT_PRIVATE_KEY`          | `private_key`          |
//! | `VAULT_WRITE_TIMEOUT`        | `write_timeout`        |
//! | `VAULT_LEDGER_ID`            | `ledger_id`            |
//! | `VAULT_EQUAL_VERSION_POLICY` | `equal_version_policy` |
//! | `VAULT_LOG_LEVEL`            | `logging.level`        |
//! | `VAULT_LOG_JSON`             | `logging.json_format`  |
//! | `VAULT_SEED_FILE`            | `seed_file`            |

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use vault_core::{VaultError, VaultIdentity, VaultResult, DATA_VAULT_LEDGER_ID};
use vault_crypto::VaultKeyPair;
use vault_state::EqualVersionPolicy;

use crate::{LogConfig, DEFAULT_WRITE_TIMEOUT};

/// Vault client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Ledger WebSocket endpoint
    pub url: String,
    pub node_id: String,
    pub tag: String,
    /// Base64 X25519 public key
    pub public_key: String,
    /// Base64 X25519 private key
    pub private_key: String,
    #[serde(with = "humantime_serde")]
    pub write_timeout: Duration,
    pub ledger_id: i8,
    pub equal_version_policy: EqualVersionPolicy,
    pub logging: LogConfig,
    /// JSON file of `key -> {value, version}` seeding the local replica
    pub seed_file: Option<PathBuf>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8686/datavault".to_string(),
            node_id: String::new(),
            tag: String::new(),
            public_key: String::new(),
            private_key: String::new(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            ledger_id: DATA_VAULT_LEDGER_ID,
            equal_version_policy: EqualVersionPolicy::default(),
            logging: LogConfig::default(),
            seed_file: None,
        }
    }
}

impl VaultConfig {
    /// Load from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> VaultResult<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> VaultResult<Self> {
        let config = Self::read_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> VaultResult<Self> {
        Self::load(None)
    }

    fn read_file(path: &Path) -> VaultResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VaultError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents)
            .map_err(|e| VaultError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Apply `VAULT_*` overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> VaultResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("VAULT_URL") {
            self.url = url;
        }
        if let Some(node_id) = lookup("VAULT_NODE_ID") {
            self.node_id = node_id;
        }
        if let Some(tag) = lookup("VAULT_TAG") {
            self.tag = tag;
        }
        if let Some(key) = lookup("VAULT_PUBLIC_KEY") {
            self.public_key = key;
        }
        if let Some(key) = lookup("VAULT_PRIVATE_KEY") {
            self.private_key = key;
        }
        if let Some(timeout) = lookup("VAULT_WRITE_TIMEOUT") {
            self.write_timeout = humantime::parse_duration(&timeout)
                .map_err(|e| VaultError::Config(format!("Invalid write timeout: {}", e)))?;
        }
        if let Some(id) = lookup("VAULT_LEDGER_ID") {
            self.ledger_id = id
                .parse()
                .map_err(|e| VaultError::Config(format!("Invalid ledger id: {}", e)))?;
        }
        if let Some(policy) = lookup("VAULT_EQUAL_VERSION_POLICY") {
            self.equal_version_policy = policy.parse().map_err(VaultError::Config)?;
        }
        if let Some(level) = lookup("VAULT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("VAULT_LOG_JSON") {
            self.logging.json_format = json
                .parse()
                .map_err(|e| VaultError::Config(format!("Invalid JSON flag: {}", e)))?;
        }
        if let Some(path) = lookup("VAULT_SEED_FILE") {
            self.seed_file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> VaultResult<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(VaultError::Config(format!(
                "url must be ws:// or wss://, got {}",
                self.url
            )));
        }
        if self.node_id.is_empty() || self.tag.is_empty() {
            return Err(VaultError::Config("node_id and tag are required".to_string()));
        }
        if self.write_timeout.is_zero() {
            return Err(VaultError::Config(
                "write_timeout must be greater than 0".to_string(),
            ));
        }
        self.key_pair()?;
        self.logging.validate()?;
        Ok(())
    }

    pub fn identity(&self) -> VaultIdentity {
        VaultIdentity::new(self.node_id.clone(), self.tag.clone())
    }

    /// Decode the configured key pair
    pub fn key_pair(&self) -> VaultResult<VaultKeyPair> {
        VaultKeyPair::from_base64(&self.public_key, &self.private_key)
            .map_err(|e| VaultError::Config(e.to_string()))
    }
}
