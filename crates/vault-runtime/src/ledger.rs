//! Ledger-backed vault replica
//!
//! Reads list the vault partition and decrypt every envelope with the vault's
//! own key. Writes go through the full transaction path:
//!
//! 1. Fetch the current block height
//! 2. Encrypt the value to the vault's own public key
//! 3. Assemble the `Upsert` transaction with a random nonce
//! 4. Sign it and wrap it for the data-vault ledger
//! 5. Send it and wait for the acknowledgement
//!
//! The write timeout bounds all five steps together.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use serde_json::Value;

use vault_core::{
    Command, LedgerEntry, Replica, SetSuccess, UpdateResult, ValVer, VaultError, VaultIdentity,
    VaultResult, VaultValue, DATA_VAULT_LEDGER_ID,
};
use vault_crypto::{decrypt, sign_transaction, HybridCipher, VaultKeyPair};
use vault_state::KeyData;
use vault_transport::Transport;
use vault_wire::{build_transaction, wrap};

use crate::VaultConfig;

/// Default bound on a single write round-trip
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(8);

/// Request type for the current block height
pub const BLOCK_HEIGHT_REQUEST: &str = "blockheight";

/// Request type for the vault partition's entries
pub const KEYS_REQUEST: &str = "keys";

/// The vault replica held by the ledger
pub struct LedgerVault<T, R = StdRng> {
    transport: T,
    keys: VaultKeyPair,
    identity: VaultIdentity,
    ledger_id: i8,
    write_timeout: Duration,
    /// Seeds, IVs and nonces
    rng: Mutex<R>,
}

impl<T: Transport> LedgerVault<T> {
    pub fn new(transport: T, keys: VaultKeyPair, identity: VaultIdentity) -> Self {
        Self::with_rng(transport, keys, identity, StdRng::from_entropy())
    }

    /// Build from a validated configuration
    pub fn from_config(config: &VaultConfig, transport: T) -> VaultResult<Self> {
        Ok(Self::new(transport, config.key_pair()?, config.identity())
            .with_ledger_id(config.ledger_id)
            .with_write_timeout(config.write_timeout))
    }
}

impl<T, R> LedgerVault<T, R>
where
    T: Transport,
    R: RngCore + CryptoRng + Send,
{
    pub fn with_rng(transport: T, keys: VaultKeyPair, identity: VaultIdentity, rng: R) -> Self {
        LedgerVault {
            transport,
            keys,
            identity,
            ledger_id: DATA_VAULT_LEDGER_ID,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_ledger_id(mut self, ledger_id: i8) -> Self {
        self.ledger_id = ledger_id;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn identity(&self) -> &VaultIdentity {
        &self.identity
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encrypt, assemble, sign and wrap one `Upsert`
    pub fn prepare_upsert(
        &self,
        key: &str,
        value: &str,
        version: u64,
        block_height: i64,
    ) -> VaultResult<Bytes> {
        let (envelope, nonce) = {
            let mut rng = self.rng.lock();
            let nonce: i64 = rng.gen();
            let envelope = HybridCipher::new(&mut *rng, self.identity.clone())
                .encrypt(value, &self.keys.public_bytes());
            (envelope, nonce)
        };

        let tx = build_transaction(
            Command::Upsert,
            key,
            version,
            block_height,
            VaultValue::Encrypted(envelope),
            nonce,
        )?;
        let sigs = sign_transaction(&self.keys, &self.identity, &tx)?;
        Ok(wrap(self.ledger_id, &sigs, &tx))
    }

    async fn block_height(&self) -> VaultResult<i64> {
        let data = self
            .transport
            .send(BLOCK_HEIGHT_REQUEST, Value::String(String::new()))
            .await?;
        parse_block_height(&data)
    }

    /// Full write, bounded as a whole by the write timeout
    async fn write(&self, key: &str, value: &str, version: u64) -> VaultResult<SetSuccess> {
        tokio::time::timeout(self.write_timeout, self.submit(key, value, version))
            .await
            .map_err(|_| VaultError::Timeout(duration_ms(self.write_timeout)))?
    }

    async fn submit(&self, key: &str, value: &str, version: u64) -> VaultResult<SetSuccess> {
        let block_height = self.block_height().await?;
        tracing::debug!(key, version, block_height, "preparing upsert");
        let message = self.prepare_upsert(key, value, version, block_height)?;

        let response = self.transport.send_bin(&message).await?;

        serde_json::from_str::<SetSuccess>(&response)
            .map_err(|_| VaultError::Protocol(format!("unexpected write response: {}", response)))
    }

    /// Envelope objects must decrypt. A string that merely parses as an
    /// envelope is kept as plaintext when it does not open with our key.
    fn decrypt_entry(&self, key: &str, entry: LedgerEntry) -> VaultResult<ValVer> {
        let value = match entry.value {
            VaultValue::Encrypted(envelope) => decrypt(&envelope, &self.keys).map_err(|e| {
                tracing::warn!(key, "failed to decrypt vault entry: {}", e);
                e
            })?,
            VaultValue::Plain(text) => match VaultValue::Plain(text.clone()).normalize() {
                VaultValue::Encrypted(envelope) => match decrypt(&envelope, &self.keys) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::debug!(key, "envelope-shaped string kept as plaintext: {}", e);
                        text
                    }
                },
                VaultValue::Plain(_) => text,
            },
        };
        Ok(ValVer::new(value, entry.version))
    }
}

#[async_trait]
impl<T, R> KeyData for LedgerVault<T, R>
where
    T: Transport,
    R: RngCore + CryptoRng + Send,
{
    async fn keys(&self) -> VaultResult<Replica> {
        let data = self
            .transport
            .send(KEYS_REQUEST, Value::String(self.identity.node_id.clone()))
            .await?;

        let entries: BTreeMap<String, LedgerEntry> = match data {
            Value::Null => BTreeMap::new(),
            Value::String(text) => serde_json::from_str(&text)?,
            other => serde_json::from_value(other)?,
        };

        let replica = entries
            .into_iter()
            .map(|(key, entry)| {
                let valver = self.decrypt_entry(&key, entry)?;
                Ok::<_, VaultError>((key, valver))
            })
            .collect::<VaultResult<Replica>>()?;

        tracing::debug!(vault = %self.identity, entries = replica.len(), "listed ledger vault");
        Ok(replica)
    }

    async fn set(&self, key: &str, value: &str, version: u64) -> UpdateResult {
        match self.write(key, value, version).await {
            Ok(success) => {
                tracing::info!(key = %success.key, version = success.version, "ledger write accepted");
                UpdateResult::Success(success)
            }
            Err(e) => {
                tracing::warn!(key, version, "ledger write failed: {}", e);
                UpdateResult::error(e)
            }
        }
    }
}

fn parse_block_height(data: &Value) -> VaultResult<i64> {
    let height = match data {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    height.ok_or_else(|| VaultError::Protocol(format!("invalid block height: {}", data)))
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
