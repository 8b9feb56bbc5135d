//! Data-vault transaction assembly
//!
//! Field order is fixed by the ledger's transaction parser:
//!
//! ```text
//! Long block_height | Byte cmd | String key | Long version | Either value | Long nonce
//! ```
//!
//! The value is `Left(String)` for plaintext and `Right(ByteArray)` for an
//! encrypted envelope, where the byte array holds the serialized envelope
//! fields.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use vault_core::{Command, EncryptedEnvelope, VaultValue};

use crate::{serialize, Byte, ByteArray, Either, Field, Long, WireError, WireResult, WireString};

/// Encoded value branch of a transaction
pub type TxValue = Either<WireString, ByteArray>;

/// Envelope fields in ledger order. The ephemeral key travels as raw bytes.
pub fn envelope_fields(env: &EncryptedEnvelope) -> WireResult<Vec<Field>> {
    let ephemeral = STANDARD
        .decode(env.ephemeral_public_key_b64())
        .map_err(|e| WireError::MalformedEnvelope(format!("ephemeral key: {}", e)))?;

    Ok(vec![
        Field::text(env.ciphertext_b64())?,
        Field::text(env.iv_b64())?,
        Field::ByteArray(ByteArray::new(ephemeral)?),
        Field::text(env.node_id())?,
        Field::text(env.tag())?,
    ])
}

/// Serialized envelope wrapped as a single byte array
pub fn encode_envelope(env: &EncryptedEnvelope) -> WireResult<ByteArray> {
    ByteArray::new(serialize(&envelope_fields(env)?))
}

/// Map a vault value onto the transaction's either branch
pub fn tx_value(value: &VaultValue) -> WireResult<TxValue> {
    match value {
        VaultValue::Plain(s) => Ok(Either::Left(WireString::new(s.as_str())?)),
        VaultValue::Encrypted(env) => Ok(Either::Right(encode_envelope(env)?)),
    }
}

/// Ledger update transaction. Transient: built, signed and sent by one `set`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataVaultTx {
    pub block_height: i64,
    pub cmd: Command,
    pub key: String,
    pub version: u64,
    pub value: VaultValue,
    /// Distinguishes structurally identical transactions
    pub nonce: i64,
}

impl DataVaultTx {
    /// Typed fields in ledger order
    pub fn fields(&self) -> WireResult<Vec<Field>> {
        let mut fields = vec![
            Field::Long(Long::new(self.block_height)),
            Field::Byte(Byte::from(self.cmd.code())),
            Field::text(&self.key)?,
            Field::Long(Long::from_u64(self.version)?),
        ];
        fields.extend(tx_value(&self.value)?.into_fields());
        fields.push(Field::Long(Long::new(self.nonce)));
        Ok(fields)
    }

    /// Bytes that get hashed, signed and shipped
    pub fn to_bytes(&self) -> WireResult<Bytes> {
        Ok(serialize(&self.fields()?))
    }
}

/// Encode a transaction from its parts
pub fn build_transaction(
    cmd: Command,
    key: &str,
    version: u64,
    block_height: i64,
    value: VaultValue,
    nonce: i64,
) -> WireResult<Bytes> {
    DataVaultTx {
        block_height,
        cmd,
        key: key.to_string(),
        version,
        value,
        nonce,
    }
    .to_bytes()
}
