//! Signed message framing
//!
//! Wire payload of a write:
//!
//! ```text
//! Byte ledger_id | ByteArray node_id | ByteArray tag | ByteArray signature | tx bytes
//! ```
//!
//! The transport then prefixes a `Long` ticket to correlate the response.

use bytes::Bytes;

use crate::{serialize, Byte, ByteArray, Field, Long, WireResult};

/// Sender node id, tag and signature over the transaction hash
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureTriple {
    node_id: ByteArray,
    tag: ByteArray,
    signature: ByteArray,
}

impl SignatureTriple {
    pub fn new(node_id: &str, tag: &str, signature: &[u8]) -> WireResult<Self> {
        Ok(SignatureTriple {
            node_id: ByteArray::new(node_id.as_bytes().to_vec())?,
            tag: ByteArray::new(tag.as_bytes().to_vec())?,
            signature: ByteArray::new(signature.to_vec())?,
        })
    }

    pub fn signature(&self) -> &[u8] {
        self.signature.as_bytes()
    }

    pub fn fields(&self) -> Vec<Field> {
        vec![
            Field::ByteArray(self.node_id.clone()),
            Field::ByteArray(self.tag.clone()),
            Field::ByteArray(self.signature.clone()),
        ]
    }
}

/// Final byte payload for a ledger write
pub fn wrap(ledger_id: i8, sigs: &SignatureTriple, tx_bytes: &[u8]) -> Bytes {
    let mut fields = Vec::with_capacity(5);
    fields.push(Field::Byte(Byte::from(ledger_id)));
    fields.extend(sigs.fields());
    fields.push(Field::raw(tx_bytes.to_vec()));
    serialize(&fields)
}

/// Transport frame for a binary request: ticket then payload
pub fn ticket_frame(ticket: i64, payload: &[u8]) -> Bytes {
    serialize(&[Field::Long(Long::new(ticket)), Field::raw(payload.to_vec())])
}
