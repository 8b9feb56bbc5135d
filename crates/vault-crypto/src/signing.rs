//! Transaction signing
//!
//! The ledger checks `signature = Sign(sk, Keccak-256(tx_bytes))` against the
//! sender's public key, looked up by the node id and tag that travel with it.

use vault_core::VaultIdentity;
use vault_wire::SignatureTriple;

use crate::{keccak256, xeddsa_sign, xeddsa_verify, CryptoResult, VaultKeyPair, SIGNATURE_SIZE};

/// Sign encoded transaction bytes and build the signature triple
pub fn sign_transaction(
    keys: &VaultKeyPair,
    identity: &VaultIdentity,
    tx_bytes: &[u8],
) -> CryptoResult<SignatureTriple> {
    let hash = keccak256(tx_bytes);
    let signature = xeddsa_sign(&keys.secret_bytes(), &hash);
    tracing::trace!(vault = %identity, tx_len = tx_bytes.len(), "signed transaction");
    Ok(SignatureTriple::new(
        &identity.node_id,
        &identity.tag,
        &signature,
    )?)
}

/// Check a signature triple against a public key
pub fn verify_transaction(public: &[u8; 32], tx_bytes: &[u8], sigs: &SignatureTriple) -> bool {
    let Ok(signature) = <[u8; SIGNATURE_SIZE]>::try_from(sigs.signature()) else {
        return false;
    };
    xeddsa_verify(public, &keccak256(tx_bytes), &signature)
}
