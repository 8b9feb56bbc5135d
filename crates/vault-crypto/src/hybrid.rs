//! Per-value hybrid encryption
//!
//! Each value gets its own ephemeral X25519 key pair and IV:
//!
//! 1. 32-byte random seed -> ephemeral key pair
//! 2. X25519(ephemeral secret, recipient public) -> shared secret
//! 3. Keccak-256(shared secret) -> AES-256 session key
//! 4. 16-byte random IV
//! 5. AES-256-CBC over the UTF-8 plaintext
//!
//! The envelope's node id and tag are copied from the sender identity and are
//! not authenticated. CBC carries no integrity tag, so tampering is only
//! caught when it breaks the padding or the UTF-8 decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::{CryptoRng, RngCore};

use vault_core::{EncryptedEnvelope, VaultIdentity};

use crate::{
    decode_key, derive_session_key, CryptoError, CryptoResult, SessionCipher, VaultKeyPair,
    IV_SIZE, KEY_SIZE,
};

/// Encrypts values for a recipient key. The random source is injected so
/// tests can run with a seeded generator.
pub struct HybridCipher<R> {
    rng: R,
    identity: VaultIdentity,
}

impl<R: RngCore + CryptoRng> HybridCipher<R> {
    pub fn new(rng: R, identity: VaultIdentity) -> Self {
        HybridCipher { rng, identity }
    }

    pub fn identity(&self) -> &VaultIdentity {
        &self.identity
    }

    /// Encrypt `plaintext` to `recipient_public`.
    ///
    /// Draws a fresh seed and a fresh IV on every call.
    pub fn encrypt(
        &mut self,
        plaintext: &str,
        recipient_public: &[u8; KEY_SIZE],
    ) -> EncryptedEnvelope {
        let ephemeral = VaultKeyPair::generate(&mut self.rng);
        let shared = ephemeral.diffie_hellman(recipient_public);
        let session_key = derive_session_key(&shared);

        let mut iv = [0u8; IV_SIZE];
        self.rng.fill_bytes(&mut iv);

        let ciphertext = SessionCipher::new(&session_key).encrypt(&iv, plaintext.as_bytes());

        EncryptedEnvelope::new(
            STANDARD.encode(ciphertext),
            STANDARD.encode(iv),
            STANDARD.encode(ephemeral.public_bytes()),
            self.identity.node_id.clone(),
            self.identity.tag.clone(),
        )
    }
}

/// Decrypt an envelope addressed to `own` key pair
pub fn decrypt(envelope: &EncryptedEnvelope, own: &VaultKeyPair) -> CryptoResult<String> {
    let ciphertext = STANDARD
        .decode(envelope.ciphertext_b64())
        .map_err(|_| CryptoError::InvalidBase64 { field: "ciphertext" })?;
    let iv_bytes = STANDARD
        .decode(envelope.iv_b64())
        .map_err(|_| CryptoError::InvalidBase64 { field: "iv" })?;
    let iv: [u8; IV_SIZE] = iv_bytes
        .try_into()
        .map_err(|v: Vec<u8>| CryptoError::InvalidIv(v.len()))?;
    let ephemeral_public = decode_key(envelope.ephemeral_public_key_b64(), "ephemeral key")?;

    let shared = own.diffie_hellman(&ephemeral_public);
    let session_key = derive_session_key(&shared);
    let plaintext = SessionCipher::new(&session_key).decrypt(&iv, &ciphertext)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
}
