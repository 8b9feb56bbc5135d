//! Vault key pairs using X25519
//!
//! One long-term Curve25519 key serves both as the recipient key for value
//! encryption and as the signing key for ledger transactions.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::{CryptoRng, RngCore};
use x25519_dalek::{PublicKey, StaticSecret};

use crate::{CryptoError, CryptoResult};

/// Curve25519 key size
pub const KEY_SIZE: usize = 32;

/// Long-term vault key pair
#[derive(Clone)]
pub struct VaultKeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl VaultKeyPair {
    /// Generate a new key pair from a fresh 32-byte seed
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Derive the key pair for a seed. Clamping happens inside X25519.
    pub fn from_seed(seed: [u8; KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(seed);
        let public = PublicKey::from(&secret);
        VaultKeyPair { secret, public }
    }

    /// Load a configured key pair; the public half must match the secret
    pub fn from_base64(public_b64: &str, private_b64: &str) -> CryptoResult<Self> {
        let private = decode_key(private_b64, "private key")?;
        let public = decode_key(public_b64, "public key")?;

        let pair = Self::from_seed(private);
        if pair.public_bytes() != public {
            return Err(CryptoError::InvalidKey(
                "public key does not match private key".into(),
            ));
        }
        Ok(pair)
    }

    /// Get the secret key bytes
    pub fn secret_bytes(&self) -> [u8; KEY_SIZE] {
        self.secret.to_bytes()
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; KEY_SIZE] {
        self.public.to_bytes()
    }

    /// X25519 shared secret with another party's public key
    pub fn diffie_hellman(&self, their_public: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
        self.secret
            .diffie_hellman(&PublicKey::from(*their_public))
            .to_bytes()
    }
}

impl std::fmt::Debug for VaultKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKeyPair")
            .field("public", &STANDARD.encode(self.public_bytes()))
            .finish_non_exhaustive()
    }
}

/// Decode a base64 Curve25519 key
pub fn decode_key(b64: &str, field: &'static str) -> CryptoResult<[u8; KEY_SIZE]> {
    let bytes = STANDARD
        .decode(b64)
        .map_err(|_| CryptoError::InvalidBase64 { field })?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| CryptoError::InvalidKey(format!("{}: {} bytes", field, v.len())))
}
