//! Session cipher: AES-256-CBC with PKCS#7 padding
//!
//! CBC gives confidentiality only. There is no authentication tag, so a
//! modified ciphertext can decrypt to different plaintext instead of failing;
//! only a padding or UTF-8 failure is detectable.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use sha3::{Digest, Keccak256};

use crate::{CryptoError, CryptoResult};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Session key size
pub const SESSION_KEY_SIZE: usize = 32;

/// IV size (one AES block)
pub const IV_SIZE: usize = 16;

/// Keccak-256 digest
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// Session key for a key-agreement shared secret
pub fn derive_session_key(shared_secret: &[u8]) -> [u8; SESSION_KEY_SIZE] {
    keccak256(shared_secret)
}

/// AES-256-CBC cipher bound to one session key
pub struct SessionCipher {
    key: [u8; SESSION_KEY_SIZE],
}

impl SessionCipher {
    pub fn new(key: &[u8; SESSION_KEY_SIZE]) -> Self {
        SessionCipher { key: *key }
    }

    pub fn encrypt(&self, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
        Aes256CbcEnc::new(&self.key.into(), &(*iv).into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    pub fn decrypt(&self, iv: &[u8; IV_SIZE], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        Aes256CbcDec::new(&self.key.into(), &(*iv).into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}
