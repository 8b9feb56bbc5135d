//! Ed25519-style signatures made with an X25519 secret key
//!
//! The ledger verifies signatures against the vault's Curve25519 (Montgomery)
//! public key. Signing maps the clamped X25519 scalar onto the Edwards curve
//! and signs as Ed25519 would, with a deterministic nonce
//! `r = SHA-512(a || m)`. The Montgomery key does not carry the sign of the
//! Edwards x-coordinate, so the signer stores that bit in the top bit of the
//! last signature byte (always free, since `S < L < 2^253`).

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};

use crate::KEY_SIZE;

/// Signature size
pub const SIGNATURE_SIZE: usize = 64;

const SIGN_BIT: u8 = 0x80;

fn clamp(mut k: [u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
    k[0] &= 248;
    k[31] &= 127;
    k[31] |= 64;
    k
}

fn hash_to_scalar(parts: &[&[u8]]) -> Scalar {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&hasher.finalize());
    Scalar::from_bytes_mod_order_wide(&wide)
}

/// Sign `message` with an X25519 secret key
pub fn xeddsa_sign(secret: &[u8; KEY_SIZE], message: &[u8]) -> [u8; SIGNATURE_SIZE] {
    let a_bytes = clamp(*secret);
    let a = Scalar::from_bytes_mod_order(a_bytes);
    let public = EdwardsPoint::mul_base(&a).compress();
    let sign_bit = public.as_bytes()[31] & SIGN_BIT;

    let r = hash_to_scalar(&[&a_bytes[..], message]);
    let big_r = EdwardsPoint::mul_base(&r).compress();
    let h = hash_to_scalar(&[&big_r.as_bytes()[..], &public.as_bytes()[..], message]);
    let s = r + h * a;

    let mut signature = [0u8; SIGNATURE_SIZE];
    signature[..32].copy_from_slice(big_r.as_bytes());
    signature[32..].copy_from_slice(s.as_bytes());
    signature[63] |= sign_bit;
    signature
}

/// Verify a signature against an X25519 public key
pub fn xeddsa_verify(
    public: &[u8; KEY_SIZE],
    message: &[u8],
    signature: &[u8; SIGNATURE_SIZE],
) -> bool {
    let sign = (signature[63] & SIGN_BIT) >> 7;
    let Some(a_point) = MontgomeryPoint(*public).to_edwards(sign) else {
        return false;
    };

    let mut r_bytes = [0u8; 32];
    r_bytes.copy_from_slice(&signature[..32]);
    let Some(big_r) = CompressedEdwardsY(r_bytes).decompress() else {
        return false;
    };

    let mut s_bytes = [0u8; 32];
    s_bytes.copy_from_slice(&signature[32..]);
    s_bytes[31] &= !SIGN_BIT;
    let s: Option<Scalar> = Scalar::from_canonical_bytes(s_bytes).into();
    let Some(s) = s else {
        return false;
    };

    let a_compressed = a_point.compress();
    let h = hash_to_scalar(&[&r_bytes[..], &a_compressed.as_bytes()[..], message]);
    EdwardsPoint::mul_base(&s) == big_r + h * a_point
}
