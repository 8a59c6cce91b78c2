//! AES-256-GCM encryption with a machine-derived key.
//!
//! The key is SHA-256 over the machine identity seed followed by a fixed
//! salt, so it can be re-derived on every run without being stored. A fresh
//! random nonce is prepended to each ciphertext and the whole blob is
//! base64-encoded for storage as text.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{Result, SecretError};

const NONCE_SIZE: usize = 12;

/// Length in bytes of the symmetric key.
pub const KEY_SIZE: usize = 32;

/// Application salt appended to the identity seed before hashing.
const KEY_DERIVATION_SALT: &[u8] = b"courier-cli-secrets-v1";

/// Derive the 256-bit file key from a machine identity seed.
///
/// Pure and deterministic: the same seed always yields the same key.
pub fn derive_key(seed: &[u8]) -> [u8; KEY_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(KEY_DERIVATION_SALT);
    hasher.finalize().into()
}

/// Encrypt `plaintext`, returning `base64(nonce || ciphertext_with_tag)`.
pub fn encrypt(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<String> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| SecretError::EncryptionFailed(e.to_string()))?;

    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| SecretError::EncryptionFailed(e.to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(blob))
}

/// Decrypt a blob previously produced by [`encrypt`].
///
/// Malformed base64, a truncated blob, a wrong key and tampered data all
/// fail with [`SecretError::DecryptionFailed`].
pub fn decrypt(key: &[u8; KEY_SIZE], blob: &str) -> Result<Vec<u8>> {
    let raw = STANDARD
        .decode(blob.trim())
        .map_err(|e| SecretError::DecryptionFailed(format!("base64 decode failed: {e}")))?;

    if raw.len() < NONCE_SIZE {
        return Err(SecretError::DecryptionFailed(
            "ciphertext too short".to_string(),
        ));
    }

    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| SecretError::DecryptionFailed(e.to_string()))?;

    let nonce = Nonce::from_slice(nonce_bytes);
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| SecretError::DecryptionFailed(e.to_string()))
}
