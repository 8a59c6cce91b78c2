//! Error types for credential and grant storage.

use thiserror::Error;

/// Errors that can occur during secret and grant operations.
///
/// Variants fall into two families: "absent" ([`NotFound`], [`GrantNotFound`],
/// [`NoDefaultGrant`], [`NotConfigured`]) which callers branch on routinely,
/// and store failures, which mean the backend itself is broken.
///
/// [`NotFound`]: SecretError::NotFound
/// [`GrantNotFound`]: SecretError::GrantNotFound
/// [`NoDefaultGrant`]: SecretError::NoDefaultGrant
/// [`NotConfigured`]: SecretError::NotConfigured
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Grant not found: {0}")]
    GrantNotFound(String),

    #[error("No default grant configured")]
    NoDefaultGrant,

    #[error("No API key configured; run `courier auth config` to set up credentials")]
    NotConfigured,

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Keyring error: {0}")]
    KeychainError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SecretError {
    /// True for the plain key-absent signal from a backend.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True when the store itself failed (I/O, crypto, keyring, corrupt data).
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::DecryptionFailed(_)
                | Self::EncryptionFailed(_)
                | Self::KeychainError(_)
                | Self::StorageError(_)
                | Self::Io(_)
                | Self::Json(_)
        )
    }
}

/// Convenience result alias for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;
