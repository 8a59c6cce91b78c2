//! OS keyring backend.
//!
//! Secrets are stored one entry per key in the platform credential store
//! (macOS Keychain, Windows Credential Manager, Secret Service on Linux)
//! under a fixed service name. Keyring calls block, so each one runs on
//! tokio's blocking pool.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Result, SecretError};
use crate::store::SecretStore;

/// Service namespace for all Courier entries.
pub const SERVICE_NAME: &str = "courier-cli";

/// Disposable key written and removed by the availability probe.
const PROBE_KEY: &str = "__courier_probe__";
const PROBE_VALUE: &str = "probe";

/// A [`SecretStore`] backed by the OS keyring.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Create a store using the default [`SERVICE_NAME`].
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Create a store under a custom service namespace.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Run a keyring operation for `key` on the blocking pool.
    async fn with_entry<T, F>(&self, key: &str, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(::keyring::Entry) -> Result<T> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let entry = ::keyring::Entry::new(&service, &key).map_err(|e| {
                SecretError::KeychainError(format!("failed to open keyring entry: {e}"))
            })?;
            op(entry)
        })
        .await
        .map_err(|e| SecretError::KeychainError(format!("keyring task failed: {e}")))?
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStore for KeyringStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(key, service = %self.service, "writing secret to keyring");
        let value = value.to_string();
        self.with_entry(key, move |entry| {
            entry
                .set_password(&value)
                .map_err(|e| SecretError::KeychainError(format!("keyring write failed: {e}")))
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<String> {
        debug!(key, service = %self.service, "reading secret from keyring");
        let name = key.to_string();
        self.with_entry(key, move |entry| match entry.get_password() {
            Ok(value) => Ok(value),
            Err(::keyring::Error::NoEntry) => Err(SecretError::NotFound(name)),
            Err(e) => Err(SecretError::KeychainError(format!(
                "keyring read failed: {e}"
            ))),
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        debug!(key, service = %self.service, "deleting secret from keyring");
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(::keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretError::KeychainError(format!(
                "keyring delete failed: {e}"
            ))),
        })
        .await
    }

    /// Probe by writing and removing a throwaway entry.
    ///
    /// A keyring can be installed yet unusable (headless Linux without a
    /// Secret Service daemon), so only a real round trip counts.
    async fn is_available(&self) -> bool {
        if let Err(e) = self.set(PROBE_KEY, PROBE_VALUE).await {
            debug!(error = %e, "keyring probe write failed");
            return false;
        }
        match self.delete(PROBE_KEY).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "keyring probe cleanup failed");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "system keyring"
    }
}
