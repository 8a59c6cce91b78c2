//! Backend selection and file-to-keyring migration.
//!
//! Selection runs once per process. The OS keyring is preferred whenever it
//! works. A tool first configured where only the encrypted file was usable
//! (a sandbox, a headless box) has its credentials copied into the keyring
//! the first time it runs somewhere the keyring works, without re-login.

use std::path::PathBuf;
use std::sync::Arc;

use courier_core::env::{self, vars};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::keys;
use crate::native::KeyringStore;
use crate::store::{EncryptedFileStore, SecretStore};

/// Optional keys copied during migration, after the required `api_key`.
const MIGRATED_KEYS: &[&str] = &[
    keys::CLIENT_ID,
    keys::CLIENT_SECRET,
    keys::GRANTS,
    keys::DEFAULT_GRANT,
];

/// Inputs to backend selection.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Directory holding `.secrets.enc`.
    pub config_dir: PathBuf,
    /// Skip the keyring entirely and use the encrypted file.
    pub disable_keyring: bool,
}

impl BackendConfig {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            disable_keyring: false,
        }
    }

    /// Build a config, reading `COURIER_DISABLE_KEYRING` from the environment.
    pub fn from_env(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            disable_keyring: env::get_bool(vars::COURIER_DISABLE_KEYRING),
        }
    }

    pub fn with_keyring_disabled(mut self, disabled: bool) -> Self {
        self.disable_keyring = disabled;
        self
    }
}

/// Pick the secret backend for this process using the OS keyring.
pub async fn select_backend(config: &BackendConfig) -> Result<Arc<dyn SecretStore>> {
    select_backend_with(config, Arc::new(KeyringStore::new())).await
}

/// Pick between `native` and the encrypted file store in `config.config_dir`.
///
/// 1. Keyring disabled by config: encrypted file.
/// 2. Native probe fails: encrypted file.
/// 3. Native already holds an API key, or reading it fails: native.
/// 4. Encrypted file cannot be opened: native (fresh setup).
/// 5. Encrypted file holds no API key: native (fresh setup).
/// 6. Otherwise migrate file to native and return native.
pub async fn select_backend_with(
    config: &BackendConfig,
    native: Arc<dyn SecretStore>,
) -> Result<Arc<dyn SecretStore>> {
    if config.disable_keyring {
        info!("keyring disabled by configuration; using encrypted file store");
        return open_file_store(config).await;
    }

    if !native.is_available().await {
        info!("{} unavailable; using encrypted file store", native.name());
        return open_file_store(config).await;
    }

    match native.get_optional(keys::API_KEY).await {
        Ok(Some(api_key)) if !api_key.is_empty() => {
            debug!("{} already holds credentials", native.name());
            return Ok(native);
        }
        Ok(_) => {}
        Err(e) => {
            // An entry may exist but be unreadable; migrating could overwrite it.
            warn!(
                error = %e,
                "could not read API key from {}; skipping migration",
                native.name()
            );
            return Ok(native);
        }
    }

    let file = match EncryptedFileStore::open(&config.config_dir).await {
        Ok(file) => file,
        Err(e) => {
            debug!(error = %e, "encrypted file store unavailable; starting fresh in {}", native.name());
            return Ok(native);
        }
    };

    let api_key = match file.get_optional(keys::API_KEY).await {
        Ok(Some(api_key)) if !api_key.is_empty() => api_key,
        Ok(_) => {
            debug!("no credentials to migrate; starting fresh in {}", native.name());
            return Ok(native);
        }
        Err(e) => {
            warn!(error = %e, "could not read encrypted file store; starting fresh in {}", native.name());
            return Ok(native);
        }
    };

    let file: Arc<dyn SecretStore> = Arc::new(file);
    match migrate(file.as_ref(), native.as_ref(), &api_key).await {
        Ok(()) => Ok(native),
        Err(e) => {
            warn!(error = %e, "migration to {} failed; staying on {}", native.name(), file.name());
            Ok(file)
        }
    }
}

async fn open_file_store(config: &BackendConfig) -> Result<Arc<dyn SecretStore>> {
    let store = EncryptedFileStore::open(&config.config_dir).await?;
    Ok(Arc::new(store))
}

/// Copy credentials from `from` into `to`.
///
/// The API key must copy; each optional key is copied only when present and
/// non-empty, and a failure on one does not stop the rest.
async fn migrate(from: &dyn SecretStore, to: &dyn SecretStore, api_key: &str) -> Result<()> {
    info!("migrating credentials from {} to {}", from.name(), to.name());

    to.set(keys::API_KEY, api_key).await?;

    for &key in MIGRATED_KEYS {
        match from.get_optional(key).await {
            Ok(Some(value)) if !value.is_empty() => {
                if let Err(e) = to.set(key, &value).await {
                    warn!(key, error = %e, "failed to migrate secret");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(key, error = %e, "failed to read secret for migration"),
        }
    }

    Ok(())
}
