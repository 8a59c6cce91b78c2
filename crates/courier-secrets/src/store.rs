//! Secret storage backends.
//!
//! Defines the [`SecretStore`] trait and provides [`EncryptedFileStore`], a
//! backend that keeps every secret in a single AES-256-GCM encrypted file
//! (`.secrets.enc`) under the configuration directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_SIZE};
use crate::error::{Result, SecretError};
use crate::identity;

/// File name of the encrypted secrets blob inside the config directory.
pub const SECRETS_FILE_NAME: &str = ".secrets.enc";

/// Async trait for secret storage backends.
///
/// Exactly two implementations exist: [`EncryptedFileStore`] and
/// [`crate::native::KeyringStore`]. Callers obtain one through
/// [`crate::selector::select_backend`] and never branch on the concrete type.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve the value for `key`.
    ///
    /// Returns [`SecretError::NotFound`] when the key has never been set or
    /// was deleted.
    async fn get(&self, key: &str) -> Result<String>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Whether the backend is usable right now.
    async fn is_available(&self) -> bool;

    /// Human-readable backend name.
    fn name(&self) -> &'static str;

    /// Like [`get`](SecretStore::get), but maps not-found to `None`.
    async fn get_optional(&self, key: &str) -> Result<Option<String>> {
        match self.get(key).await {
            Ok(value) => Ok(Some(value)),
            Err(SecretError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// A single-file encrypted secret store.
///
/// The whole key space lives in one blob: the decrypted plaintext is a JSON
/// object of string keys to string values, and every mutation rewrites the
/// file. The key is derived from the machine identity once at construction.
///
/// Reads share and writes exclusively hold a per-instance lock spanning the
/// full read-decrypt-encrypt-write cycle. There is no cross-process lock:
/// two processes (or two instances) writing at once are last-writer-wins.
pub struct EncryptedFileStore {
    path: PathBuf,
    key: Zeroizing<[u8; KEY_SIZE]>,
    lock: RwLock<()>,
}

impl EncryptedFileStore {
    /// Open the store in `config_dir`, deriving the key from this machine.
    ///
    /// Creates `config_dir` (mode `0700` on Unix) if needed; an existing
    /// directory is left as is. The secrets file itself is only created on
    /// the first write.
    pub async fn open(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let seed = identity::collect_identity_seed();
        Self::open_with_key(config_dir, crypto::derive_key(&seed)).await
    }

    /// Open the store with an explicit key instead of the machine-derived one.
    pub async fn open_with_key(
        config_dir: impl Into<PathBuf>,
        key: [u8; KEY_SIZE],
    ) -> Result<Self> {
        let dir = config_dir.into();
        if dir.as_os_str().is_empty() {
            return Err(SecretError::StorageError(
                "config directory must not be empty".to_string(),
            ));
        }
        ensure_dir(&dir).await?;

        Ok(Self {
            path: dir.join(SECRETS_FILE_NAME),
            key: Zeroizing::new(key),
            lock: RwLock::new(()),
        })
    }

    /// Path of the encrypted secrets file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and decrypt the secrets map. `None` when the file does not exist.
    ///
    /// Callers must hold `self.lock`.
    async fn read_map(&self) -> Result<Option<BTreeMap<String, String>>> {
        let blob = match tokio::fs::read_to_string(&self.path).await {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let plaintext = Zeroizing::new(crypto::decrypt(&self.key, &blob)?);
        let map = serde_json::from_slice(&plaintext)?;
        Ok(Some(map))
    }

    /// Encrypt and write the full secrets map.
    ///
    /// Callers must hold `self.lock` exclusively.
    async fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let plaintext = Zeroizing::new(serde_json::to_vec(map)?);
        let blob = crypto::encrypt(&self.key, &plaintext)?;
        write_secrets_file(&self.path, blob.as_bytes()).await
    }
}

/// Create the config directory if missing.
///
/// Directories created here (including missing parents) get mode `0700` on
/// Unix. A directory that already exists keeps its mode.
async fn ensure_dir(dir: &Path) -> Result<()> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(dir).await?;
    Ok(())
}

/// Replace `path` with `data`, mode 0600 on Unix.
///
/// The blob goes to a sibling temp file first and is renamed over the
/// target, so readers see either the old file or the new one.
async fn write_secrets_file(path: &Path, data: &[u8]) -> Result<()> {
    let tmp_path = temp_sibling(path);

    let result = async {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(())
}

/// A unique temp path next to `path`, e.g. `.secrets.enc.1a2b3c4d.tmp`.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{:08x}.tmp", rand::random::<u32>()));
    path.with_file_name(name)
}

#[async_trait]
impl SecretStore for EncryptedFileStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.write().await;

        let mut map = self.read_map().await?.unwrap_or_default();
        map.insert(key.to_string(), value.to_string());

        debug!(key, path = %self.path.display(), "writing secret");
        self.write_map(&map).await
    }

    async fn get(&self, key: &str) -> Result<String> {
        let _guard = self.lock.read().await;

        let mut map = self
            .read_map()
            .await?
            .ok_or_else(|| SecretError::NotFound(key.to_string()))?;

        debug!(key, "reading secret");
        map.remove(key)
            .ok_or_else(|| SecretError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.lock.write().await;

        let Some(mut map) = self.read_map().await? else {
            return Ok(());
        };
        if map.remove(key).is_none() {
            return Ok(());
        }

        debug!(key, path = %self.path.display(), "deleting secret");
        self.write_map(&map).await
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "encrypted file"
    }
}
