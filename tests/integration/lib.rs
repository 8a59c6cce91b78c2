//! Shared fixtures for Courier integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use courier_secrets::{Result, SecretError, SecretStore};

/// An in-memory keyring that behaves like a working OS secret service.
#[derive(Default)]
pub struct MemoryKeyring {
    available: bool,
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyring {
    /// A keyring whose availability probe succeeds.
    pub fn available() -> Self {
        Self {
            available: true,
            values: Mutex::default(),
        }
    }

    /// A keyring that is installed but not functional.
    pub fn broken() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SecretStore for MemoryKeyring {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if !self.available {
            return Err(SecretError::KeychainError("no secret service".into()));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String> {
        self.values
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn is_available(&self) -> bool {
        if self.set("__probe__", "probe").await.is_err() {
            return false;
        }
        self.delete("__probe__").await.is_ok()
    }

    fn name(&self) -> &'static str {
        "system keyring"
    }
}
