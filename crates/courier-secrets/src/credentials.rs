//! Platform credentials held in the selected store.

use courier_core::SecretString;
use tracing::{debug, warn};

use crate::error::{Result, SecretError};
use crate::grants::GrantStore;
use crate::keys;
use crate::store::SecretStore;

/// API key plus the optional OAuth application credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: SecretString,
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
}

impl Credentials {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            client_id: None,
            client_secret: None,
        }
    }

    pub fn with_client(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<SecretString>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Load credentials from `store`.
    ///
    /// A missing or empty API key is [`SecretError::NotConfigured`], which
    /// renders as a single message telling the user how to fix it.
    pub async fn load(store: &dyn SecretStore) -> Result<Self> {
        let api_key = match store.get_optional(keys::API_KEY).await? {
            Some(key) if !key.is_empty() => SecretString::new(key),
            _ => return Err(SecretError::NotConfigured),
        };
        let client_id = non_empty(store.get_optional(keys::CLIENT_ID).await?);
        let client_secret = non_empty(store.get_optional(keys::CLIENT_SECRET).await?)
            .map(SecretString::new);

        Ok(Self {
            api_key,
            client_id,
            client_secret,
        })
    }

    /// Persist the API key and whichever client fields are set.
    pub async fn save(&self, store: &dyn SecretStore) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(SecretError::NotConfigured);
        }
        store.set(keys::API_KEY, self.api_key.expose_secret()).await?;
        if let Some(client_id) = &self.client_id {
            store.set(keys::CLIENT_ID, client_id).await?;
        }
        if let Some(client_secret) = &self.client_secret {
            store
                .set(keys::CLIENT_SECRET, client_secret.expose_secret())
                .await?;
        }
        debug!(backend = store.name(), "saved credentials");
        Ok(())
    }

    /// Whether an API key is present in `store`.
    pub async fn is_configured(store: &dyn SecretStore) -> Result<bool> {
        Ok(non_empty(store.get_optional(keys::API_KEY).await?).is_some())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Forget credentials, grants and the default grant. Best-effort.
pub async fn reset_all(grants: &GrantStore) {
    let store = grants.backend();
    for key in [keys::API_KEY, keys::CLIENT_ID, keys::CLIENT_SECRET] {
        if let Err(e) = store.delete(key).await {
            warn!(key, error = %e, "failed to delete credential");
        }
    }
    grants.clear_grants().await;
}
