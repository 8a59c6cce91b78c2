//! Grant registry.
//!
//! Grants (authenticated mailbox accounts) are kept as one JSON array under
//! the `grants` key of whichever [`SecretStore`] the selector returned, and
//! the default account is a bare id under `default_grant`. The registry adds
//! no locking of its own; each call goes through the backend's discipline.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SecretError};
use crate::keys;
use crate::store::SecretStore;

/// Email provider behind a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    Google,
    Microsoft,
    Imap,
    Icloud,
    Yahoo,
    Ews,
    VirtualCalendar,
    /// A provider this build does not know about.
    #[serde(other)]
    Unknown,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
            Self::Imap => "imap",
            Self::Icloud => "icloud",
            Self::Yahoo => "yahoo",
            Self::Ews => "ews",
            Self::VirtualCalendar => "virtual-calendar",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gmail" => Ok(Self::Google),
            "microsoft" | "outlook" => Ok(Self::Microsoft),
            "imap" => Ok(Self::Imap),
            "icloud" => Ok(Self::Icloud),
            "yahoo" => Ok(Self::Yahoo),
            "ews" => Ok(Self::Ews),
            "virtual-calendar" => Ok(Self::VirtualCalendar),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantInfo {
    pub id: String,
    pub email: String,
    pub provider: Provider,
}

impl GrantInfo {
    pub fn new(id: impl Into<String>, email: impl Into<String>, provider: Provider) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            provider,
        }
    }
}

/// Account registry on top of a [`SecretStore`].
#[derive(Clone)]
pub struct GrantStore {
    store: Arc<dyn SecretStore>,
}

impl GrantStore {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// The backend this registry writes to.
    pub fn backend(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    /// All registered grants in insertion order. Empty when none are stored.
    pub async fn list_grants(&self) -> Result<Vec<GrantInfo>> {
        match self.store.get_optional(keys::GRANTS).await? {
            Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(&json)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Insert a grant, or replace the entry with the same id in place.
    pub async fn save_grant(&self, info: GrantInfo) -> Result<()> {
        let mut grants = self.list_grants().await?;
        match grants.iter_mut().find(|g| g.id == info.id) {
            Some(existing) => {
                debug!(grant_id = %info.id, "updating grant");
                *existing = info;
            }
            None => {
                debug!(grant_id = %info.id, "adding grant");
                grants.push(info);
            }
        }
        self.write_grants(&grants).await
    }

    pub async fn get_grant(&self, id: &str) -> Result<GrantInfo> {
        self.list_grants()
            .await?
            .into_iter()
            .find(|g| g.id == id)
            .ok_or_else(|| SecretError::GrantNotFound(id.to_string()))
    }

    /// Find a grant by email address, ignoring ASCII case.
    pub async fn get_grant_by_email(&self, email: &str) -> Result<GrantInfo> {
        self.list_grants()
            .await?
            .into_iter()
            .find(|g| g.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| SecretError::GrantNotFound(email.to_string()))
    }

    /// Remove a grant and, best-effort, its stored token.
    ///
    /// The default-grant pointer is left untouched even when it names the
    /// removed grant, so `get_default_grant` keeps returning the old id.
    /// Callers that want the pointer cleared must call
    /// [`clear_default_grant`](Self::clear_default_grant) themselves.
    pub async fn delete_grant(&self, id: &str) -> Result<()> {
        let mut grants = self.list_grants().await?;
        grants.retain(|g| g.id != id);
        self.write_grants(&grants).await?;

        if let Err(e) = self.store.delete(&keys::grant_token(id)).await {
            warn!(grant_id = %id, error = %e, "failed to delete grant token");
        }
        debug!(grant_id = %id, "deleted grant");
        Ok(())
    }

    pub async fn set_default_grant(&self, id: &str) -> Result<()> {
        debug!(grant_id = %id, "setting default grant");
        self.store.set(keys::DEFAULT_GRANT, id).await
    }

    /// The default grant id, or [`SecretError::NoDefaultGrant`] if unset.
    ///
    /// The id is not checked against the registry and may be dangling.
    pub async fn get_default_grant(&self) -> Result<String> {
        match self.store.get_optional(keys::DEFAULT_GRANT).await? {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(SecretError::NoDefaultGrant),
        }
    }

    /// Remove the default-grant pointer.
    pub async fn clear_default_grant(&self) -> Result<()> {
        self.store.delete(keys::DEFAULT_GRANT).await
    }

    /// Forget every grant and the default pointer.
    ///
    /// Failures are logged and swallowed.
    pub async fn clear_grants(&self) {
        for key in [keys::GRANTS, keys::DEFAULT_GRANT] {
            if let Err(e) = self.store.delete(key).await {
                warn!(key, error = %e, "failed to clear grant data");
            }
        }
    }

    async fn write_grants(&self, grants: &[GrantInfo]) -> Result<()> {
        let json = serde_json::to_string(grants)?;
        self.store.set(keys::GRANTS, &json).await
    }
}
