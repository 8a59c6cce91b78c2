//! Grant registry behaviour over the encrypted file backend.

use std::sync::Arc;

use courier_integration_tests::MemoryKeyring;
use courier_secrets::keys;
use courier_secrets::{
    reset_all, select_backend_with, BackendConfig, Credentials, GrantInfo, GrantStore, Provider,
    SecretError, SecretStore,
};
use tempfile::TempDir;

async fn file_registry(dir: &TempDir) -> GrantStore {
    let config = BackendConfig::new(dir.path()).with_keyring_disabled(true);
    let store = select_backend_with(&config, Arc::new(MemoryKeyring::available()))
        .await
        .unwrap();
    GrantStore::new(store)
}

#[tokio::test]
async fn test_upsert_changes_length_only_for_new_ids() {
    let dir = TempDir::new().unwrap();
    let grants = file_registry(&dir).await;

    grants
        .save_grant(GrantInfo::new("g1", "a@example.com", Provider::Google))
        .await
        .unwrap();
    assert_eq!(grants.list_grants().await.unwrap().len(), 1);

    grants
        .save_grant(GrantInfo::new("g2", "b@example.com", Provider::Imap))
        .await
        .unwrap();
    assert_eq!(grants.list_grants().await.unwrap().len(), 2);

    grants
        .save_grant(GrantInfo::new("g1", "renamed@example.com", Provider::Google))
        .await
        .unwrap();
    let list = grants.list_grants().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].email, "renamed@example.com");
}

#[tokio::test]
async fn test_registry_persists_across_instances() {
    let dir = TempDir::new().unwrap();
    {
        let grants = file_registry(&dir).await;
        grants
            .save_grant(GrantInfo::new("g1", "a@example.com", Provider::Microsoft))
            .await
            .unwrap();
    }

    let grants = file_registry(&dir).await;
    let found = grants.get_grant_by_email("a@example.com").await.unwrap();
    assert_eq!(found.provider, Provider::Microsoft);
}

#[tokio::test]
async fn test_default_pointer_dangles_after_delete() {
    let dir = TempDir::new().unwrap();
    let grants = file_registry(&dir).await;

    grants
        .save_grant(GrantInfo::new("grant1", "a@example.com", Provider::Google))
        .await
        .unwrap();
    grants.set_default_grant("grant1").await.unwrap();
    grants.delete_grant("grant1").await.unwrap();

    assert_eq!(grants.get_default_grant().await.unwrap(), "grant1");
    assert!(matches!(
        grants.get_grant("grant1").await,
        Err(SecretError::GrantNotFound(_))
    ));
}

#[tokio::test]
async fn test_clear_grants_leaves_no_default() {
    let dir = TempDir::new().unwrap();
    let grants = file_registry(&dir).await;

    grants
        .save_grant(GrantInfo::new("g1", "a@example.com", Provider::Google))
        .await
        .unwrap();
    grants.set_default_grant("g1").await.unwrap();
    grants.clear_grants().await;

    assert!(grants.list_grants().await.unwrap().is_empty());
    assert!(matches!(
        grants.get_default_grant().await,
        Err(SecretError::NoDefaultGrant)
    ));
}

#[tokio::test]
async fn test_grants_array_is_plain_json_in_store() {
    let dir = TempDir::new().unwrap();
    let grants = file_registry(&dir).await;
    grants
        .save_grant(GrantInfo::new("g1", "a@example.com", Provider::Yahoo))
        .await
        .unwrap();

    let raw = grants.backend().get(keys::GRANTS).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["id"], "g1");
    assert_eq!(value[0]["provider"], "yahoo");
}

#[tokio::test]
async fn test_reset_removes_credentials_and_grants() {
    let dir = TempDir::new().unwrap();
    let grants = file_registry(&dir).await;
    Credentials::new("nyk_key")
        .with_client("cid", "secret")
        .save(grants.backend().as_ref())
        .await
        .unwrap();
    grants
        .save_grant(GrantInfo::new("g1", "a@example.com", Provider::Google))
        .await
        .unwrap();

    reset_all(&grants).await;

    assert!(matches!(
        Credentials::load(grants.backend().as_ref()).await,
        Err(SecretError::NotConfigured)
    ));
    assert!(grants.list_grants().await.unwrap().is_empty());
}
