//! Backend selection and migration across the public API.

use std::sync::Arc;

use courier_integration_tests::MemoryKeyring;
use courier_secrets::keys;
use courier_secrets::{
    select_backend_with, BackendConfig, EncryptedFileStore, GrantInfo, GrantStore, Provider,
    SecretStore,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_file_credentials_migrate_to_empty_keyring() {
    let dir = TempDir::new().unwrap();
    {
        let file = EncryptedFileStore::open(dir.path()).await.unwrap();
        file.set(keys::API_KEY, "OLD").await.unwrap();
        file.set(keys::CLIENT_ID, "CID").await.unwrap();
        let grants = GrantStore::new(Arc::new(file));
        grants
            .save_grant(GrantInfo::new("g1", "a@example.com", Provider::Google))
            .await
            .unwrap();
        grants.set_default_grant("g1").await.unwrap();
    }

    let keyring = Arc::new(MemoryKeyring::available());
    let store = select_backend_with(&BackendConfig::new(dir.path()), keyring.clone())
        .await
        .unwrap();

    assert_eq!(store.name(), "system keyring");
    assert_eq!(store.get(keys::API_KEY).await.unwrap(), "OLD");
    assert_eq!(store.get(keys::CLIENT_ID).await.unwrap(), "CID");

    let grants = GrantStore::new(store);
    assert_eq!(grants.list_grants().await.unwrap().len(), 1);
    assert_eq!(grants.get_default_grant().await.unwrap(), "g1");
    assert_eq!(keyring.len(), 4);
}

#[tokio::test]
async fn test_disable_flag_wins_over_working_keyring() {
    let dir = TempDir::new().unwrap();
    let keyring = Arc::new(MemoryKeyring::available());
    keyring.set(keys::API_KEY, "NATIVE").await.unwrap();

    let config = BackendConfig::new(dir.path()).with_keyring_disabled(true);
    let store = select_backend_with(&config, keyring).await.unwrap();

    assert_eq!(store.name(), "encrypted file");
    assert!(store.get(keys::API_KEY).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_broken_keyring_falls_back_to_file() {
    let dir = TempDir::new().unwrap();
    let store = select_backend_with(
        &BackendConfig::new(dir.path()),
        Arc::new(MemoryKeyring::broken()),
    )
    .await
    .unwrap();

    assert_eq!(store.name(), "encrypted file");
    store.set(keys::API_KEY, "written-to-file").await.unwrap();
    assert!(dir.path().join(".secrets.enc").exists());
}

#[tokio::test]
async fn test_migrated_keyring_is_not_overwritten_on_next_run() {
    let dir = TempDir::new().unwrap();
    let file = EncryptedFileStore::open(dir.path()).await.unwrap();
    file.set(keys::API_KEY, "OLD").await.unwrap();

    let keyring = Arc::new(MemoryKeyring::available());
    let first = select_backend_with(&BackendConfig::new(dir.path()), keyring.clone())
        .await
        .unwrap();
    first.set(keys::API_KEY, "ROTATED").await.unwrap();

    // A later run sees credentials in the keyring and leaves them alone.
    let second = select_backend_with(&BackendConfig::new(dir.path()), keyring)
        .await
        .unwrap();
    assert_eq!(second.get(keys::API_KEY).await.unwrap(), "ROTATED");
}

#[tokio::test]
async fn test_fresh_setup_uses_empty_keyring() {
    let dir = TempDir::new().unwrap();
    let keyring = Arc::new(MemoryKeyring::available());

    let store = select_backend_with(&BackendConfig::new(dir.path()), keyring.clone())
        .await
        .unwrap();

    assert_eq!(store.name(), "system keyring");
    assert!(keyring.is_empty());
    assert!(!dir.path().join(".secrets.enc").exists());
}
