//! Secure credential and grant storage for Courier.
//!
//! Credentials live either in the OS keyring or in a single AES-256-GCM
//! encrypted file keyed to the machine. [`selector::select_backend`] picks
//! one per process (migrating file contents into the keyring when it becomes
//! usable), and [`GrantStore`] keeps the account registry on top of it.

pub mod credentials;
pub mod crypto;
pub mod error;
pub mod grants;
pub mod identity;
pub mod keys;
pub mod native;
pub mod selector;
pub mod store;

pub use credentials::{reset_all, Credentials};
pub use error::{Result, SecretError};
pub use grants::{GrantInfo, GrantStore, Provider};
pub use native::KeyringStore;
pub use selector::{select_backend, select_backend_with, BackendConfig};
pub use store::{EncryptedFileStore, SecretStore};
