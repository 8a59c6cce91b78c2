//! # courier-core
//!
//! Shared functionality used across the Courier crates:
//!
//! - **Paths**: Resolution of the configuration directory
//! - **Environment**: Typed access to environment variables and overrides
//! - **Secrets**: A zero-on-drop string for credentials held in memory

pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use error::ConfigError;
pub use secret::SecretString;
