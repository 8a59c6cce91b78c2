//! CLI command implementations.

pub mod auth;
