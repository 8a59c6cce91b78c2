//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name).map(|v| parse_bool(&v)).unwrap_or(false)
}

/// Interpret a string as a boolean flag (`1`, `true`, `yes`, `on`).
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Common environment variable names.
pub mod vars {
    /// Courier home directory override.
    pub const COURIER_HOME: &str = "COURIER_HOME";

    /// Forces the encrypted file backend even when the OS keyring works.
    pub const COURIER_DISABLE_KEYRING: &str = "COURIER_DISABLE_KEYRING";

    /// Courier log filter.
    pub const COURIER_LOG: &str = "COURIER_LOG";

    /// Current user on POSIX systems.
    pub const USER: &str = "USER";

    /// Current user on Windows.
    pub const USERNAME: &str = "USERNAME";
}
