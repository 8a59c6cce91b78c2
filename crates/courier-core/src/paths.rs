//! Path resolution utilities.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Get the Courier base directory.
///
/// `$COURIER_HOME` wins when set; otherwise the platform config directory
/// (`~/.config/courier` on Linux).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    resolve_base_dir(env::get_var(vars::COURIER_HOME))
}

fn resolve_base_dir(home_override: Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = home_override {
        return Ok(expand_tilde(&dir));
    }
    let config = dirs::config_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine config directory".to_string())
    })?;
    Ok(config.join("courier"))
}

/// Get the directory that holds the encrypted secrets file.
///
/// This is the base directory itself; the file store places
/// `.secrets.enc` directly inside it.
pub fn secrets_dir() -> Result<PathBuf, ConfigError> {
    base_dir()
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Check if `path` resolves to a location inside `base`.
///
/// Both sides are canonicalized, so symlinks and `..` components are
/// resolved before comparing. Paths that do not exist are never inside.
pub fn is_within(path: &Path, base: &Path) -> bool {
    match (path.canonicalize(), base.canonicalize()) {
        (Ok(p), Ok(b)) => p.starts_with(&b),
        _ => false,
    }
}
