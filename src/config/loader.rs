// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{AppConfig, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file and return the raw, unvalidated tree.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, rebase relative paths onto the file's directory
/// and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;
    raw.paths = raw.paths.rebased(&config_root_dir(path));
    AppConfig::try_from(raw)
}

/// Like [`load_and_validate`], but a missing file at the *default* location
/// yields the built-in defaults instead of an error.
///
/// An explicitly requested path must exist.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    if path == default_config_path() && !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(AppConfig::default());
    }
    load_and_validate(path)
}

/// `stemshift.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("stemshift.toml")
}

/// Directory that relative `[paths]` entries are resolved against.
///
/// A bare filename (parent = "") resolves against ".".
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
