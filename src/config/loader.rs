// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::BuildConfig;
use crate::config::validate::validate;
use crate::errors::Result;

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] or [`load_or_default`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<BuildConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: BuildConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BuildConfig> {
    let config = load_from_path(path)?;
    validate(&config)?;
    Ok(config)
}

/// Load and validate the config at `path`, falling back to defaults when the
/// file does not exist. All fields are optional, so a project with the
/// conventional layout needs no config file at all.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<BuildConfig> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = ?path, "no config file; using defaults");
        let config = BuildConfig::default();
        validate(&config)?;
        return Ok(config);
    }
    load_and_validate(path)
}

/// Default config path: `assetpipe.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("assetpipe.toml")
}
