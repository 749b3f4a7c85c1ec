// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::FileSystem;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks poll interval, directory registrations, pattern syntax and
///   the command line.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], reading through `fs`.
///
/// Used when the config is re-read on every reload tick.
pub fn load_from_fs(fs: &dyn FileSystem, path: &Path) -> Result<ConfigFile> {
    let contents = fs.read_to_string(path)?;
    let raw_config: RawConfigFile = toml::from_str(&contents)?;
    ConfigFile::try_from(raw_config)
}

/// Helper to resolve a default config path: `Watchreload.toml` in the
/// current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Watchreload.toml")
}
