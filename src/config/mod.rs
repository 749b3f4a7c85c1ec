// src/config/mod.rs

//! Configuration loading and validation for watchreload.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like pattern syntax (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_fs, load_from_path};
pub use model::{CommandSection, ConfigFile, DirSection, RawConfigFile, WatchSection};
