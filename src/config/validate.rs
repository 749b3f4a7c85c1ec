// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WatchreloadError};
use crate::watch::glob::Pattern;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WatchreloadError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.command))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_poll_interval(cfg)?;
    validate_directories(cfg)?;
    validate_command(cfg)?;
    Ok(())
}

fn validate_poll_interval(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.poll_interval_ms == 0 {
        return Err(WatchreloadError::ConfigError(
            "[watch].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_directories(cfg: &RawConfigFile) -> Result<()> {
    for dir in cfg.watch.dirs.iter() {
        if dir.patterns.is_empty() {
            return Err(WatchreloadError::ConfigError(format!(
                "[[watch.dir]] entry for {:?} has no patterns",
                dir.path
            )));
        }
        for pattern in dir.patterns.iter() {
            Pattern::new(pattern)?;
        }
    }
    Ok(())
}

fn validate_command(cfg: &RawConfigFile) -> Result<()> {
    if let Some(command) = &cfg.command {
        if command.cmd.trim().is_empty() {
            return Err(WatchreloadError::ConfigError(
                "[command].cmd must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}
