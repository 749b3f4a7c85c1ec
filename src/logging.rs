// src/logging.rs

//! `tracing` subscriber setup for the binary.
//!
//! Filter selection:
//! 1. `--log-level` applies one level to everything.
//! 2. Otherwise `WATCHRELOAD_LOG` is read as an `EnvFilter` directive list,
//!    so `info,watchreload::watch=debug` works as well as a bare level.
//! 3. Otherwise `info`.
//!
//! Output goes to stderr; stdout belongs to the supervised command.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "WATCHRELOAD_LOG";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(directive_for(level)),
        None => match std::env::var(LOG_ENV_VAR) {
            Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives.trim())
                .with_context(|| format!("invalid {LOG_ENV_VAR} value {directives:?}"))?,
            _ => EnvFilter::new("info"),
        },
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("installing log subscriber: {err}"))?;

    Ok(())
}

fn directive_for(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
