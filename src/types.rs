// src/types.rs

use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// Which raw change backend feeds the watch session.
///
/// - `Native`: OS file events (inotify / FSEvents / ReadDirectoryChangesW)
///   through `notify`'s recommended watcher (default).
/// - `Poll`: periodic stat polling. Slower, but works on network mounts and
///   in containers where native events are not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Native,
    Poll,
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Native
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(Backend::Native),
            "poll" => Ok(Backend::Poll),
            other => Err(format!(
                "invalid backend: {other} (expected \"native\" or \"poll\")"
            )),
        }
    }
}
