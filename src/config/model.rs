// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::reload::host::HostState;
use crate::types::Backend;
use crate::watch::glob::GlobOptions;
use crate::watch::registry::DirectoryGlobRegistration;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// files = ["app.py"]
/// search_paths = ["lib"]
/// poll_interval_ms = 100
/// backend = "native"
/// match_hidden = true
///
/// [[watch.dir]]
/// path = "templates"
/// patterns = ["*.html", "**/*.css"]
///
/// [command]
/// cmd = "python app.py"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// What to watch, from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,

    /// Optional child process restarted on every relevant change.
    #[serde(default)]
    pub command: Option<CommandSection>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub command: Option<CommandSection>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, command: Option<CommandSection>) -> Self {
        Self { watch, command }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watch.poll_interval_ms)
    }

    pub fn glob_options(&self) -> GlobOptions {
        GlobOptions {
            match_hidden: self.watch.match_hidden,
        }
    }

    /// The host state this config describes, with relative paths resolved
    /// against `base_dir` (normally the config file's directory).
    pub fn host_state(&self, base_dir: &Path) -> HostState {
        HostState {
            files: self
                .watch
                .files
                .iter()
                .map(|f| base_dir.join(f))
                .collect(),
            directory_globs: self
                .watch
                .dirs
                .iter()
                .map(|d| DirectoryGlobRegistration::new(base_dir.join(&d.path), d.patterns.clone()))
                .collect(),
            search_paths: self
                .watch
                .search_paths
                .iter()
                .map(|p| base_dir.join(p))
                .collect(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Files that always matter.
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Extra directories subscribed to wholesale (library / import roots).
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Upper bound on how long the raw subscription blocks before checking
    /// for root changes or shutdown.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// `"native"` (OS events, default) or `"poll"`.
    #[serde(default)]
    pub backend: Backend,

    /// Whether glob wildcards match dot-prefixed path segments.
    #[serde(default = "default_match_hidden")]
    pub match_hidden: bool,

    /// `[[watch.dir]]` tables.
    #[serde(default, rename = "dir")]
    pub dirs: Vec<DirSection>,
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_match_hidden() -> bool {
    true
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            search_paths: Vec::new(),
            poll_interval_ms: default_poll_interval_ms(),
            backend: Backend::default(),
            match_hidden: default_match_hidden(),
            dirs: Vec::new(),
        }
    }
}

/// `[[watch.dir]]` entry: a directory tree filtered by glob patterns.
///
/// Patterns are matched against paths relative to `path`; several entries
/// for the same directory are merged.
#[derive(Debug, Clone, Deserialize)]
pub struct DirSection {
    pub path: PathBuf,
    pub patterns: Vec<String>,
}

/// `[command]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    /// Shell command line (`sh -c` / `cmd /C`).
    pub cmd: String,
}
