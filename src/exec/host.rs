// src/exec/host.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::loader::load_from_fs;
use crate::config::model::ConfigFile;
use crate::fs::FileSystem;
use crate::reload::host::{HostState, ReloadHost};

/// Host backed by a config file and a supervised command.
///
/// The config file is itself an explicit watched file and is re-read on
/// every tick, so edits to `[watch]` take effect on the next refresh. A
/// config that no longer parses keeps the last good registrations.
#[derive(Debug)]
pub struct CommandHost {
    config_path: PathBuf,
    base_dir: PathBuf,
    fs: Arc<dyn FileSystem>,
    config: ConfigFile,
    last_error: Option<String>,
    restart_tx: mpsc::UnboundedSender<PathBuf>,
}

impl CommandHost {
    /// `config_path` should be absolute; relative entries in the config are
    /// resolved against its directory.
    pub fn new(
        config_path: PathBuf,
        config: ConfigFile,
        fs: Arc<dyn FileSystem>,
        restart_tx: mpsc::UnboundedSender<PathBuf>,
    ) -> Self {
        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            config_path,
            base_dir,
            fs,
            config,
            last_error: None,
            restart_tx,
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    fn reload_config(&mut self) {
        match load_from_fs(self.fs.as_ref(), &self.config_path) {
            Ok(config) => {
                if self.last_error.take().is_some() {
                    info!(path = ?self.config_path, "config is valid again");
                }
                self.config = config;
            }
            Err(err) => {
                let message = err.to_string();
                if self.last_error.as_deref() != Some(message.as_str()) {
                    warn!(
                        path = ?self.config_path,
                        error = %message,
                        "failed to reload config; keeping previous watch settings"
                    );
                    self.last_error = Some(message);
                }
            }
        }
    }
}

impl ReloadHost for CommandHost {
    fn watched_state(&mut self) -> HostState {
        self.reload_config();
        let mut state = self.config.host_state(&self.base_dir);
        state.files.push(self.config_path.clone());
        state
    }

    fn notify_file_changed(&mut self, path: &Path) {
        if self.restart_tx.send(path.to_path_buf()).is_err() {
            warn!(?path, "supervisor is gone; dropping change notification");
        }
    }
}
