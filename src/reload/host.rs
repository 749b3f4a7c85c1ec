// src/reload/host.rs

//! The seam between the reloader and the process that embeds it.
//!
//! The host supplies what to watch ([`ReloadHost::watched_state`]), is told
//! about relevant changes ([`ReloadHost::notify_file_changed`]) and may nudge
//! the reloader through an [`ActivitySignal`]. Instead of overriding a global
//! lookup point, the host exposes a [`ReloaderSlot`] and a reloader is
//! installed into it at startup.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::info;

use crate::errors::{Result, WatchreloadError};
use crate::watch::registry::DirectoryGlobRegistration;
use crate::watch::session::StopHandle;

/// Everything the host currently wants watched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostState {
    /// Files that matter unconditionally (loaded modules, config files, ...).
    pub files: Vec<PathBuf>,
    /// Directory trees filtered by glob patterns.
    pub directory_globs: Vec<DirectoryGlobRegistration>,
    /// Import / library roots watched regardless of `files`.
    pub search_paths: Vec<PathBuf>,
}

/// Host collaborator driven by the reload coordinator.
pub trait ReloadHost: Send {
    /// Current host truth. Called at the start of every tick; the result
    /// replaces whatever was returned before.
    fn watched_state(&mut self) -> HostState;

    /// A relevant file changed. Fire-and-forget: the host decides whether
    /// and when to restart.
    fn notify_file_changed(&mut self, path: &Path);
}

/// Edge-triggered "re-derive watched files now" notification.
///
/// A trigger raised while nobody is waiting is remembered (once) and
/// consumed by the next wait.
#[derive(Debug, Clone, Default)]
pub struct ActivitySignal {
    notify: Arc<Notify>,
}

impl ActivitySignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.notify.notify_one();
    }

    pub async fn triggered(&self) {
        self.notify.notified().await;
    }
}

/// Outcome of one reloader tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A batch was processed; `relevant` of its `total` events were reported.
    Changes { relevant: usize, total: usize },
    /// The host activity signal fired; the registry and roots were
    /// re-derived without waiting for a filesystem event.
    Refreshed,
    /// The session was stopped. Terminal.
    Stopped,
}

/// Anything that can be installed as the host's reloader.
pub trait Reloader: Send {
    /// Run one tick.
    fn tick(&mut self) -> Pin<Box<dyn Future<Output = Result<Tick>> + Send + '_>>;

    /// Handle that ends the reloader's ticking from anywhere.
    fn stop_handle(&self) -> StopHandle;
}

/// Pluggable reloader configuration slot.
#[derive(Default)]
pub struct ReloaderSlot {
    reloader: Option<Box<dyn Reloader>>,
}

impl fmt::Debug for ReloaderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloaderSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl ReloaderSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `reloader`, returning the previously installed one.
    pub fn install(&mut self, reloader: Box<dyn Reloader>) -> Option<Box<dyn Reloader>> {
        self.reloader.replace(reloader)
    }

    pub fn take(&mut self) -> Option<Box<dyn Reloader>> {
        self.reloader.take()
    }

    pub fn is_installed(&self) -> bool {
        self.reloader.is_some()
    }

    pub fn stop_handle(&self) -> Option<StopHandle> {
        self.reloader.as_ref().map(|r| r.stop_handle())
    }

    /// Tick the installed reloader until it stops or fails.
    pub async fn run(&mut self) -> Result<()> {
        let reloader = self.reloader.as_mut().ok_or_else(|| {
            WatchreloadError::ConfigError("no reloader installed".to_string())
        })?;

        info!("reloader started");
        loop {
            if reloader.tick().await? == Tick::Stopped {
                break;
            }
        }
        info!("reloader stopped");
        Ok(())
    }
}
