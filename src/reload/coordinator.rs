// src/reload/coordinator.rs

//! The reload loop.
//!
//! Each tick:
//! 1. asks the host for its current state and rebuilds the registry,
//! 2. resolves the root set and retargets the watch session (no-op when
//!    unchanged),
//! 3. waits for the next batch (or the host activity signal),
//! 4. filters the batch against the snapshot taken in step 1,
//! 5. notifies the host once per relevant change.
//!
//! The first tick also moves the coordinator from `Idle` to `Watching` by
//! starting the session's worker. A failed tick drops back to `Idle` so a
//! later tick starts a fresh subscription; retrying is up to the caller.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::reload::host::{ActivitySignal, ReloadHost, Reloader, Tick};
use crate::watch::filter::relevant_changes;
use crate::watch::glob::GlobOptions;
use crate::watch::registry::{RegistrySnapshot, WatchRegistry};
use crate::watch::roots::{self, RootSet};
use crate::watch::session::{Batches, MutableWatchSession, StopHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Watching,
}

pub struct ReloadCoordinator<H: ReloadHost> {
    host: H,
    registry: WatchRegistry,
    session: MutableWatchSession,
    batches: Option<Batches>,
    fs: Arc<dyn FileSystem>,
    activity: Option<ActivitySignal>,
    state: CoordinatorState,
}

impl<H: ReloadHost> fmt::Debug for ReloadCoordinator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadCoordinator")
            .field("state", &self.state)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<H: ReloadHost> ReloadCoordinator<H> {
    pub fn new(host: H, session: MutableWatchSession, options: GlobOptions) -> Self {
        Self {
            host,
            registry: WatchRegistry::new(options),
            session,
            batches: None,
            fs: Arc::new(RealFileSystem),
            activity: None,
            state: CoordinatorState::Idle,
        }
    }

    /// Resolve roots against `fs` instead of the real filesystem.
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Let `signal` force an early refresh between filesystem events.
    pub fn with_activity_signal(mut self, signal: ActivitySignal) -> Self {
        self.activity = Some(signal);
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Snapshot produced by the latest refresh.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.registry.snapshot()
    }

    /// Roots the session currently targets.
    pub fn roots(&self) -> RootSet {
        self.session.roots()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.session.stop_handle()
    }

    pub fn stop(&self) {
        self.session.stop();
    }

    /// Steps 1 and 2: rebuild the registry from host truth and retarget the
    /// session.
    pub fn refresh(&mut self) -> Result<Arc<RegistrySnapshot>> {
        let state = self.host.watched_state();
        let snapshot = self
            .registry
            .refresh(state.files, state.directory_globs)?;
        let roots = roots::resolve(&snapshot, &state.search_paths, self.fs.as_ref());
        self.session.set_roots(roots);
        Ok(snapshot)
    }

    /// Run one tick.
    pub async fn tick(&mut self) -> Result<Tick> {
        if self.session.is_stopped() {
            return Ok(Tick::Stopped);
        }

        let snapshot = self.refresh()?;

        if self.state == CoordinatorState::Idle {
            self.batches = Some(self.session.batches()?);
            self.state = CoordinatorState::Watching;
            info!(roots = self.session.roots().len(), "reload coordinator watching");
        }

        let Some(batches) = self.batches.as_mut() else {
            return Ok(Tick::Stopped);
        };

        let next = match self.activity.as_ref() {
            Some(activity) => tokio::select! {
                batch = batches.next() => Some(batch),
                _ = activity.triggered() => None,
            },
            None => Some(batches.next().await),
        };

        let batch = match next {
            None => {
                debug!("host activity; re-deriving watched files");
                self.refresh()?;
                return Ok(Tick::Refreshed);
            }
            Some(None) => {
                self.batches = None;
                return Ok(Tick::Stopped);
            }
            Some(Some(Err(err))) => {
                warn!(error = %err, "watch session failed");
                self.batches = None;
                self.state = CoordinatorState::Idle;
                return Err(err);
            }
            Some(Some(Ok(batch))) => batch,
        };

        let mut relevant = 0;
        for event in relevant_changes(&batch, &snapshot) {
            info!(path = ?event.path, kind = ?event.kind, "file changed");
            self.host.notify_file_changed(&event.path);
            relevant += 1;
        }

        Ok(Tick::Changes {
            relevant,
            total: batch.len(),
        })
    }

    /// Tick until the session is stopped or a tick fails.
    pub async fn run(mut self) -> Result<()> {
        while self.tick().await? != Tick::Stopped {}
        Ok(())
    }
}

impl<H: ReloadHost + 'static> Reloader for ReloadCoordinator<H> {
    fn tick(&mut self) -> Pin<Box<dyn Future<Output = Result<Tick>> + Send + '_>> {
        Box::pin(ReloadCoordinator::tick(self))
    }

    fn stop_handle(&self) -> StopHandle {
        ReloadCoordinator::stop_handle(self)
    }
}
