// src/watch/source.rs

//! Raw filesystem change sources.
//!
//! A [`ChangeSource`] opens a subscription over a set of roots and hands back
//! a blocking iterator of change batches. The iterator:
//! - yields an empty batch when a poll interval passes without events,
//! - ends (returns `None`) once its [`CancelToken`] fires, at the latest one
//!   poll interval later,
//! - yields an `Err` and then ends if the underlying watcher fails.
//!
//! [`NotifySource`] is the production implementation on top of `notify`.

use std::collections::BTreeSet;
use std::fmt;
use std::iter;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Config, Event, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info};

use crate::errors::{Result, WatchreloadError};
use crate::types::Backend;
use crate::watch::roots::RootSet;

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// A single raw change notification for an absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn added(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Added, path)
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Modified, path)
    }

    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Deleted, path)
    }
}

/// One delivery of zero or more changes.
pub type ChangeBatch = BTreeSet<ChangeEvent>;

/// Blocking iterator over change batches returned by [`ChangeSource::subscribe`].
pub type Subscription = Box<dyn Iterator<Item = Result<ChangeBatch>> + Send>;

/// External cancellation signal handed to a subscription.
#[derive(Clone)]
pub struct CancelToken {
    check: Arc<dyn Fn() -> bool + Send + Sync>,
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelToken {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
        }
    }

    /// A token that never fires.
    pub fn never() -> Self {
        Self::new(|| false)
    }

    pub fn is_cancelled(&self) -> bool {
        (self.check)()
    }
}

/// Anything that can watch a root set and report raw changes.
pub trait ChangeSource: Send + Sync {
    /// Open a subscription over `roots`.
    ///
    /// Failing to establish the watch (missing permissions, watch handle
    /// exhaustion, ...) is reported here rather than through the iterator.
    fn subscribe(
        &self,
        roots: &RootSet,
        poll_interval: Duration,
        cancel: CancelToken,
    ) -> Result<Subscription>;
}

/// Change source backed by `notify`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifySource {
    backend: Backend,
}

impl NotifySource {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// OS-native file events.
    pub fn native() -> Self {
        Self::new(Backend::Native)
    }

    /// Stat polling at the subscription's poll interval.
    pub fn polling() -> Self {
        Self::new(Backend::Poll)
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl ChangeSource for NotifySource {
    fn subscribe(
        &self,
        roots: &RootSet,
        poll_interval: Duration,
        cancel: CancelToken,
    ) -> Result<Subscription> {
        // Channel from the notify callback thread into the blocking iterator.
        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let handler = move |res: notify::Result<Event>| {
            // The receiver is gone once the subscription is dropped.
            let _ = tx.send(res);
        };

        let mut watcher: Box<dyn Watcher + Send> = match self.backend {
            Backend::Native => Box::new(RecommendedWatcher::new(handler, Config::default())?),
            Backend::Poll => Box::new(PollWatcher::new(
                handler,
                Config::default().with_poll_interval(poll_interval),
            )?),
        };

        for root in roots.iter() {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|err| {
                    WatchreloadError::Subscription(format!("watching {:?}: {err}", root))
                })?;
        }

        info!(roots = roots.len(), backend = ?self.backend, "raw subscription opened");

        Ok(Box::new(NotifySubscription {
            _watcher: watcher,
            rx,
            poll_interval,
            cancel,
            done: false,
        }))
    }
}

struct NotifySubscription {
    /// Dropping the watcher releases the OS watch handles.
    _watcher: Box<dyn Watcher + Send>,
    rx: Receiver<notify::Result<Event>>,
    poll_interval: Duration,
    cancel: CancelToken,
    done: bool,
}

impl Iterator for NotifySubscription {
    type Item = Result<ChangeBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cancel.is_cancelled() {
            return None;
        }

        let first = match self.rx.recv_timeout(self.poll_interval) {
            Ok(res) => res,
            Err(RecvTimeoutError::Timeout) => return Some(Ok(ChangeBatch::new())),
            Err(RecvTimeoutError::Disconnected) => {
                self.done = true;
                return None;
            }
        };

        if self.cancel.is_cancelled() {
            return None;
        }

        // Drain whatever else is already queued into the same batch.
        let mut batch = ChangeBatch::new();
        for res in iter::once(first).chain(self.rx.try_iter()) {
            match res {
                Ok(event) => collect_event(&mut batch, event),
                Err(err) => {
                    self.done = true;
                    return Some(Err(WatchreloadError::Subscription(err.to_string())));
                }
            }
        }

        debug!(changes = batch.len(), "raw change batch");
        Some(Ok(batch))
    }
}

/// Map a `notify` event onto change events, one per affected path.
fn collect_event(batch: &mut ChangeBatch, event: Event) {
    let Some(kind) = change_kind(&event.kind) else {
        return;
    };
    for path in event.paths {
        batch.insert(ChangeEvent::new(kind, path));
    }
}

fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Added),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        _ => None,
    }
}

