// src/watch/session.rs

//! A watch whose root set can be swapped while it is being consumed.
//!
//! [`MutableWatchSession`] presents one logical, effectively infinite stream
//! of change batches. A dedicated worker thread owns the raw subscription
//! and blocks on it; batches travel to the consumer over a bounded channel.
//!
//! Root changes are control messages: `set_roots` publishes the new set on a
//! `watch` channel and bumps a generation counter. The worker cancels the
//! raw subscription within one poll interval and reopens it over the new
//! roots. Batches still buffered from the old generation are dropped on the
//! consumer side, so a root change never applies retroactively to a batch
//! that has already been handed out and always applies from the next batch
//! boundary on.
//!
//! `stop` is permanent: every current and future iteration over the session
//! ends.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::errors::{Result, WatchreloadError};
use crate::watch::roots::RootSet;
use crate::watch::source::{CancelToken, ChangeBatch, ChangeSource};

/// Default bound on how long the worker blocks before re-checking signals.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A zero interval would turn every idle wait into a busy loop.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The only state shared between the consumer and the worker.
#[derive(Debug, Default)]
struct Signals {
    restart: AtomicBool,
    stopped: AtomicBool,
    generation: AtomicU64,
    /// Set while a [`Batches`] stream is alive.
    claimed: AtomicBool,
}

impl Signals {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            info!("watch session stopped");
        }
    }
}

/// Cloneable handle that stops a session from anywhere.
#[derive(Debug, Clone)]
pub struct StopHandle {
    signals: Arc<Signals>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.signals.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.signals.is_stopped()
    }
}

pub struct MutableWatchSession {
    source: Arc<dyn ChangeSource>,
    poll_interval: Duration,
    roots_tx: watch::Sender<RootSet>,
    signals: Arc<Signals>,
}

impl fmt::Debug for MutableWatchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableWatchSession")
            .field("poll_interval", &self.poll_interval)
            .field("roots", &*self.roots_tx.borrow())
            .field("signals", &self.signals)
            .finish_non_exhaustive()
    }
}

impl MutableWatchSession {
    /// New session with an empty root set. `poll_interval` is raised to at
    /// least one millisecond.
    pub fn new(source: Arc<dyn ChangeSource>, poll_interval: Duration) -> Self {
        let (roots_tx, _) = watch::channel(RootSet::new());
        Self {
            source,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            roots_tx,
            signals: Arc::new(Signals::default()),
        }
    }

    /// Target a new root set.
    ///
    /// Returns `true` and signals a restart if `roots` differs from the
    /// current set; a value-equal set is a no-op.
    pub fn set_roots(&self, roots: RootSet) -> bool {
        let signals = &self.signals;
        let changed = self.roots_tx.send_if_modified(|current| {
            if *current == roots {
                return false;
            }
            *current = roots;
            // Bumped under the channel lock so the worker always reads a
            // root set together with its own generation.
            signals.generation.fetch_add(1, Ordering::SeqCst);
            signals.restart.store(true, Ordering::SeqCst);
            true
        });

        if changed {
            info!(roots = ?*self.roots_tx.borrow(), "watch roots changed; restarting subscription");
        }
        changed
    }

    /// Currently targeted roots.
    pub fn roots(&self) -> RootSet {
        self.roots_tx.borrow().clone()
    }

    /// True between a root change and the worker picking it up.
    pub fn restart_pending(&self) -> bool {
        self.signals.restart.load(Ordering::SeqCst)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Permanently tear the session down. Idempotent.
    pub fn stop(&self) {
        self.signals.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.signals.is_stopped()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            signals: Arc::clone(&self.signals),
        }
    }

    /// Start iterating.
    ///
    /// Spawns the worker that owns the raw subscription. On a stopped
    /// session this returns an already-finished stream.
    ///
    /// Only one stream may be alive at a time: a second call fails with
    /// [`WatchreloadError::AlreadyIterating`] until the first stream is
    /// dropped.
    pub fn batches(&self) -> Result<Batches> {
        if self.is_stopped() {
            return Ok(Batches {
                rx: None,
                signals: Arc::clone(&self.signals),
                claimed: false,
            });
        }

        if self.signals.claimed.swap(true, Ordering::SeqCst) {
            return Err(WatchreloadError::AlreadyIterating);
        }

        // Capacity 1: the worker stays at most one batch ahead.
        let (tx, rx) = mpsc::channel(1);
        let worker = Worker {
            source: Arc::clone(&self.source),
            poll_interval: self.poll_interval,
            roots_rx: self.roots_tx.subscribe(),
            signals: Arc::clone(&self.signals),
            tx,
        };

        if let Err(err) = thread::Builder::new()
            .name("watchreload-session".to_string())
            .spawn(move || worker.run())
        {
            self.signals.claimed.store(false, Ordering::SeqCst);
            return Err(err.into());
        }

        Ok(Batches {
            rx: Some(rx),
            signals: Arc::clone(&self.signals),
            claimed: true,
        })
    }
}

impl Drop for MutableWatchSession {
    fn drop(&mut self) {
        self.signals.stop();
    }
}

/// A batch tagged with the root generation it was observed under.
#[derive(Debug)]
struct Tagged {
    generation: u64,
    result: Result<ChangeBatch>,
}

/// Consumer side of a session: yields batches until the session stops or
/// the raw subscription fails.
pub struct Batches {
    rx: Option<mpsc::Receiver<Tagged>>,
    signals: Arc<Signals>,
    claimed: bool,
}

impl Drop for Batches {
    fn drop(&mut self) {
        // The worker notices the closed channel on its next send and exits.
        if self.claimed {
            self.signals.claimed.store(false, Ordering::SeqCst);
        }
    }
}

impl fmt::Debug for Batches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batches")
            .field("finished", &self.rx.is_none())
            .finish_non_exhaustive()
    }
}

impl Batches {
    /// Wait for the next batch.
    ///
    /// `None` means the stream is over: the session was stopped or the
    /// worker exited after reporting an error. Cancel-safe.
    pub async fn next(&mut self) -> Option<Result<ChangeBatch>> {
        loop {
            let tagged = match self.rx.as_mut() {
                Some(rx) if !self.signals.is_stopped() => rx.recv().await,
                _ => None,
            };
            match self.accept(tagged) {
                Accept::Deliver(item) => return item,
                Accept::Skip => continue,
            }
        }
    }

    /// Blocking variant of [`Batches::next`] for non-async callers.
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_next(&mut self) -> Option<Result<ChangeBatch>> {
        loop {
            let tagged = match self.rx.as_mut() {
                Some(rx) if !self.signals.is_stopped() => rx.blocking_recv(),
                _ => None,
            };
            match self.accept(tagged) {
                Accept::Deliver(item) => return item,
                Accept::Skip => continue,
            }
        }
    }

    fn accept(&mut self, tagged: Option<Tagged>) -> Accept {
        let Some(tagged) = tagged else {
            self.rx = None;
            return Accept::Deliver(None);
        };

        if self.signals.is_stopped() {
            self.rx = None;
            return Accept::Deliver(None);
        }

        // Errors are never dropped, even from a superseded subscription.
        if tagged.result.is_ok() && tagged.generation != self.signals.generation() {
            debug!(
                batch_generation = tagged.generation,
                "discarding batch from superseded root set"
            );
            return Accept::Skip;
        }

        Accept::Deliver(Some(tagged.result))
    }
}

enum Accept {
    Deliver(Option<Result<ChangeBatch>>),
    Skip,
}

/// Owns the raw subscription on its own thread.
struct Worker {
    source: Arc<dyn ChangeSource>,
    poll_interval: Duration,
    roots_rx: watch::Receiver<RootSet>,
    signals: Arc<Signals>,
    tx: mpsc::Sender<Tagged>,
}

impl Worker {
    fn run(mut self) {
        debug!("watch session worker started");

        while !self.signals.is_stopped() {
            self.signals.restart.store(false, Ordering::SeqCst);
            let (roots, generation) = {
                let roots = self.roots_rx.borrow_and_update();
                (roots.clone(), self.signals.generation())
            };

            let cancel = {
                let signals = Arc::clone(&self.signals);
                CancelToken::new(move || signals.is_stopped() || signals.generation() != generation)
            };

            let subscription =
                match self.source.subscribe(&roots, self.poll_interval, cancel.clone()) {
                    Ok(subscription) => subscription,
                    Err(err) => {
                        warn!(error = %err, "failed to open raw subscription");
                        let _ = self.tx.blocking_send(Tagged {
                            generation,
                            result: Err(err),
                        });
                        return;
                    }
                };

            for result in subscription {
                // Whatever the abandoned subscription still had buffered is
                // dropped here.
                if cancel.is_cancelled() {
                    break;
                }
                let failed = result.is_err();
                if self.tx.blocking_send(Tagged { generation, result }).is_err() {
                    debug!("batch consumer dropped; worker exiting");
                    return;
                }
                if failed {
                    return;
                }
            }
        }

        debug!("watch session worker finished");
    }
}
