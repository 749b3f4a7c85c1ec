use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use watchreload::reload::{HostState, ReloadHost};

/// A host whose state tests can change between ticks and which records
/// every change notification.
///
/// Clones share state, so keep one clone in the test after handing the
/// other to the coordinator.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    state: Arc<Mutex<HostState>>,
    notified: Arc<Mutex<Vec<PathBuf>>>,
    refreshes: Arc<AtomicUsize>,
}

impl RecordingHost {
    pub fn new(state: HostState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            ..Self::default()
        }
    }

    pub fn set_state(&self, state: HostState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn add_file(&self, path: impl Into<PathBuf>) {
        self.state.lock().unwrap().files.push(path.into());
    }

    /// Paths reported through `notify_file_changed`, in order.
    pub fn notified(&self) -> Vec<PathBuf> {
        self.notified.lock().unwrap().clone()
    }

    /// How many times the coordinator asked for the host state.
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl ReloadHost for RecordingHost {
    fn watched_state(&mut self) -> HostState {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap().clone()
    }

    fn notify_file_changed(&mut self, path: &Path) {
        self.notified.lock().unwrap().push(path.to_path_buf());
    }
}
