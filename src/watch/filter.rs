// src/watch/filter.rs

//! Decides which raw changes the host actually cares about.

use tracing::debug;

use crate::watch::path_utils::relative_str;
use crate::watch::registry::RegistrySnapshot;
use crate::watch::source::{ChangeBatch, ChangeEvent};

/// Is `event` relevant under `snapshot`?
///
/// 1. A path that is an explicitly tracked file is always relevant, whatever
///    glob registrations exist for its directory.
/// 2. Otherwise the path is tested, relative to each registered directory it
///    lies under, against that directory's patterns.
/// 3. Registrations the path cannot be made relative to are skipped.
pub fn is_relevant(event: &ChangeEvent, snapshot: &RegistrySnapshot) -> bool {
    if snapshot.contains_file(&event.path) {
        debug!(path = ?event.path, "explicit file changed");
        return true;
    }

    for (root, patterns) in snapshot.directory_globs() {
        let Some(rel) = relative_str(root, &event.path) else {
            continue;
        };
        if patterns.is_match(&rel) {
            debug!(path = ?event.path, ?root, rel = %rel, "glob match");
            return true;
        }
    }

    false
}

/// The relevant subset of `batch`, in batch order.
pub fn relevant_changes<'a>(
    batch: &'a ChangeBatch,
    snapshot: &'a RegistrySnapshot,
) -> impl Iterator<Item = &'a ChangeEvent> + 'a {
    batch.iter().filter(move |event| is_relevant(event, snapshot))
}
