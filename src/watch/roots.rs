// src/watch/roots.rs

//! Root resolution: which directories must be subscribed to at the OS level.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::fs::FileSystem;
use crate::watch::path_utils::normalize;
use crate::watch::registry::RegistrySnapshot;

/// Deduplicated, ancestor-collapsed set of directories.
///
/// No member is a descendant of another member. Equality is set equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootSet(BTreeSet<PathBuf>);

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a root set from arbitrary directories, collapsing nested ones
    /// into their common ancestors. Each directory is normalised first, so
    /// `/proj/../lib` is treated as `/lib`, not as a child of `/proj`.
    pub fn collapse<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let sorted: BTreeSet<PathBuf> = dirs
            .into_iter()
            .map(|dir| normalize(&Into::<PathBuf>::into(dir)))
            .collect();

        // Component-wise ordering puts every directory directly before its
        // descendants, so comparing against the last kept root is enough.
        let mut roots = BTreeSet::new();
        let mut last: Option<PathBuf> = None;
        for dir in sorted {
            if let Some(ref kept) = last {
                if dir.starts_with(kept) {
                    continue;
                }
            }
            roots.insert(dir.clone());
            last = Some(dir);
        }
        RootSet(roots)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn contains(&self, root: &Path) -> bool {
        self.0.contains(root)
    }

    /// True if `path` is a member or lies below one.
    pub fn covers(&self, path: &Path) -> bool {
        self.0.iter().any(|root| path.starts_with(root))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for RootSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        RootSet::collapse(iter)
    }
}

/// Derive the root set from the registry snapshot plus host search paths.
///
/// Candidates are the parents of explicit files, every glob root and every
/// search path. Directories that do not exist right now are skipped without
/// error; they are checked again on the next resolution.
pub fn resolve(
    snapshot: &RegistrySnapshot,
    search_paths: &[PathBuf],
    fs: &dyn FileSystem,
) -> RootSet {
    let candidates = snapshot
        .files()
        .filter_map(Path::parent)
        .chain(snapshot.glob_roots())
        .chain(search_paths.iter().map(PathBuf::as_path));

    let mut existing = BTreeSet::new();
    for dir in candidates {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let dir = normalize(dir);
        if fs.is_dir(&dir) {
            existing.insert(dir);
        } else {
            debug!(?dir, "skipping non-existent watch directory");
        }
    }

    RootSet::collapse(existing)
}
