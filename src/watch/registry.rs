// src/watch/registry.rs

//! The set of things the host currently cares about.
//!
//! The registry is rebuilt from scratch on every tick: it mirrors current
//! host truth, so a file that stopped being a dependency simply disappears
//! on the next refresh. Readers work against an immutable
//! [`RegistrySnapshot`] so a tick never observes a half-updated registry.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::watch::glob::{GlobOptions, PatternSet};
use crate::watch::path_utils::normalize;

/// "Watch this directory tree, but only paths matching one of these
/// patterns are relevant."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryGlobRegistration {
    pub root: PathBuf,
    pub patterns: Vec<String>,
}

impl DirectoryGlobRegistration {
    pub fn new<P, I, S>(root: P, patterns: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: root.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Immutable view of the registry for the duration of one tick.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    files: HashSet<PathBuf>,
    globs: BTreeMap<PathBuf, PatternSet>,
}

impl RegistrySnapshot {
    /// Explicitly tracked files.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn contains_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// One entry per registered directory, with the union of its patterns.
    pub fn directory_globs(&self) -> impl Iterator<Item = (&Path, &PatternSet)> {
        self.globs.iter().map(|(root, set)| (root.as_path(), set))
    }

    pub fn glob_roots(&self) -> impl Iterator<Item = &Path> {
        self.globs.keys().map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.globs.is_empty()
    }
}

/// Holds the latest snapshot and rebuilds it on demand.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    options: GlobOptions,
    snapshot: Arc<RegistrySnapshot>,
}

impl WatchRegistry {
    pub fn new(options: GlobOptions) -> Self {
        Self {
            options,
            snapshot: Arc::new(RegistrySnapshot::default()),
        }
    }

    /// Replace the registry contents with `files` and `directory_globs`.
    ///
    /// Paths are normalised lexically (`.` and `..` folded away), so
    /// `/proj/../lib` and `/lib` are the same registration. Registrations
    /// sharing a root are merged into one pattern set. If any pattern fails
    /// to compile the previous snapshot is kept.
    pub fn refresh<F, D>(&mut self, files: F, directory_globs: D) -> Result<Arc<RegistrySnapshot>>
    where
        F: IntoIterator<Item = PathBuf>,
        D: IntoIterator<Item = DirectoryGlobRegistration>,
    {
        let files: HashSet<PathBuf> = files.into_iter().map(|f| normalize(&f)).collect();

        let mut merged: BTreeMap<PathBuf, BTreeSet<String>> = BTreeMap::new();
        for registration in directory_globs {
            merged
                .entry(normalize(&registration.root))
                .or_default()
                .extend(registration.patterns);
        }

        let mut globs = BTreeMap::new();
        for (root, patterns) in merged {
            globs.insert(root, PatternSet::new(&patterns, self.options)?);
        }

        debug!(
            files = files.len(),
            directories = globs.len(),
            "watch registry refreshed"
        );

        self.snapshot = Arc::new(RegistrySnapshot { files, globs });
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn options(&self) -> GlobOptions {
        self.options
    }
}
