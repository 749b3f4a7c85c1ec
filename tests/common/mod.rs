#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::PathBuf;

pub use watchreload_test_utils::init_tracing;

use watchreload::watch::{ChangeEvent, RegistrySnapshot, WatchRegistry};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Build a registry snapshot from explicit files and `(dir, patterns)` pairs.
pub fn snapshot_of(files: &[&str], dirs: &[(&str, &[&str])]) -> RegistrySnapshot {
    let mut registry = WatchRegistry::default();
    let snapshot = registry
        .refresh(
            files.iter().map(PathBuf::from),
            dirs.iter().map(|(root, patterns)| {
                watchreload::watch::DirectoryGlobRegistration::new(*root, patterns.iter().copied())
            }),
        )
        .expect("valid registrations");
    (*snapshot).clone()
}

pub fn paths(events: &BTreeSet<ChangeEvent>) -> Vec<PathBuf> {
    events.iter().map(|e| e.path.clone()).collect()
}
