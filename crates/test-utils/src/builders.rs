use std::path::PathBuf;

use watchreload::reload::HostState;
use watchreload::watch::DirectoryGlobRegistration;

/// Builder for `HostState` to simplify test setup.
#[derive(Debug, Default)]
pub struct HostStateBuilder {
    state: HostState,
}

impl HostStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state.files.push(path.into());
        self
    }

    pub fn dir(mut self, root: impl Into<PathBuf>, patterns: &[&str]) -> Self {
        self.state
            .directory_globs
            .push(DirectoryGlobRegistration::new(root, patterns.iter().copied()));
        self
    }

    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state.search_paths.push(path.into());
        self
    }

    pub fn build(self) -> HostState {
        self.state
    }
}
