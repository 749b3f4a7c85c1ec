// src/reload/mod.rs

//! Reload orchestration.
//!
//! The [`coordinator`] drives the watch machinery tick by tick and reports
//! relevant changes to a [`host::ReloadHost`]; [`host`] defines that seam
//! along with the activity signal and the reloader slot a host installs a
//! reloader into.

pub mod coordinator;
pub mod host;

pub use coordinator::{CoordinatorState, ReloadCoordinator};
pub use host::{ActivitySignal, HostState, ReloadHost, Reloader, ReloaderSlot, Tick};
