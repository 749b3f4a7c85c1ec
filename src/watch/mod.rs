// src/watch/mod.rs

//! Adaptive file watching.
//!
//! This module is responsible for:
//! - Tracking which files and directory globs matter ([`registry`]).
//! - Deriving the minimal set of directories to subscribe to ([`roots`]).
//! - Owning a live, restartable subscription to raw filesystem events
//!   ([`session`], fed by a [`source::ChangeSource`]).
//! - Filtering raw events down to the relevant ones ([`filter`], [`glob`]).
//!
//! It does **not** know what the host does with a change; that is the
//! business of [`crate::reload`].

pub mod filter;
pub mod glob;
pub mod path_utils;
pub mod registry;
pub mod roots;
pub mod session;
pub mod source;

pub use filter::{is_relevant, relevant_changes};
pub use glob::{matches, GlobOptions, Pattern, PatternSet};
pub use registry::{DirectoryGlobRegistration, RegistrySnapshot, WatchRegistry};
pub use roots::{resolve, RootSet};
pub use session::{Batches, MutableWatchSession, StopHandle, DEFAULT_POLL_INTERVAL};
pub use source::{
    CancelToken, ChangeBatch, ChangeEvent, ChangeKind, ChangeSource, NotifySource, Subscription,
};
