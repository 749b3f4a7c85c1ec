// src/exec/mod.rs

//! Process-level host for the `watchreload` binary.
//!
//! - [`host::CommandHost`] is the [`crate::reload::ReloadHost`] used by the
//!   binary: it derives what to watch from the config file (re-read every
//!   tick) and forwards relevant changes to the supervisor.
//! - [`supervisor`] owns the child process and restarts it on demand.

pub mod host;
pub mod supervisor;

pub use host::CommandHost;
pub use supervisor::{spawn_supervisor, SupervisorHandle};
