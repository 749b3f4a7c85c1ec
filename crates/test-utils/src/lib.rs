//! Shared fixtures for watchreload's integration tests.
//!
//! - [`ScriptedSource`]: a change source fed by the test instead of the OS.
//! - [`RecordingHost`]: a reload host whose state the test controls.
//! - [`HostStateBuilder`]: terse host state setup.

pub mod builders;
pub mod recording_host;
pub mod scripted_source;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

pub use builders::HostStateBuilder;
pub use recording_host::RecordingHost;
pub use scripted_source::{ScriptStep, ScriptedSource};

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a test-captured tracing subscriber once per test binary.
///
/// Output only shows up for failing tests (or with `--nocapture`). The
/// filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_names(true)
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test step timed out after {TEST_TIMEOUT:?}"))
}
