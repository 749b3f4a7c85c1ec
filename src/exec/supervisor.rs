// src/exec/supervisor.rs

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Handle to the background supervisor task.
///
/// Send a changed path through [`SupervisorHandle::sender`] to request a
/// restart. Once every sender is dropped the supervisor stops the child and
/// exits.
#[derive(Debug)]
pub struct SupervisorHandle {
    tx: mpsc::UnboundedSender<PathBuf>,
    task: JoinHandle<()>,
}

impl SupervisorHandle {
    pub fn sender(&self) -> mpsc::UnboundedSender<PathBuf> {
        self.tx.clone()
    }

    /// Drop our sender and wait for the supervisor to wind down.
    pub async fn shutdown(self) {
        let SupervisorHandle { tx, task } = self;
        drop(tx);
        if let Err(err) = task.await {
            warn!(error = %err, "supervisor task ended abnormally");
        }
    }
}

/// Spawn the supervisor loop.
///
/// With `Some(cmd)` the command is started immediately and restarted after
/// every burst of change notifications. With `None` notifications are only
/// drained; the coordinator has already logged them.
pub fn spawn_supervisor(cmd: Option<String>) -> SupervisorHandle {
    let (tx, rx) = mpsc::unbounded_channel::<PathBuf>();
    let task = tokio::spawn(supervise(cmd, rx));
    SupervisorHandle { tx, task }
}

async fn supervise(cmd: Option<String>, mut rx: mpsc::UnboundedReceiver<PathBuf>) {
    info!(cmd = ?cmd, "supervisor started");
    let mut child = cmd.as_deref().and_then(start_logged);

    while let Some(path) = rx.recv().await {
        // One restart per burst: a single batch usually reports several files.
        let mut coalesced = 1usize;
        while rx.try_recv().is_ok() {
            coalesced += 1;
        }

        let Some(cmd) = cmd.as_deref() else {
            debug!(?path, coalesced, "change reported; no command configured");
            continue;
        };

        info!(trigger = ?path, coalesced, "restarting command");
        if let Some(mut running) = child.take() {
            stop_child(&mut running).await;
        }
        child = start_logged(cmd);
    }

    if let Some(mut running) = child.take() {
        stop_child(&mut running).await;
    }
    info!("supervisor finished (channel closed)");
}

fn start_logged(cmd: &str) -> Option<Child> {
    match start(cmd) {
        Ok(child) => Some(child),
        Err(err) => {
            error!(cmd = %cmd, error = %err, "failed to start command");
            None
        }
    }
}

fn start(cmd_line: &str) -> Result<Child> {
    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    };

    // The child owns the terminal; our own logs go to stderr.
    cmd.stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .with_context(|| format!("spawning process for '{cmd_line}'"))?;
    info!(cmd = %cmd_line, pid = ?child.id(), "command started");
    Ok(child)
}

async fn stop_child(child: &mut Child) {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(exit_code = ?status.code(), "command had already exited");
            return;
        }
        Ok(None) => {}
        Err(err) => warn!(error = %err, "failed to poll command status"),
    }

    if let Err(err) = child.kill().await {
        warn!(error = %err, "failed to kill command");
    } else {
        debug!("command stopped");
    }
}
