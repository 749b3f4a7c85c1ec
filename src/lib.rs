// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod reload;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::exec::{spawn_supervisor, CommandHost};
use crate::fs::{FileSystem, RealFileSystem};
use crate::reload::{ActivitySignal, ReloadCoordinator, ReloaderSlot};
use crate::watch::{MutableWatchSession, NotifySource, WatchRegistry};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the command supervisor and the config-backed host
/// - watch session + reload coordinator, installed into a reloader slot
/// - Ctrl-C (stop) and, on Unix, SIGHUP (re-derive watched files now)
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = std::path::absolute(&args.config)
        .with_context(|| format!("resolving config path {:?}", args.config))?;
    let cfg = load_and_validate(&config_path)?;
    let base_dir = config_root_dir(&config_path);

    if args.dry_run {
        print_dry_run(&cfg, &config_path, &base_dir)?;
        return Ok(());
    }

    let backend = args.backend.unwrap_or(cfg.watch.backend);
    let poll_interval = args
        .poll_interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| cfg.poll_interval());
    info!(?backend, ?poll_interval, config = ?config_path, "starting watchreload");

    let supervisor = spawn_supervisor(cfg.command.as_ref().map(|c| c.cmd.clone()));

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let options = cfg.glob_options();
    let host = CommandHost::new(config_path, cfg, Arc::clone(&fs), supervisor.sender());

    let session = MutableWatchSession::new(Arc::new(NotifySource::new(backend)), poll_interval);
    let activity = ActivitySignal::new();
    let coordinator = ReloadCoordinator::new(host, session, options)
        .with_file_system(fs)
        .with_activity_signal(activity.clone());

    let mut slot = ReloaderSlot::new();
    slot.install(Box::new(coordinator));

    // Ctrl-C → graceful shutdown.
    if let Some(stop) = slot.stop_handle() {
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; stopping");
            stop.stop();
        });
    }

    #[cfg(unix)]
    spawn_hangup_listener(activity);

    let result = slot.run().await;

    // Dropping the reloader drops the host's sender; the supervisor then
    // stops the child and exits.
    drop(slot);
    supervisor.shutdown().await;

    result.map_err(Into::into)
}

/// SIGHUP asks the reloader to re-derive its watched files immediately.
#[cfg(unix)]
fn spawn_hangup_listener(activity: ActivitySignal) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangups = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to listen for SIGHUP: {e}");
                return;
            }
        };
        while hangups.recv().await.is_some() {
            debug!("SIGHUP received; forcing refresh");
            activity.trigger();
        }
    });
}

/// Directory that relative config entries are resolved against.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: registrations and the resolved root set.
fn print_dry_run(cfg: &ConfigFile, config_path: &Path, base_dir: &Path) -> Result<()> {
    let mut state = cfg.host_state(base_dir);
    state.files.push(config_path.to_path_buf());

    let mut registry = WatchRegistry::new(cfg.glob_options());
    let snapshot = registry.refresh(state.files.clone(), state.directory_globs.clone())?;
    let fs = RealFileSystem;
    let roots = watch::resolve(&snapshot, &state.search_paths, &fs);

    println!("watchreload dry-run");
    println!("  watch.backend = {:?}", cfg.watch.backend);
    println!("  watch.poll_interval_ms = {}", cfg.watch.poll_interval_ms);
    println!("  watch.match_hidden = {}", cfg.watch.match_hidden);
    if let Some(command) = &cfg.command {
        println!("  command.cmd = {}", command.cmd);
    }
    println!();

    println!("files ({}):", state.files.len());
    for file in state.files.iter() {
        let marker = if fs.exists(file) { "" } else { " (missing)" };
        println!("  - {}{marker}", file.display());
    }

    println!("directories ({}):", state.directory_globs.len());
    for registration in state.directory_globs.iter() {
        let marker = if fs.is_dir(&registration.root) { "" } else { " (missing)" };
        println!(
            "  - {}{marker}: {:?}",
            registration.root.display(),
            registration.patterns
        );
    }

    if !state.search_paths.is_empty() {
        println!("search paths ({}):", state.search_paths.len());
        for path in state.search_paths.iter() {
            println!("  - {}", path.display());
        }
    }

    println!("roots ({}):", roots.len());
    for root in roots.iter() {
        println!("  - {}", root.display());
    }

    debug!("dry-run complete (nothing watched)");
    Ok(())
}
