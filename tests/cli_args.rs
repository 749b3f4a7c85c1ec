use std::path::PathBuf;

use clap::Parser;

use watchreload::cli::{CliArgs, LogLevel};
use watchreload::types::Backend;

#[test]
fn defaults() {
    let args = CliArgs::try_parse_from(["watchreload"]).expect("valid args");

    assert_eq!(args.config, PathBuf::from("Watchreload.toml"));
    assert!(args.log_level.is_none());
    assert!(args.backend.is_none());
    assert!(args.poll_interval_ms.is_none());
    assert!(!args.dry_run);
}

#[test]
fn overrides() {
    let args = CliArgs::try_parse_from([
        "watchreload",
        "--config",
        "conf/dev.toml",
        "--log-level",
        "debug",
        "--backend",
        "poll",
        "--poll-interval-ms",
        "500",
        "--dry-run",
    ])
    .expect("valid args");

    assert_eq!(args.config, PathBuf::from("conf/dev.toml"));
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert_eq!(args.backend, Some(Backend::Poll));
    assert_eq!(args.poll_interval_ms, Some(500));
    assert!(args.dry_run);
}

#[test]
fn zero_poll_interval_is_rejected() {
    assert!(CliArgs::try_parse_from(["watchreload", "--poll-interval-ms", "0"]).is_err());

    let args = CliArgs::try_parse_from(["watchreload", "--poll-interval-ms", "1"])
        .expect("valid args");
    assert_eq!(args.poll_interval_ms, Some(1));
}

#[test]
fn unknown_backend_is_rejected() {
    assert!(CliArgs::try_parse_from(["watchreload", "--backend", "kqueue"]).is_err());
}
