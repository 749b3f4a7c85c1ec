mod common;
use crate::common::{init_tracing, TestResult};

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tempfile::NamedTempFile;

use watchreload::config::loader::{load_and_validate, load_from_fs};
use watchreload::errors::WatchreloadError;
use watchreload::fs::mock::MockFileSystem;
use watchreload::types::Backend;
use watchreload::watch::DirectoryGlobRegistration;

fn write_config(contents: &str) -> Result<NamedTempFile, Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn full_config_parses_and_resolves_paths() -> TestResult {
    init_tracing();

    let file = write_config(
        r#"
[watch]
files = ["app.py", "/etc/app/settings.py"]
search_paths = ["lib"]
poll_interval_ms = 250
backend = "poll"
match_hidden = false

[[watch.dir]]
path = "templates"
patterns = ["*.html", "**/*.css"]

[command]
cmd = "python app.py"
"#,
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.watch.backend, Backend::Poll);
    assert_eq!(cfg.poll_interval(), Duration::from_millis(250));
    assert!(!cfg.glob_options().match_hidden);
    assert_eq!(cfg.command.as_ref().map(|c| c.cmd.as_str()), Some("python app.py"));

    let state = cfg.host_state(Path::new("/srv/site"));
    assert_eq!(
        state.files,
        vec![
            PathBuf::from("/srv/site/app.py"),
            PathBuf::from("/etc/app/settings.py"),
        ]
    );
    assert_eq!(
        state.directory_globs,
        vec![DirectoryGlobRegistration::new(
            "/srv/site/templates",
            ["*.html", "**/*.css"]
        )]
    );
    assert_eq!(state.search_paths, vec![PathBuf::from("/srv/site/lib")]);
    Ok(())
}

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let file = write_config("")?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.watch.backend, Backend::Native);
    assert_eq!(cfg.poll_interval(), Duration::from_millis(100));
    assert!(cfg.glob_options().match_hidden);
    assert!(cfg.command.is_none());
    assert!(cfg.host_state(Path::new("/x")).files.is_empty());
    Ok(())
}

#[test]
fn zero_poll_interval_is_rejected() -> TestResult {
    let file = write_config("[watch]\npoll_interval_ms = 0\n")?;

    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchreloadError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn directory_without_patterns_is_rejected() -> TestResult {
    let file = write_config("[[watch.dir]]\npath = \"src\"\npatterns = []\n")?;

    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchreloadError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn invalid_pattern_is_rejected() -> TestResult {
    let file = write_config("[[watch.dir]]\npath = \"src\"\npatterns = [\"[a-\"]\n")?;

    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchreloadError::InvalidPattern { .. })
    ));
    Ok(())
}

#[test]
fn blank_command_is_rejected() -> TestResult {
    let file = write_config("[command]\ncmd = \"   \"\n")?;

    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchreloadError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn malformed_toml_and_unknown_backend_are_errors() -> TestResult {
    let file = write_config("[watch\n")?;
    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchreloadError::TomlError(_))
    ));

    let file = write_config("[watch]\nbackend = \"fsevents\"\n")?;
    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchreloadError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/here/Watchreload.toml"),
        Err(WatchreloadError::IoError(_))
    ));
}

#[test]
fn load_from_fs_reads_through_the_trait() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/cfg/Watchreload.toml", "[watch]\nfiles = [\"main.py\"]\n");

    let cfg = load_from_fs(&fs, Path::new("/cfg/Watchreload.toml"))?;
    assert_eq!(cfg.watch.files, vec![PathBuf::from("main.py")]);

    assert!(load_from_fs(&fs, Path::new("/cfg/missing.toml")).is_err());
    Ok(())
}

#[test]
fn backend_from_str() {
    assert_eq!(Backend::from_str("native"), Ok(Backend::Native));
    assert_eq!(Backend::from_str(" POLL "), Ok(Backend::Poll));
    assert!(Backend::from_str("kqueue").is_err());
    assert_eq!(Backend::default(), Backend::Native);
}
