mod common;
use crate::common::{init_tracing, snapshot_of};

use std::path::{Path, PathBuf};

use watchreload::fs::mock::MockFileSystem;
use watchreload::watch::{resolve, RootSet};

fn roots_vec(roots: &RootSet) -> Vec<PathBuf> {
    roots.iter().map(Path::to_path_buf).collect()
}

#[test]
fn explicit_file_resolves_to_its_parent() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/tmp/x/a.py", "print('a')");

    let snapshot = snapshot_of(&["/tmp/x/a.py"], &[]);
    let roots = resolve(&snapshot, &[], &fs);

    assert_eq!(roots_vec(&roots), vec![PathBuf::from("/tmp/x")]);
}

#[test]
fn nested_roots_collapse_to_ancestor() {
    let fs = MockFileSystem::new();
    fs.add_dir("/tmp/proj/sub");

    let snapshot = snapshot_of(&[], &[("/tmp/proj", &["*.py"]), ("/tmp/proj/sub", &["*.html"])]);
    let roots = resolve(&snapshot, &[], &fs);

    assert_eq!(roots_vec(&roots), vec![PathBuf::from("/tmp/proj")]);
}

#[test]
fn sibling_with_common_prefix_is_not_collapsed() {
    let roots = RootSet::collapse(["/tmp/proj", "/tmp/proj-a", "/tmp/proj/sub"]);

    assert_eq!(
        roots_vec(&roots),
        vec![PathBuf::from("/tmp/proj"), PathBuf::from("/tmp/proj-a")]
    );
}

#[test]
fn union_of_files_globs_and_search_paths() {
    let fs = MockFileSystem::new();
    fs.add_file("/srv/app/main.py", "");
    fs.add_dir("/srv/templates");
    fs.add_dir("/usr/lib/python/site");

    let snapshot = snapshot_of(&["/srv/app/main.py"], &[("/srv/templates", &["*.html"])]);
    let search_paths = vec![PathBuf::from("/usr/lib/python/site")];
    let roots = resolve(&snapshot, &search_paths, &fs);

    assert_eq!(
        roots_vec(&roots),
        vec![
            PathBuf::from("/srv/app"),
            PathBuf::from("/srv/templates"),
            PathBuf::from("/usr/lib/python/site"),
        ]
    );
}

#[test]
fn missing_directories_are_skipped_and_rechecked() {
    let fs = MockFileSystem::new();
    fs.add_dir("/work");

    let snapshot = snapshot_of(&[], &[("/work", &["*.txt"]), ("/work-later", &["*.txt"])]);

    let roots = resolve(&snapshot, &[], &fs);
    assert_eq!(roots_vec(&roots), vec![PathBuf::from("/work")]);

    // The directory appears later; the next resolution picks it up.
    fs.add_dir("/work-later");
    let roots = resolve(&snapshot, &[], &fs);
    assert_eq!(
        roots_vec(&roots),
        vec![PathBuf::from("/work"), PathBuf::from("/work-later")]
    );

    // And drops it again once it is gone.
    fs.remove("/work-later");
    let roots = resolve(&snapshot, &[], &fs);
    assert_eq!(roots_vec(&roots), vec![PathBuf::from("/work")]);
}

#[test]
fn every_registration_is_covered() {
    let fs = MockFileSystem::new();
    fs.add_file("/a/b/c/file.py", "");
    fs.add_file("/a/other.py", "");
    fs.add_dir("/a/b/templates");
    fs.add_dir("/z");

    let snapshot = snapshot_of(
        &["/a/b/c/file.py", "/a/other.py"],
        &[("/a/b/templates", &["*.html"]), ("/z", &["**/*"])],
    );
    let roots = resolve(&snapshot, &[], &fs);

    for dir in ["/a/b/c", "/a", "/a/b/templates", "/z"] {
        assert!(roots.covers(Path::new(dir)), "{dir} not covered by {roots:?}");
    }
    assert_eq!(roots.len(), 2);
}

#[test]
fn parent_segments_are_resolved_before_collapsing() {
    let fs = MockFileSystem::new();
    fs.add_file("/tmp/proj/Watchreload.toml", "");
    fs.add_dir("/tmp/lib");
    fs.add_dir("/tmp/shared");

    let snapshot = snapshot_of(
        &["/tmp/proj/Watchreload.toml", "/tmp/proj/../shared/x.py"],
        &[("/tmp/proj/../lib", &["*.html"])],
    );
    let search_paths = vec![PathBuf::from("/tmp/proj/./sub/../../lib")];
    let roots = resolve(&snapshot, &search_paths, &fs);

    assert_eq!(
        roots_vec(&roots),
        vec![
            PathBuf::from("/tmp/lib"),
            PathBuf::from("/tmp/proj"),
            PathBuf::from("/tmp/shared"),
        ]
    );
}

#[test]
fn sibling_of_a_real_directory_stays_a_root() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::TempDir::new()?;
    let proj = tmp.path().join("proj");
    let lib = tmp.path().join("lib");
    std::fs::create_dir(&proj)?;
    std::fs::create_dir(&lib)?;
    std::fs::write(proj.join("Watchreload.toml"), "")?;

    let snapshot = snapshot_of(
        &[proj.join("Watchreload.toml").to_str().unwrap()],
        &[(proj.join("../lib").to_str().unwrap(), &["*.html"])],
    );
    let roots = resolve(&snapshot, &[], &watchreload::fs::RealFileSystem);

    assert!(roots.covers(&lib), "{lib:?} not covered by {roots:?}");
    assert!(roots.covers(&proj));
    assert_eq!(roots.len(), 2);
    Ok(())
}

#[test]
fn collapse_normalises_members() {
    let roots = RootSet::collapse(["/proj", "/proj/../lib", "/proj/./src"]);

    assert_eq!(
        roots_vec(&roots),
        vec![PathBuf::from("/lib"), PathBuf::from("/proj")]
    );
}

#[test]
fn root_set_equality_is_by_value() {
    let a = RootSet::collapse(["/b", "/a"]);
    let b: RootSet = ["/a", "/b", "/a/nested"].into_iter().collect();

    assert_eq!(a, b);
}
