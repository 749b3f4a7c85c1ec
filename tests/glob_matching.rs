mod common;
use crate::common::init_tracing;

use proptest::prelude::*;

use watchreload::errors::WatchreloadError;
use watchreload::watch::{matches, GlobOptions, Pattern, PatternSet};

#[test]
fn recursive_wildcard_matches_zero_or_more_segments() {
    init_tracing();

    assert!(matches("a/b/c.txt", "**/*.txt"));
    assert!(matches("a/c.txt", "**/*.txt"));
    assert!(matches("c.txt", "**/*.txt"));
}

#[test]
fn single_star_does_not_cross_separators() {
    assert!(matches("c.txt", "*.txt"));
    assert!(!matches("a/c.txt", "*.txt"));
    assert!(matches("a/c.txt", "a/*.txt"));
    assert!(!matches("a/b/c.txt", "a/*.txt"));
}

#[test]
fn recursive_wildcard_in_the_middle() {
    assert!(matches("src/main.rs", "src/**/*.rs"));
    assert!(matches("src/a/b/main.rs", "src/**/*.rs"));
    assert!(!matches("lib/main.rs", "src/**/*.rs"));
}

#[test]
fn question_mark_and_classes() {
    assert!(matches("a1.py", "a?.py"));
    assert!(!matches("a12.py", "a?.py"));
    assert!(!matches("a/.py", "a?.py"));
    assert!(matches("b.css", "[abc].css"));
    assert!(!matches("d.css", "[abc].css"));
    assert!(matches("d.css", "[!abc].css"));
}

#[test]
fn whole_path_is_matched_not_basename() {
    assert!(!matches("templates/index.html", "index.html"));
    assert!(matches("index.html", "index.html"));
}

#[test]
fn empty_relative_path_never_matches() {
    assert!(!matches("", "*"));
    assert!(!matches("", "**"));
    assert!(!matches("", "**/*.txt"));
}

#[test]
fn invalid_pattern_matches_nothing() {
    assert!(!matches("a.txt", "[a-"));
}

#[test]
fn invalid_pattern_is_a_structured_error() {
    match Pattern::new("[a-") {
        Err(WatchreloadError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "[a-"),
        other => panic!("expected InvalidPattern, got {:?}", other.map(|p| p.as_str().to_string())),
    }
}

#[test]
fn hidden_segments_follow_match_hidden_option() -> Result<(), Box<dyn std::error::Error>> {
    let pattern = Pattern::new("**/*.py")?;

    let visible = GlobOptions { match_hidden: true };
    let hidden_off = GlobOptions { match_hidden: false };

    assert!(pattern.is_match(".venv/lib/site.py", visible));
    assert!(!pattern.is_match(".venv/lib/site.py", hidden_off));
    assert!(!pattern.is_match(".hidden.py", hidden_off));
    assert!(pattern.is_match("pkg/mod.py", hidden_off));

    // A pattern that spells out a dot segment opts back in.
    let explicit = Pattern::new(".config/*.toml")?;
    assert!(explicit.is_match(".config/app.toml", hidden_off));

    Ok(())
}

#[test]
fn pattern_set_is_a_union() -> Result<(), Box<dyn std::error::Error>> {
    let set = PatternSet::new(["*.css", "*.html"], GlobOptions::default())?;

    assert_eq!(set.len(), 2);
    assert!(set.is_match("site.css"));
    assert!(set.is_match("index.html"));
    assert!(!set.is_match("test.py"));
    assert_eq!(set.patterns().collect::<Vec<_>>(), vec!["*.css", "*.html"]);

    Ok(())
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

proptest! {
    #[test]
    fn recursive_txt_matches_any_depth(
        dirs in proptest::collection::vec(segment(), 0..5),
        stem in segment(),
    ) {
        let mut parts = dirs.clone();
        parts.push(format!("{stem}.txt"));
        let rel = parts.join("/");

        prop_assert!(matches(&rel, "**/*.txt"));
        // Non-recursive only at top level.
        prop_assert_eq!(matches(&rel, "*.txt"), dirs.is_empty());
    }

    #[test]
    fn other_extensions_never_match(
        dirs in proptest::collection::vec(segment(), 0..5),
        stem in segment(),
    ) {
        let mut parts = dirs;
        parts.push(format!("{stem}.rs"));
        let rel = parts.join("/");

        prop_assert!(!matches(&rel, "**/*.txt"));
    }
}
