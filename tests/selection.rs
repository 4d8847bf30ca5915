// tests/selection.rs

use squidrun::errors::RunnerError;
use squidrun::selection::Selection;

#[test]
fn empty_selection_runs_everything() {
    let all = Selection::all();
    assert!(!all.is_skipped("api"));
    assert!(!all.is_skipped("worker"));
}

#[test]
fn exclude_skips_only_listed_names() {
    let sel = Selection::exclude(&["api"]);
    assert!(sel.is_skipped("api"));
    assert!(!sel.is_skipped("worker"));
}

#[test]
fn include_skips_everything_else() {
    let sel = Selection::include(&["worker"]);
    assert!(!sel.is_skipped("worker"));
    assert!(sel.is_skipped("other"));
    assert!(sel.is_skipped("api"));
}

#[test]
fn include_and_exclude_are_mutually_exclusive() {
    let result = Selection::new(vec!["a".to_string()], vec!["b".to_string()]);
    assert!(matches!(result, Err(RunnerError::ConfigError(_))));

    assert!(Selection::new(vec!["a".to_string()], Vec::new()).is_ok());
    assert!(Selection::new(Vec::new(), vec!["b".to_string()]).is_ok());
}

#[test]
fn unknown_names_are_listed() {
    let sel = Selection::include(&["worker", "ghost"]);
    assert_eq!(sel.unknown_names(&["api", "worker"]), vec!["ghost"]);
}
