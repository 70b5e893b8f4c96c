//! Loading a workspace and a stdlib from disk.

use std::fs;

use c3lsp::base::Position;
use c3lsp::project::stdlib_loader::{self, cache};
use c3lsp::project::workspace_loader::doc_id_for_path;
use c3lsp::project::{ProjectState, WorkspaceLoader};
use c3lsp::search;

#[test]
fn test_workspace_directory_is_indexed() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("src/util")).unwrap();
    fs::write(root.path().join("src/main.c3"), "module app;\nimport util;\nfn void main() { helper(); }").unwrap();
    fs::write(root.path().join("src/util/helper.c3i"), "module util;\nfn void helper();").unwrap();
    fs::write(root.path().join("README.md"), "not a source").unwrap();

    let mut state = ProjectState::new();
    WorkspaceLoader::new()
        .load_directory_into_state(root.path(), &mut state)
        .unwrap();

    assert_eq!(state.symbols().len(), 2);
    assert_eq!(state.search_by_fqn("util::helper").len(), 1);

    let main = doc_id_for_path(&root.path().join("src/main.c3"));
    let found = search::find_declaration(&state, &main, Position::new(2, 19)).expect("helper");
    assert_eq!(found.fqn(), "util::helper");
}

#[test]
fn test_open_document_wins_over_disk() {
    let root = tempfile::tempdir().unwrap();
    let path = root.path().join("main.c3");
    fs::write(&path, "module app;\nint on_disk;").unwrap();

    let mut state = ProjectState::new();
    let doc = doc_id_for_path(&path);
    state.open_document(doc.clone(), "module app;\nint in_editor;".into(), 3);
    WorkspaceLoader::new().load_file_into_state(&path, &mut state).unwrap();

    assert_eq!(state.search_by_fqn("app::in_editor").len(), 1);
    assert!(state.search_by_fqn("app::on_disk").is_empty());
}

#[test]
fn test_missing_directory_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let mut state = ProjectState::new();
    let result = WorkspaceLoader::new().load_directory_into_state(root.path().join("absent"), &mut state);
    assert!(result.is_err());
}

#[test]
fn test_stdlib_cached_after_first_load() {
    let sources = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(sources.path().join("io")).unwrap();
    fs::write(sources.path().join("io/io.c3"), "module std::io;\nfn void printn(String s) {}").unwrap();

    let mut state = ProjectState::new();
    state.set_language_version("0.7.1", Some(sources.path()), Some(cache_dir.path()));
    assert!(cache::cache_file_path(cache_dir.path(), "0.7.1").is_file());
    assert_eq!(state.stdlib_doc_id(), Some(&stdlib_loader::stdlib_doc_id("0.7.1")));
    assert_eq!(state.search_by_fqn("std::io::printn").len(), 1);

    // Sources gone: the cache alone must be enough.
    drop(sources);
    let mut fresh = ProjectState::new();
    fresh.set_language_version("0.7.1", None, Some(cache_dir.path()));
    assert_eq!(fresh.search_by_fqn("std::io::printn").len(), 1);
}

#[test]
fn test_switching_version_replaces_stdlib() {
    let sources = tempfile::tempdir().unwrap();
    fs::write(sources.path().join("math.c3"), "module std::math;\nfn int abs(int x) => x;").unwrap();

    let mut state = ProjectState::new();
    state.set_language_version("0.7.0", Some(sources.path()), None);
    assert_eq!(state.search_by_fqn("std::math::abs").len(), 1);

    state.set_language_version("0.7.1", None, None);
    assert_eq!(state.language_version(), Some("0.7.1"));
    assert!(state.search_by_fqn("std::math::abs").is_empty());
    assert!(state.symbols().get(&stdlib_loader::stdlib_doc_id("0.7.0")).is_none());
}
