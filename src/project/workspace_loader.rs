use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::Url;
use tracing::debug;
use walkdir::WalkDir;

use super::ProjectState;
use crate::base::DocId;

/// File extensions indexed as C3 sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["c3", "c3i"];

/// Loads workspace files from disk into a [`ProjectState`].
///
/// Loaded documents are not owned by the editor; opening one later hands
/// it over.
pub struct WorkspaceLoader;

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads all C3 sources below a directory.
    pub fn load_directory_into_state<P: Into<PathBuf>>(
        &self,
        path: P,
        state: &mut ProjectState,
    ) -> Result<(), String> {
        let path = path.into();
        if !path.is_dir() {
            return Err(format!("Directory not found: {}", path.display()));
        }

        let paths = collect_source_paths(&path)?;
        let mut errors = Vec::new();

        for path in &paths {
            if let Err(e) = self.load_file_into_state(path, state) {
                errors.push(e);
            }
        }
        debug!(root = %path.display(), files = paths.len(), failed = errors.len(), "indexed workspace");

        if errors.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "Failed to load {} file(s):\n  {}",
                errors.len(),
                errors.join("\n  ")
            ))
        }
    }

    /// Loads a single file, unless the editor already owns it.
    pub fn load_file_into_state<P: AsRef<Path>>(
        &self,
        path: P,
        state: &mut ProjectState,
    ) -> Result<(), String> {
        let path = path.as_ref();
        let doc_id = doc_id_for_path(path);
        if state.is_owned_by_editor(&doc_id) {
            return Ok(());
        }
        let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        state.index_document(doc_id, text);
        Ok(())
    }
}

impl Default for WorkspaceLoader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_source_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Every C3 source below `dir`, in a stable order.
pub fn collect_source_paths(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| format!("{}: {}", dir.display(), e))?;
        if entry.file_type().is_file() && is_source_path(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// The `file://` URI of a path, as clients spell document ids.
pub fn doc_id_for_path(path: &Path) -> DocId {
    match Url::from_file_path(path) {
        Ok(url) => DocId::new(url.as_str()),
        Err(()) => DocId::new(path.to_string_lossy()),
    }
}

/// The file behind a `file://` document id.
pub fn path_for_doc_id(doc_id: &DocId) -> Option<PathBuf> {
    Url::parse(doc_id.as_str()).ok()?.to_file_path().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_only_c3_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/main.c3"), "module app;").unwrap();
        std::fs::write(dir.path().join("src/nested/api.c3i"), "module api;").unwrap();
        std::fs::write(dir.path().join("README.md"), "# app").unwrap();

        let paths = collect_source_paths(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["main.c3", "api.c3i"]);
    }

    #[test]
    fn test_doc_id_round_trips_through_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c3");
        let doc_id = doc_id_for_path(&path);

        assert!(doc_id.as_str().starts_with("file://"));
        assert_eq!(doc_id.file_name(), "main.c3");
        assert_eq!(path_for_doc_id(&doc_id), Some(path));
        assert_eq!(path_for_doc_id(&DocId::from("_stdlib_0.7.1")), None);
    }

    #[test]
    fn test_load_directory_into_state() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.c3"), "module app;\nint value;").unwrap();
        std::fs::write(dir.path().join("b.c3"), "module app::util;\nfn void help() {}").unwrap();

        let mut state = ProjectState::new();
        WorkspaceLoader::new().load_directory_into_state(dir.path(), &mut state).unwrap();

        assert_eq!(state.documents().count(), 2);
        assert_eq!(state.search_by_fqn("app::value").len(), 1);
        assert_eq!(state.search_by_fqn("app::util::help").len(), 1);
        assert!(state.documents().all(|d| !d.is_owned_by_editor()));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = ProjectState::new();
        let result = WorkspaceLoader::new().load_directory_into_state(dir.path().join("missing"), &mut state);
        assert!(result.unwrap_err().starts_with("Directory not found"));
    }
}
