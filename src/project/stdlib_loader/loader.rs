use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::base::DocId;
use crate::parser::{PendingToResolve, parse_symbols};
use crate::project::workspace_loader::{collect_source_paths, doc_id_for_path};
use crate::symbols::UnitModules;

/// Parses every stdlib source under `stdlib_root` into one document.
///
/// Modules keep the file they were declared in, while the unit and its
/// pending work are filed under `stdlib_id`. Files that cannot be read are
/// skipped with a warning.
pub fn load_from_sources(stdlib_root: &Path, stdlib_id: &DocId) -> Result<(UnitModules, PendingToResolve), String> {
    if !stdlib_root.is_dir() {
        return Err(format!("Directory not found: {}", stdlib_root.display()));
    }

    let file_paths = collect_source_paths(stdlib_root)?;

    // Parse files in parallel
    let results: Vec<_> = file_paths
        .par_iter()
        .map(|path| (path, parse_file(path)))
        .collect();

    let mut unit = UnitModules::new(stdlib_id.clone());
    let mut pending = PendingToResolve::new();
    for (path, result) in results {
        match result {
            Ok((file_unit, mut file_pending)) => {
                file_pending.rename_doc(file_unit.doc_id(), stdlib_id);
                for module in file_unit.into_modules() {
                    unit.register_module(module);
                }
                pending.extend(file_pending);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping stdlib file"),
        }
    }

    debug!(
        root = %stdlib_root.display(),
        files = file_paths.len(),
        modules = unit.len(),
        "parsed stdlib sources"
    );
    Ok((unit, pending))
}

fn parse_file(path: &PathBuf) -> Result<(UnitModules, PendingToResolve), String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    Ok(parse_symbols(&doc_id_for_path(path), &text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_files_under_one_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("io")).unwrap();
        std::fs::write(dir.path().join("io/file.c3"), "module std::io;\nstruct File { int fd; }").unwrap();
        std::fs::write(
            dir.path().join("io/print.c3"),
            "module std::io;\nfn void printn(String s) {}\nFile stdout_file;",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not c3").unwrap();

        let stdlib_id = DocId::from("_stdlib_0.7.1");
        let (unit, pending) = load_from_sources(dir.path(), &stdlib_id).unwrap();

        assert_eq!(unit.doc_id(), &stdlib_id);
        assert_eq!(unit.len(), 1);
        let io = unit.get("std::io").unwrap();
        assert!(io.structure("File").is_some());
        assert!(io.function("printn").is_some());
        assert!(io.function("printn").unwrap().base().doc_id().as_str().ends_with("print.c3"));
        assert!(pending.types().all(|p| p.doc_id == stdlib_id));
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_sources(&dir.path().join("nope"), &DocId::from("_stdlib")).is_err());
    }
}
