//! Standard library symbols for a language version.
//!
//! The stdlib is registered as a single synthetic document,
//! `_stdlib_<version>`, built from the first source that works:
//!
//! 1. the cache file for the version;
//! 2. the stdlib sources, parsed in parallel, after which the cache is
//!    written;
//! 3. nothing, leaving an empty stdlib.

pub mod cache;
mod loader;

pub use loader::load_from_sources;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::base::DocId;
use crate::parser::PendingToResolve;
use crate::symbols::UnitModules;

#[derive(Debug, Error)]
pub enum StdlibError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed stdlib cache: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stdlib cache is for version {found}, expected {expected}")]
    VersionMismatch { found: String, expected: String },
    #[error("stdlib cache format {found} is not supported (expected {expected})")]
    FormatMismatch { found: u32, expected: u32 },
}

/// The document id the stdlib of `version` is registered under.
pub fn stdlib_doc_id(version: &str) -> DocId {
    DocId::new(format!("_stdlib_{version}"))
}

/// Where a loaded stdlib came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StdlibSource {
    Cache,
    Sources,
    Empty,
}

#[derive(Debug)]
pub struct LoadedStdlib {
    pub unit: UnitModules,
    pub pending: PendingToResolve,
    pub source: StdlibSource,
}

/// Load the stdlib for `version`; never fails, falling back to an empty
/// stdlib.
pub fn load(version: &str, stdlib_root: Option<&Path>, cache_dir: Option<&Path>) -> LoadedStdlib {
    let doc_id = stdlib_doc_id(version);

    if let Some(dir) = cache_dir {
        match cache::read(dir, version) {
            Ok(mut unit) => {
                info!(version, modules = unit.len(), "loaded stdlib from cache");
                unit.set_doc_id(doc_id);
                return LoadedStdlib {
                    unit,
                    pending: PendingToResolve::new(),
                    source: StdlibSource::Cache,
                };
            }
            Err(StdlibError::Io { .. }) => {}
            Err(e) => warn!(version, error = %e, "ignoring stdlib cache"),
        }
    }

    if let Some(root) = stdlib_root {
        match load_from_sources(root, &doc_id) {
            Ok((unit, pending)) => {
                info!(version, root = %root.display(), modules = unit.len(), "indexed stdlib sources");
                return LoadedStdlib {
                    unit,
                    pending,
                    source: StdlibSource::Sources,
                };
            }
            Err(e) => warn!(version, error = %e, "could not index stdlib sources"),
        }
    }

    warn!(version, "no stdlib available; continuing with user code only");
    LoadedStdlib {
        unit: UnitModules::new(doc_id),
        pending: PendingToResolve::new(),
        source: StdlibSource::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_sources_then_empty() {
        let cache_dir = tempfile::tempdir().unwrap();
        let sources = tempfile::tempdir().unwrap();
        std::fs::write(sources.path().join("math.c3"), "module std::math;\nfn int abs(int x) => x;").unwrap();

        let loaded = load("0.7.1", Some(sources.path()), Some(cache_dir.path()));
        assert_eq!(loaded.source, StdlibSource::Sources);
        assert_eq!(loaded.unit.doc_id(), &stdlib_doc_id("0.7.1"));
        assert!(loaded.unit.get("std::math").is_some());

        let empty = load("0.7.1", None, Some(cache_dir.path()));
        assert_eq!(empty.source, StdlibSource::Empty);
        assert!(empty.unit.is_empty());
    }

    #[test]
    fn test_prefers_cache() {
        let cache_dir = tempfile::tempdir().unwrap();
        let (unit, _) = crate::parser::parse_symbols(&DocId::from("file:///std/a.c3"), "module std::a;\nint x;");
        cache::write(cache_dir.path(), "0.6.0", &unit).unwrap();

        let loaded = load("0.6.0", None, Some(cache_dir.path()));
        assert_eq!(loaded.source, StdlibSource::Cache);
        assert_eq!(loaded.unit.doc_id(), &stdlib_doc_id("0.6.0"));
        assert!(loaded.unit.get("std::a").is_some_and(|m| m.variable("x").is_some()));
    }
}
