//! On-disk cache of an indexed stdlib.
//!
//! One JSON file per language version under the user cache directory:
//! `<cache>/c3-lsp/stdlib/stdlib_<version>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::StdlibError;
use crate::base::DocId;
use crate::symbols::{Module, UnitModules};

/// Bumped whenever the serialized symbol layout changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CacheFile {
    format_version: u32,
    language_version: String,
    doc_id: DocId,
    modules: Vec<Module>,
}

/// The default cache directory, if the platform has one.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("c3-lsp").join("stdlib"))
}

pub fn cache_file_path(cache_dir: &Path, version: &str) -> PathBuf {
    cache_dir.join(format!("stdlib_{version}.json"))
}

/// Read the cached stdlib for `version`.
pub fn read(cache_dir: &Path, version: &str) -> Result<UnitModules, StdlibError> {
    let path = cache_file_path(cache_dir, version);
    let text = fs::read_to_string(&path).map_err(|source| StdlibError::Io { path, source })?;
    let file: CacheFile = serde_json::from_str(&text)?;

    if file.format_version != FORMAT_VERSION {
        return Err(StdlibError::FormatMismatch {
            found: file.format_version,
            expected: FORMAT_VERSION,
        });
    }
    if file.language_version != version {
        return Err(StdlibError::VersionMismatch {
            found: file.language_version,
            expected: version.to_string(),
        });
    }

    let mut unit = UnitModules::new(file.doc_id);
    for module in file.modules {
        unit.register_module(module);
    }
    Ok(unit)
}

/// Write `unit` as the cached stdlib for `version`.
pub fn write(cache_dir: &Path, version: &str, unit: &UnitModules) -> Result<PathBuf, StdlibError> {
    fs::create_dir_all(cache_dir).map_err(|source| StdlibError::Io {
        path: cache_dir.to_path_buf(),
        source,
    })?;

    let file = CacheFile {
        format_version: FORMAT_VERSION,
        language_version: version.to_string(),
        doc_id: unit.doc_id().clone(),
        modules: unit.modules().cloned().collect(),
    };
    let path = cache_file_path(cache_dir, version);
    let json = serde_json::to_string(&file)?;
    fs::write(&path, json).map_err(|source| StdlibError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
