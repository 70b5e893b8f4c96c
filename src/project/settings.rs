//! Runtime settings: `c3lsp.json`, client configuration and defaults.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// Language version assumed when neither the settings nor the compiler
/// name one.
pub const DEFAULT_LANGUAGE_VERSION: &str = "0.7.1";

/// Workspace configuration file name.
pub const CONFIG_FILE_NAME: &str = "c3lsp.json";

static COMPILER_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"C3 Compiler Version:\s+(\d+\.\d+\.\d+)").unwrap());

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct C3Settings {
    /// Requested language version; selects the stdlib.
    pub version: Option<String>,
    /// The `c3c` binary.
    pub path: Option<PathBuf>,
    /// Root of the stdlib sources.
    pub stdlib_path: Option<PathBuf>,
    /// Extra arguments for `c3c build --lsp`.
    pub compile_args: Vec<String>,
}

impl C3Settings {
    /// The compiler binary to run.
    pub fn binary(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("c3c"))
    }

    /// Where the stdlib sources live: `stdlib-path`, or `lib/std` next to
    /// the configured compiler.
    pub fn stdlib_root(&self) -> Option<PathBuf> {
        if let Some(path) = &self.stdlib_path {
            return Some(path.clone());
        }
        let compiler = self.path.as_ref()?;
        let dir = if compiler.is_dir() {
            compiler.as_path()
        } else {
            compiler.parent()?
        };
        Some(dir.join("lib").join("std"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiagnosticsSettings {
    pub enabled: bool,
    /// Debounce window in milliseconds.
    pub delay: u64,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: 2000,
        }
    }
}

/// Every setting the server honours.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub c3: C3Settings,
    pub diagnostics: DiagnosticsSettings,
    pub log_path: Option<PathBuf>,
    pub debug: bool,
}

impl Settings {
    /// Merge `c3lsp.json` from `workspace_root`, if there is one.
    ///
    /// Returns whether the file existed.
    pub fn load_workspace_file(&mut self, workspace_root: &Path) -> Result<bool, ConfigError> {
        let path = workspace_root.join(CONFIG_FILE_NAME);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no workspace configuration");
                return Ok(false);
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        let value: Value = serde_json::from_str(&text)?;
        self.apply_change(&value)?;
        info!(path = %path.display(), "loaded workspace configuration");
        Ok(true)
    }

    /// Merge a settings object such as a `didChangeConfiguration` payload.
    ///
    /// Sections may be spelled `C3`/`c3` and `Diagnostics`/`diagnostics`;
    /// only the keys present are changed. Returns whether anything changed.
    pub fn apply_change(&mut self, value: &Value) -> Result<bool, ConfigError> {
        let before = self.clone();

        if let Some(section) = section(value, "c3") {
            let patch: C3Patch = serde_json::from_value(section.clone())?;
            patch.apply(&mut self.c3);
        }
        if let Some(section) = section(value, "diagnostics") {
            let patch: DiagnosticsPatch = serde_json::from_value(section.clone())?;
            if let Some(enabled) = patch.enabled {
                self.diagnostics.enabled = enabled;
            }
            if let Some(delay) = patch.delay {
                self.diagnostics.delay = delay;
            }
        }
        if let Some(path) = section(value, "log-path").and_then(Value::as_str) {
            self.log_path = Some(PathBuf::from(path));
        }
        if let Some(debug) = section(value, "debug").and_then(Value::as_bool) {
            self.debug = debug;
        }
        Ok(*self != before)
    }

    /// The language version to load: configured, else detected from the
    /// compiler, else [`DEFAULT_LANGUAGE_VERSION`].
    pub fn language_version(&self, detected: Option<&str>) -> String {
        self.c3
            .version
            .clone()
            .or_else(|| detected.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_LANGUAGE_VERSION.to_string())
    }
}

fn section<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct C3Patch {
    version: Option<String>,
    path: Option<PathBuf>,
    stdlib_path: Option<PathBuf>,
    compile_args: Option<Vec<String>>,
}

impl C3Patch {
    fn apply(self, c3: &mut C3Settings) {
        if self.version.is_some() {
            c3.version = self.version;
        }
        if self.path.is_some() {
            c3.path = self.path;
        }
        if self.stdlib_path.is_some() {
            c3.stdlib_path = self.stdlib_path;
        }
        if let Some(args) = self.compile_args {
            c3.compile_args = args;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DiagnosticsPatch {
    enabled: Option<bool>,
    delay: Option<u64>,
}

/// Extract `x.y.z` from `c3c --version` output.
pub fn parse_compiler_version(output: &str) -> Option<String> {
    COMPILER_VERSION
        .captures(output)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
