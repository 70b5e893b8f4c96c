//! Workspace state: documents, their symbols and the indices over them.
//!
//! [`ProjectState`] owns everything queries read. The loaders fill it from
//! disk, and [`diagnostics`] turns compiler output into per-document
//! problems it can store.

pub mod diagnostics;
mod document;
pub mod settings;
pub mod stdlib_loader;
mod state;
pub mod workspace_loader;

pub use diagnostics::{CompilerDiagnostic, CompilerReport, DiagnosticsError, Severity, parse_compiler_output};
pub use document::Document;
pub use settings::{C3Settings, ConfigError, DiagnosticsSettings, Settings};
pub use state::ProjectState;
pub use workspace_loader::WorkspaceLoader;
