//! Foundation types for the C3 language server.
//!
//! This module provides fundamental types used throughout the server:
//! - [`DocId`] - Document identifiers
//! - [`Position`], [`Range`] - LSP coordinates (UTF-16 columns)
//! - [`LineIndex`] - Byte offset ↔ position conversion
//! - [`ContentChange`] - Incremental edits
//!
//! This module has NO dependencies on other c3lsp modules.

mod doc_id;
mod line_index;
mod position;
mod text_edit;

pub use doc_id::DocId;
pub use line_index::{LineIndex, byte_to_utf16, utf16_to_byte};
pub use position::{Position, Range};
pub use text_edit::{ContentChange, apply_changes};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
