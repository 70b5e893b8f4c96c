//! # c3lsp
//!
//! Language server for C3: symbol indexing, name resolution and the
//! editor features built on them.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! server   → tower-lsp backend, compiler diagnostics
//!   ↓
//! project  → ProjectState, workspace and stdlib loading, settings
//!   ↓
//! search   → cursor queries: definition, hover, completion, signatures
//!   ↓
//! index    → SymbolsTable, FQN trie
//!   ↓
//! parser   → Syntax tree → symbols
//!   ↓
//! syntax   → Lexer + tolerant parser (logos, rowan)
//!   ↓
//! symbols  → Symbol model
//!   ↓
//! base     → Positions, ranges, document ids, line index
//! ```

/// Foundation types: DocId, Position, Range, LineIndex
pub mod base;

/// Symbol model shared by everything above it
pub mod symbols;

/// Lossless syntax tree for C3 sources
pub mod syntax;

/// Syntax tree to symbol extraction
pub mod parser;

/// Symbol storage and the FQN index
pub mod index;

/// Documents and the indexed workspace
pub mod project;

/// Cursor queries over the project
pub mod search;

/// LSP front end
pub mod server;

pub use base::{DocId, Position, Range};
pub use project::ProjectState;
pub use symbols::{SymbolKind, SymbolRef};
