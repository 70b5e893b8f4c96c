//! Workspace-wide symbol storage.
//!
//! [`SymbolsTable`] owns every document's modules and performs the
//! cross-document type resolution. [`FqnIndex`] maps fully qualified names
//! back to declarations for qualified lookups and method completion.

mod symbols_table;
mod trie;

pub use symbols_table::SymbolsTable;
pub use trie::{FqnIndex, QueryKind, SymbolLocation};
