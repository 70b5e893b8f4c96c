//! The project state: documents, symbols and the FQN index.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use super::diagnostics::CompilerDiagnostic;
use super::document::Document;
use super::stdlib_loader::{self, StdlibSource};
use crate::base::{ContentChange, DocId};
use crate::index::{FqnIndex, SymbolLocation, SymbolsTable};
use crate::parser::build_symbols;
use crate::symbols::{SymbolRef, UnitModules};

/// Everything the server knows about the workspace.
///
/// All mutation goes through `&mut self`; the server serializes access.
/// A refresh clears the document's FQN entries and reinserts them in one
/// call, so readers never see a half-indexed document.
#[derive(Debug, Default)]
pub struct ProjectState {
    documents: IndexMap<DocId, Document>,
    symbols: SymbolsTable,
    fqn: FqnIndex,
    diagnostics: FxHashMap<DocId, Vec<CompilerDiagnostic>>,
    language_version: Option<String>,
    stdlib_doc: Option<DocId>,
    root: Option<PathBuf>,
}

impl ProjectState {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // DOCUMENT LIFECYCLE
    // ========================================================================

    /// Open a document in the editor and index it.
    pub fn open_document(&mut self, doc_id: DocId, text: String, version: i32) {
        let mut document = Document::new(doc_id.clone(), text, version);
        document.set_owned_by_editor(true);
        self.documents.insert(doc_id.clone(), document);
        self.refresh_document(&doc_id);
    }

    /// Index a document read from disk. A document the editor owns is left
    /// alone: its buffer is newer than the file.
    pub fn index_document(&mut self, doc_id: DocId, text: String) {
        if self.is_owned_by_editor(&doc_id) {
            return;
        }
        self.documents
            .insert(doc_id.clone(), Document::new(doc_id.clone(), text, 0));
        self.refresh_document(&doc_id);
    }

    /// Apply incremental edits to an open document and re-index it.
    pub fn update_document(&mut self, doc_id: &DocId, changes: &[ContentChange], version: i32) {
        let Some(document) = self.documents.get_mut(doc_id) else {
            warn!(doc = %doc_id, "change for unknown document");
            return;
        };
        document.apply_changes(changes, version);
        self.refresh_document(doc_id);
    }

    /// Rebuild a document's symbols from its current text.
    pub fn refresh_document(&mut self, doc_id: &DocId) {
        let Some(document) = self.documents.get(doc_id) else {
            return;
        };
        let (unit, pending) = build_symbols(doc_id, document.text(), &document.syntax());

        self.fqn.clear_by_tag(doc_id);
        for module in unit.modules() {
            self.fqn.insert_module(module, doc_id);
        }
        self.symbols.register(unit, pending);
        debug!(doc = %doc_id, indexed = self.fqn.len(), "refreshed document");
    }

    /// The editor closed the document. Its symbols stay indexed.
    pub fn close_document(&mut self, doc_id: &DocId) {
        if let Some(document) = self.documents.get_mut(doc_id) {
            document.set_owned_by_editor(false);
        }
    }

    /// Forget a document entirely.
    pub fn delete_document(&mut self, doc_id: &DocId) {
        self.documents.shift_remove(doc_id);
        self.symbols.delete_document(doc_id);
        self.fqn.clear_by_tag(doc_id);
        self.diagnostics.remove(doc_id);
        debug!(doc = %doc_id, "deleted document");
    }

    /// Forget every document below a directory URI. Returns what was
    /// deleted.
    pub fn delete_under(&mut self, prefix: &str) -> Vec<DocId> {
        let doomed: Vec<DocId> = self
            .symbols
            .doc_ids()
            .filter(|id| id.is_under(prefix))
            .cloned()
            .collect();
        for doc_id in &doomed {
            self.delete_document(doc_id);
        }
        doomed
    }

    /// Move a document to a new id, keeping its text and editor ownership.
    pub fn rename_document(&mut self, old: &DocId, new: DocId) {
        if let Some(mut document) = self.documents.shift_remove(old) {
            document.set_doc_id(new.clone());
            self.documents.insert(new.clone(), document);
        }
        self.fqn.clear_by_tag(old);
        if self.symbols.rename_document(old, new.clone()) {
            if let Some(unit) = self.symbols.get(&new) {
                for module in unit.modules() {
                    self.fqn.insert_module(module, &new);
                }
            }
        }
        if let Some(diagnostics) = self.diagnostics.remove(old) {
            self.diagnostics.insert(new, diagnostics);
        }
    }

    /// Rename every document below `old_prefix` to live below `new_prefix`.
    pub fn rename_under(&mut self, old_prefix: &str, new_prefix: &str) {
        let old_prefix = old_prefix.trim_end_matches('/');
        let new_prefix = new_prefix.trim_end_matches('/');
        let moved: Vec<DocId> = self
            .symbols
            .doc_ids()
            .filter(|id| id.is_under(old_prefix))
            .cloned()
            .collect();
        for old in moved {
            let rest = &old.as_str()[old_prefix.len()..];
            let new = DocId::new(format!("{new_prefix}{rest}"));
            self.rename_document(&old, new);
        }
    }

    // ========================================================================
    // STDLIB
    // ========================================================================

    /// Load and register the stdlib for `version`, replacing the current
    /// one. A stdlib parsed from sources is written back to the cache.
    pub fn set_language_version(&mut self, version: &str, stdlib_root: Option<&Path>, cache_dir: Option<&Path>) {
        if let Some(previous) = self.stdlib_doc.take() {
            self.symbols.delete_document(&previous);
            self.fqn.clear_by_tag(&previous);
        }

        let loaded = stdlib_loader::load(version, stdlib_root, cache_dir);
        let doc_id = loaded.unit.doc_id().clone();
        for module in loaded.unit.modules() {
            self.fqn.insert_module(module, &doc_id);
        }
        self.symbols.register(loaded.unit, loaded.pending);

        if loaded.source == StdlibSource::Sources {
            if let (Some(dir), Some(unit)) = (cache_dir, self.symbols.get(&doc_id)) {
                match stdlib_loader::cache::write(dir, version, unit) {
                    Ok(path) => info!(path = %path.display(), "wrote stdlib cache"),
                    Err(e) => warn!(error = %e, "could not write stdlib cache"),
                }
            }
        }

        self.language_version = Some(version.to_string());
        self.stdlib_doc = Some(doc_id);
    }

    pub fn language_version(&self) -> Option<&str> {
        self.language_version.as_deref()
    }

    pub fn stdlib_doc_id(&self) -> Option<&DocId> {
        self.stdlib_doc.as_ref()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn document(&self, doc_id: &DocId) -> Option<&Document> {
        self.documents.get(doc_id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn is_owned_by_editor(&self, doc_id: &DocId) -> bool {
        self.documents
            .get(doc_id)
            .is_some_and(Document::is_owned_by_editor)
    }

    pub fn unit_modules(&self, doc_id: &DocId) -> Option<&UnitModules> {
        self.symbols.get(doc_id)
    }

    pub fn symbols(&self) -> &SymbolsTable {
        &self.symbols
    }

    pub fn fqn_index(&self) -> &FqnIndex {
        &self.fqn
    }

    /// Look up the FQN index; see [`FqnIndex::search`].
    pub fn search_by_fqn(&self, query: &str) -> Vec<&SymbolLocation> {
        self.fqn.search(query)
    }

    /// The declaration an index entry points at.
    pub fn resolve_location(&self, location: &SymbolLocation) -> Option<SymbolRef<'_>> {
        let module = self
            .symbols
            .get(&location.tag)?
            .get(&location.module.to_string())?;
        if location.kind == crate::symbols::SymbolKind::Module {
            return Some(SymbolRef::Module(module));
        }
        module.find_child(&location.name)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn set_root(&mut self, root: PathBuf) {
        self.root = Some(root);
    }

    // ========================================================================
    // DIAGNOSTICS
    // ========================================================================

    pub fn document_diagnostics(&self, doc_id: &DocId) -> &[CompilerDiagnostic] {
        self.diagnostics.get(doc_id).map_or(&[], Vec::as_slice)
    }

    /// Replace all diagnostics. Returns the documents that had diagnostics
    /// before but have none now, which need an empty publish.
    pub fn replace_diagnostics(&mut self, fresh: IndexMap<DocId, Vec<CompilerDiagnostic>>) -> Vec<DocId> {
        let cleared: Vec<DocId> = self
            .diagnostics
            .keys()
            .filter(|id| !fresh.contains_key(*id))
            .cloned()
            .collect();
        self.diagnostics = fresh.into_iter().collect();
        cleared
    }

    /// Drop all diagnostics, returning the documents that had some.
    pub fn clear_diagnostics(&mut self) -> Vec<DocId> {
        self.diagnostics.drain().map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Range;

    fn doc(id: &str) -> DocId {
        DocId::from(id)
    }

    fn fqn_tags(state: &ProjectState) -> Vec<String> {
        let mut all: Vec<String> = state
            .search_by_fqn("*")
            .iter()
            .map(|l| format!("{}@{}", l.fqn(), l.tag))
            .collect();
        all.sort();
        all
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut state = ProjectState::new();
        state.open_document(doc("file:///a.c3"), "module app;\nstruct S { int a; }\nstruct T { inline S; }".into(), 1);
        let before_fqn = fqn_tags(&state);
        let before_unit = state.unit_modules(&doc("file:///a.c3")).cloned();

        state.refresh_document(&doc("file:///a.c3"));
        assert_eq!(fqn_tags(&state), before_fqn);
        assert_eq!(state.unit_modules(&doc("file:///a.c3")).cloned(), before_unit);
    }

    #[test]
    fn test_refresh_leaves_other_tags_alone() {
        let mut state = ProjectState::new();
        state.open_document(doc("file:///a.c3"), "module app;\nint a;".into(), 1);
        state.open_document(doc("file:///b.c3"), "module app;\nint b;".into(), 1);
        let b_entries = |s: &ProjectState| {
            fqn_tags(s)
                .into_iter()
                .filter(|e| e.ends_with("b.c3"))
                .collect::<Vec<_>>()
        };
        let before = b_entries(&state);

        state.update_document(&doc("file:///a.c3"), &[ContentChange::replace(Range::new(1, 4, 1, 5), "renamed")], 2);
        assert_eq!(b_entries(&state), before);
        assert_eq!(state.search_by_fqn("app::renamed").len(), 1);
        assert!(state.search_by_fqn("app::a").is_empty());
    }

    #[test]
    fn test_close_keeps_index_and_delete_purges() {
        let mut state = ProjectState::new();
        state.open_document(doc("file:///a.c3"), "module app;\nint a;".into(), 1);
        state.close_document(&doc("file:///a.c3"));
        assert!(!state.is_owned_by_editor(&doc("file:///a.c3")));
        assert_eq!(state.search_by_fqn("app::a").len(), 1);

        state.delete_document(&doc("file:///a.c3"));
        assert!(fqn_tags(&state).is_empty());
        assert!(state.unit_modules(&doc("file:///a.c3")).is_none());
        assert!(state.document(&doc("file:///a.c3")).is_none());
    }

    #[test]
    fn test_index_document_does_not_clobber_editor_buffer() {
        let mut state = ProjectState::new();
        state.open_document(doc("file:///a.c3"), "module app;\nint fresh;".into(), 3);
        state.index_document(doc("file:///a.c3"), "module app;\nint stale;".into());
        assert_eq!(state.search_by_fqn("app::fresh").len(), 1);
        assert!(state.search_by_fqn("app::stale").is_empty());
    }

    #[test]
    fn test_rename_rekeys_everything() {
        let mut state = ProjectState::new();
        state.open_document(doc("file:///ws/old/a.c3"), "module app;\nint a;".into(), 1);
        state.rename_under("file:///ws/old", "file:///ws/new");

        let new = doc("file:///ws/new/a.c3");
        assert!(state.document(&new).is_some_and(Document::is_owned_by_editor));
        let found = state.search_by_fqn("app::a");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, new);
        assert_eq!(found[0].doc_id, new);
        assert!(state.unit_modules(&doc("file:///ws/old/a.c3")).is_none());
    }

    #[test]
    fn test_delete_under_directory() {
        let mut state = ProjectState::new();
        state.index_document(doc("file:///ws/lib/a.c3"), "module lib;\nint a;".into());
        state.index_document(doc("file:///ws/lib/b.c3"), "module lib;\nint b;".into());
        state.index_document(doc("file:///ws/app.c3"), "module app;\nint c;".into());

        let deleted = state.delete_under("file:///ws/lib");
        assert_eq!(deleted.len(), 2);
        assert_eq!(state.symbols().len(), 1);
    }

    #[test]
    fn test_stdlib_is_replaced_on_version_change() {
        let sources = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        std::fs::write(sources.path().join("io.c3"), "module std::io;\nfn void printn(String s) {}").unwrap();

        let mut state = ProjectState::new();
        state.set_language_version("0.7.1", Some(sources.path()), Some(cache.path()));
        assert_eq!(state.language_version(), Some("0.7.1"));
        assert_eq!(state.search_by_fqn("std::io::printn").len(), 1);
        assert!(stdlib_loader::cache::cache_file_path(cache.path(), "0.7.1").exists());

        state.set_language_version("0.6.0", None, Some(cache.path()));
        assert!(state.search_by_fqn("std::io::printn").is_empty());
        assert!(state.unit_modules(&doc("_stdlib_0.7.1")).is_none());
        assert!(state.unit_modules(&doc("_stdlib_0.6.0")).is_some());
    }

    #[test]
    fn test_replace_diagnostics_reports_cleared_documents() {
        let mut state = ProjectState::new();
        let diagnostic = CompilerDiagnostic {
            file: PathBuf::from("a.c3"),
            line: 0,
            column: None,
            severity: crate::project::Severity::Error,
            message: "bad".into(),
        };
        let mut first = IndexMap::new();
        first.insert(doc("file:///a.c3"), vec![diagnostic.clone()]);
        first.insert(doc("file:///b.c3"), vec![diagnostic.clone()]);
        assert!(state.replace_diagnostics(first).is_empty());

        let mut second = IndexMap::new();
        second.insert(doc("file:///b.c3"), vec![diagnostic]);
        assert_eq!(state.replace_diagnostics(second), vec![doc("file:///a.c3")]);
        assert_eq!(state.document_diagnostics(&doc("file:///b.c3")).len(), 1);
        assert_eq!(state.clear_diagnostics(), vec![doc("file:///b.c3")]);
    }
}
