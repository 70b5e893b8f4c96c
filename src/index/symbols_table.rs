//! Per-document symbols and cross-document type resolution.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::DocId;
use crate::parser::{PendingInlineStruct, PendingToResolve, PendingTypeContext};
use crate::symbols::{Module, ModulePath, StructMember, SymbolRef, UnitModules};

// ============================================================================
// SYMBOLS TABLE
// ============================================================================

/// Every registered document's modules, plus the resolution work that is
/// still waiting for other documents.
///
/// Registration order is kept: when a type name is declared by several
/// unrelated modules, the first registered one wins.
#[derive(Clone, Debug, Default)]
pub struct SymbolsTable {
    units: IndexMap<DocId, UnitModules>,
    pending: PendingToResolve,
}

impl SymbolsTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document's modules, replacing its previous ones, and run the
    /// resolution pass.
    pub fn register(&mut self, unit: UnitModules, pending: PendingToResolve) {
        let doc_id = unit.doc_id().clone();
        self.pending.purge_doc(&doc_id);
        self.pending.extend(pending);
        self.units.insert(doc_id.clone(), unit);

        self.resolve_pending();
        debug!(
            doc = %doc_id,
            pending_types = self.pending.type_count(),
            pending_inline = self.pending.subtyping().len(),
            "registered document"
        );
    }

    /// Remove a document. Returns its modules if it was registered.
    pub fn delete_document(&mut self, doc_id: &DocId) -> Option<UnitModules> {
        self.pending.purge_doc(doc_id);
        self.units.shift_remove(doc_id)
    }

    /// Move a document's modules to a new id. Returns false when `old` was
    /// not registered.
    pub fn rename_document(&mut self, old: &DocId, new: DocId) -> bool {
        let Some(mut unit) = self.units.shift_remove(old) else {
            return false;
        };
        self.pending.rename_doc(old, &new);
        unit.set_doc_id(new.clone());
        for module in unit.modules_mut() {
            module.rebase_doc_id(&new);
        }
        self.units.insert(new, unit);
        true
    }

    pub fn get(&self, doc_id: &DocId) -> Option<&UnitModules> {
        self.units.get(doc_id)
    }

    pub fn contains(&self, doc_id: &DocId) -> bool {
        self.units.contains_key(doc_id)
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitModules> {
        self.units.values()
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = &DocId> {
        self.units.keys()
    }

    /// Every module of every document, in registration order.
    pub fn all_modules(&self) -> impl Iterator<Item = &Module> {
        self.units.values().flat_map(UnitModules::modules)
    }

    /// Every document's declaration of the module named `name`.
    pub fn modules_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Module> {
        self.all_modules().filter(move |m| m.name() == name)
    }

    pub fn pending(&self) -> &PendingToResolve {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    // ========================================================================
    // RESOLUTION PASS
    // ========================================================================

    fn resolve_pending(&mut self) {
        for context in self.pending.take_types() {
            match self.declaring_module(&context) {
                Some(found) => self.bind_type(&context, &found),
                None if self.units.contains_key(&context.doc_id) => self.pending.add_type(context),
                None => {}
            }
        }

        for entry in self.pending.take_subtyping() {
            if !self.expand_inline(&entry) && self.host_still_pending(&entry) {
                self.pending.add_subtyping(entry);
            }
        }
    }

    /// The module that declares the type `context` refers to.
    fn declaring_module(&self, context: &PendingTypeContext) -> Option<SmolStr> {
        let unit = self.units.get(&context.doc_id)?;
        let module = unit.get(&context.context_module)?;
        let declares = |m: &Module| {
            m.find_child(&context.type_name)
                .is_some_and(|s| s.is_type() || matches!(s, SymbolRef::Def(_)))
        };

        if context.written_module != context.context_module {
            // Qualified as `io::File`: the qualifier is a suffix of the
            // declaring module's path, preferably one that is imported.
            let qualifier = ModulePath::parse(&context.written_module);
            let candidates = || {
                self.all_modules()
                    .filter(|m| m.path().ends_with(&qualifier) && declares(m))
            };
            let imported = candidates().find(|m| {
                module
                    .imports()
                    .iter()
                    .any(|import| m.path().is_implicitly_imported(import))
            });
            return imported
                .or_else(|| candidates().next())
                .map(|m| SmolStr::new(m.name()));
        }

        let path = module.path();
        let visible = self
            .all_modules()
            .find(|m| m.path().is_implicitly_imported(path) && declares(m))
            .or_else(|| {
                self.all_modules().find(|m| {
                    declares(m)
                        && module
                            .imports()
                            .iter()
                            .any(|import| m.path().is_implicitly_imported(import))
                })
            });
        if visible.is_some() || !module.imports().is_empty() {
            return visible.map(|m| SmolStr::new(m.name()));
        }
        self.all_modules()
            .find(|m| declares(m))
            .map(|m| SmolStr::new(m.name()))
    }

    fn bind_type(&mut self, context: &PendingTypeContext, found: &str) {
        if context.written_module == found {
            return;
        }
        let Some(module) = self
            .units
            .get_mut(&context.doc_id)
            .and_then(|unit| unit.get_mut(&context.context_module))
        else {
            return;
        };
        module.for_each_type_mut(&mut |ty| {
            if !ty.is_builtin()
                && !ty.is_generic_argument()
                && context.type_name == ty.name()
                && context.written_module == ty.module()
            {
                ty.set_module(found);
            }
        });
    }

    /// Hoist the inlined struct's members into the host. Returns false when
    /// the inlined struct is not registered yet.
    fn expand_inline(&mut self, entry: &PendingInlineStruct) -> bool {
        let Some(members) = self.inlined_members(entry) else {
            return false;
        };
        if let Some(host) = self
            .units
            .get_mut(&entry.doc_id)
            .and_then(|unit| unit.get_mut(&entry.module))
            .and_then(|module| module.struct_mut(&entry.struct_name))
        {
            host.inherit_members_from(&entry.inlined_type, &members);
        }
        true
    }

    /// Members of the struct named by an inline member, looked up in the
    /// host's own module first.
    fn inlined_members(&self, entry: &PendingInlineStruct) -> Option<Vec<StructMember>> {
        let same_module = self
            .modules_named(&entry.module)
            .find_map(|m| m.structure(&entry.inlined_type));
        let inlined = same_module.or_else(|| {
            self.all_modules()
                .find_map(|m| m.structure(&entry.inlined_type))
        })?;
        if inlined.name() == entry.struct_name.as_str() && inlined.base().doc_id() == &entry.doc_id {
            return None;
        }
        Some(inlined.members().to_vec())
    }

    fn host_still_pending(&self, entry: &PendingInlineStruct) -> bool {
        self.units
            .get(&entry.doc_id)
            .and_then(|unit| unit.get(&entry.module))
            .and_then(|module| module.structure(&entry.struct_name))
            .is_some_and(|host| host.pending_inline_types().any(|t| entry.inlined_type == t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_symbols;
    use crate::symbols::Typeable;

    fn register(table: &mut SymbolsTable, doc: &str, text: &str) {
        let (unit, pending) = parse_symbols(&DocId::from(doc), text);
        table.register(unit, pending);
    }

    fn variable_type_module(table: &SymbolsTable, doc: &str, module: &str, name: &str) -> Option<String> {
        table
            .get(&DocId::from(doc))?
            .get(module)?
            .variable(name)
            .map(|v| v.get_type().module().to_string())
    }

    #[test]
    fn test_type_resolves_through_import() {
        let mut table = SymbolsTable::new();
        register(&mut table, "main.c3", "module app;\nimport std::io;\nFile handle;");
        assert_eq!(variable_type_module(&table, "main.c3", "app", "handle").as_deref(), Some("app"));
        assert_eq!(table.pending().type_count(), 1);

        register(&mut table, "io.c3", "module std::io;\nstruct File { int fd; }");
        assert_eq!(variable_type_module(&table, "main.c3", "app", "handle").as_deref(), Some("std::io"));
        assert_eq!(table.pending().type_count(), 0);
    }

    #[test]
    fn test_qualified_type_binds_to_full_module() {
        let mut table = SymbolsTable::new();
        register(&mut table, "io.c3", "module std::io;\nstruct File { int fd; }");
        register(&mut table, "main.c3", "module app;\nimport std::io;\nio::File handle;");
        assert_eq!(variable_type_module(&table, "main.c3", "app", "handle").as_deref(), Some("std::io"));
    }

    #[test]
    fn test_unimported_type_stays_pending() {
        let mut table = SymbolsTable::new();
        register(&mut table, "lib.c3", "module lib;\nstruct Buffer { int len; }");
        register(&mut table, "main.c3", "module app;\nimport std::io;\nBuffer b;");
        assert_eq!(variable_type_module(&table, "main.c3", "app", "b").as_deref(), Some("app"));
        assert_eq!(table.pending().type_count(), 1);
    }

    #[test]
    fn test_without_imports_any_module_matches() {
        let mut table = SymbolsTable::new();
        register(&mut table, "lib.c3", "module lib;\nstruct Buffer { int len; }");
        register(&mut table, "main.c3", "module app;\nBuffer b;");
        assert_eq!(variable_type_module(&table, "main.c3", "app", "b").as_deref(), Some("lib"));
    }

    #[test]
    fn test_inline_struct_expands_after_registration() {
        let mut table = SymbolsTable::new();
        register(&mut table, "t.c3", "module app;\nstruct T { inline S; int c; }");
        register(&mut table, "s.c3", "module app;\nstruct S { int a; }");

        let t = table
            .get(&DocId::from("t.c3"))
            .and_then(|u| u.get("app"))
            .and_then(|m| m.structure("T"))
            .expect("T");
        let names: Vec<_> = t.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["", "a", "c"]);
        assert!(t.members()[0].is_expanded_inline());
        assert!(table.pending().subtyping().is_empty());
    }

    #[test]
    fn test_reregistering_replaces_and_stays_idempotent() {
        let mut table = SymbolsTable::new();
        let text = "module app;\nstruct S { int a; }\nstruct T { inline S; int c; }";
        register(&mut table, "a.c3", text);
        let first = table.get(&DocId::from("a.c3")).cloned();
        register(&mut table, "a.c3", text);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&DocId::from("a.c3")).cloned(), first);
    }

    #[test]
    fn test_delete_and_rename() {
        let mut table = SymbolsTable::new();
        register(&mut table, "a.c3", "module app;\nFoo f;");
        assert_eq!(table.pending().type_count(), 1);

        assert!(table.rename_document(&DocId::from("a.c3"), DocId::from("b.c3")));
        let unit = table.get(&DocId::from("b.c3")).expect("renamed");
        assert_eq!(unit.doc_id().as_str(), "b.c3");
        assert_eq!(unit.get("app").map(|m| m.doc_id().as_str()), Some("b.c3"));

        assert!(table.delete_document(&DocId::from("b.c3")).is_some());
        assert!(table.is_empty());
        assert_eq!(table.pending().type_count(), 0);
        assert!(!table.rename_document(&DocId::from("missing.c3"), DocId::from("x.c3")));
    }
}
