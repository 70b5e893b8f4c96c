//! Work the symbol builder could not finish on its own.

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

use crate::base::DocId;

/// A user type written in `context_module` whose declaring module is not
/// known yet.
///
/// The type itself lives inside the document's symbols; this record is the
/// key used to find it again: every type in `context_module` of `doc_id`
/// named `type_name` whose module is still `written_module`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PendingTypeContext {
    pub doc_id: DocId,
    pub context_module: SmolStr,
    pub type_name: SmolStr,
    /// The module the type claims before resolution: its written qualifier
    /// (`io` for `io::File`), or the context module when unqualified.
    pub written_module: SmolStr,
}

/// A struct with an `inline` member whose members still have to be hoisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PendingInlineStruct {
    pub doc_id: DocId,
    pub module: SmolStr,
    pub struct_name: SmolStr,
    pub inlined_type: SmolStr,
}

/// Types and inline members left for the symbols table to resolve once
/// more documents are registered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingToResolve {
    /// Keyed by context module.
    types: IndexMap<SmolStr, IndexSet<PendingTypeContext>>,
    subtyping: Vec<PendingInlineStruct>,
}

impl PendingToResolve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, context: PendingTypeContext) {
        self.types
            .entry(context.context_module.clone())
            .or_default()
            .insert(context);
    }

    pub fn add_subtyping(&mut self, entry: PendingInlineStruct) {
        if !self.subtyping.contains(&entry) {
            self.subtyping.push(entry);
        }
    }

    /// Pending types written in `module`.
    pub fn types_in(&self, module: &str) -> impl Iterator<Item = &PendingTypeContext> {
        self.types.get(module).into_iter().flatten()
    }

    pub fn types(&self) -> impl Iterator<Item = &PendingTypeContext> {
        self.types.values().flatten()
    }

    pub fn subtyping(&self) -> &[PendingInlineStruct] {
        &self.subtyping
    }

    pub fn type_count(&self) -> usize {
        self.types.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.type_count() == 0 && self.subtyping.is_empty()
    }

    /// Append everything in `other`.
    pub fn extend(&mut self, other: PendingToResolve) {
        for (_, contexts) in other.types {
            for context in contexts {
                self.add_type(context);
            }
        }
        for entry in other.subtyping {
            self.add_subtyping(entry);
        }
    }

    /// Drop every entry that came from `doc_id`.
    pub fn purge_doc(&mut self, doc_id: &DocId) {
        self.retain_types(|context| &context.doc_id != doc_id);
        self.subtyping.retain(|entry| &entry.doc_id != doc_id);
    }

    /// Move the entries of `old` over to `new`.
    pub fn rename_doc(&mut self, old: &DocId, new: &DocId) {
        let mut renamed = Vec::new();
        self.retain_types(|context| {
            if &context.doc_id == old {
                let mut context = context.clone();
                context.doc_id = new.clone();
                renamed.push(context);
                false
            } else {
                true
            }
        });
        for context in renamed {
            self.add_type(context);
        }
        for entry in &mut self.subtyping {
            if &entry.doc_id == old {
                entry.doc_id = new.clone();
            }
        }
    }

    pub(crate) fn take_types(&mut self) -> Vec<PendingTypeContext> {
        std::mem::take(&mut self.types)
            .into_values()
            .flatten()
            .collect()
    }

    pub(crate) fn take_subtyping(&mut self) -> Vec<PendingInlineStruct> {
        std::mem::take(&mut self.subtyping)
    }

    pub(crate) fn retain_types(&mut self, mut keep: impl FnMut(&PendingTypeContext) -> bool) {
        for contexts in self.types.values_mut() {
            contexts.retain(|context| keep(context));
        }
        self.types.retain(|_, contexts| !contexts.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(doc: &str, module: &str, name: &str) -> PendingTypeContext {
        PendingTypeContext {
            doc_id: DocId::from(doc),
            context_module: module.into(),
            type_name: name.into(),
            written_module: module.into(),
        }
    }

    #[test]
    fn test_types_are_grouped_by_module_and_deduplicated() {
        let mut p = PendingToResolve::new();
        p.add_type(pending("a.c3", "app", "File"));
        p.add_type(pending("a.c3", "app", "File"));
        p.add_type(pending("b.c3", "lib", "Buffer"));

        assert_eq!(p.type_count(), 2);
        assert_eq!(p.types_in("app").count(), 1);
        assert_eq!(p.types_in("missing").count(), 0);
    }

    #[test]
    fn test_purge_and_rename_doc() {
        let mut p = PendingToResolve::new();
        p.add_type(pending("a.c3", "app", "File"));
        p.add_type(pending("b.c3", "app", "Buffer"));
        p.add_subtyping(PendingInlineStruct {
            doc_id: DocId::from("a.c3"),
            module: "app".into(),
            struct_name: "T".into(),
            inlined_type: "S".into(),
        });

        p.rename_doc(&DocId::from("b.c3"), &DocId::from("c.c3"));
        assert!(p.types().any(|t| t.doc_id.as_str() == "c.c3"));

        p.purge_doc(&DocId::from("a.c3"));
        assert_eq!(p.type_count(), 1);
        assert!(p.subtyping().is_empty());
    }
}
