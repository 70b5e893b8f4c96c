//! Which modules a search looks at, and in which order.

use rustc_hash::FxHashSet;

use crate::base::{DocId, Position};
use crate::project::ProjectState;
use crate::symbols::{Module, ModulePath};

/// Where a search starts.
#[derive(Clone, Debug)]
pub struct SearchContext<'a> {
    pub doc_id: &'a DocId,
    pub module: ModulePath,
    pub position: Position,
}

impl<'a> SearchContext<'a> {
    /// The context at `position`, taking the module from the document's
    /// symbols.
    pub fn at(state: &ProjectState, doc_id: &'a DocId, position: Position) -> Self {
        let module = state
            .unit_modules(doc_id)
            .and_then(|unit| unit.module_at(position))
            .map(|m| m.path().clone())
            .unwrap_or_default();
        Self {
            doc_id,
            module,
            position,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Highest,
    High,
    Medium,
}

/// A module to search with the document that registered it.
#[derive(Clone, Copy, Debug)]
pub struct ModuleScope<'a> {
    pub module: &'a Module,
    pub doc_id: &'a DocId,
    pub priority: Priority,
}

/// Candidate modules for `ctx`, best first, each `(document, module)`
/// pair once:
///
/// 1. every module of the current document, the cursor's module first;
/// 2. the cursor's module as declared in other documents;
/// 3. modules implicitly visible from it (parents and submodules);
/// 4. modules matching its `import`s.
///
/// Private modules of other documents are only visible through (2).
pub fn collect_modules<'a>(state: &'a ProjectState, ctx: &SearchContext<'_>) -> Vec<ModuleScope<'a>> {
    let mut scopes = Vec::new();
    let mut seen: FxHashSet<(&DocId, &str)> = FxHashSet::default();
    let mut push = |scope: ModuleScope<'a>, scopes: &mut Vec<ModuleScope<'a>>| {
        if seen.insert((scope.doc_id, scope.module.name())) {
            scopes.push(scope);
        }
    };

    let table = state.symbols();
    let current_unit = table.get(ctx.doc_id);

    if let Some(unit) = current_unit {
        let (cursor_module, others): (Vec<&Module>, Vec<&Module>) =
            unit.modules().partition(|m| *m.path() == ctx.module);
        for module in cursor_module.into_iter().chain(others) {
            push(scope(module, unit.doc_id(), Priority::Highest), &mut scopes);
        }
    }

    for unit in table.units() {
        if unit.doc_id() == ctx.doc_id {
            continue;
        }
        for module in unit.modules().filter(|m| *m.path() == ctx.module) {
            push(scope(module, unit.doc_id(), Priority::High), &mut scopes);
        }
    }

    for unit in table.units() {
        for module in unit.implicitly_loadable(&ctx.module) {
            if module.is_private() && unit.doc_id() != ctx.doc_id {
                continue;
            }
            push(scope(module, unit.doc_id(), Priority::Medium), &mut scopes);
        }
    }

    let imports: Vec<&ModulePath> = current_unit
        .and_then(|unit| unit.get(&ctx.module.to_string()))
        .map(|m| m.imports().iter().collect())
        .unwrap_or_default();
    for import in imports {
        for unit in table.units() {
            for module in unit.modules() {
                if module.is_private() && unit.doc_id() != ctx.doc_id {
                    continue;
                }
                if module.path().ends_with(import) || module.path().is_implicitly_imported(import) {
                    push(scope(module, unit.doc_id(), Priority::Medium), &mut scopes);
                }
            }
        }
    }

    scopes
}

fn scope<'a>(module: &'a Module, doc_id: &'a DocId, priority: Priority) -> ModuleScope<'a> {
    ModuleScope {
        module,
        doc_id,
        priority,
    }
}

/// Every registered module whose path is `path`.
pub fn modules_at<'a>(state: &'a ProjectState, path: &ModulePath) -> Vec<ModuleScope<'a>> {
    state
        .symbols()
        .units()
        .flat_map(|unit| {
            unit.modules()
                .filter(|m| m.path() == path)
                .map(|m| scope(m, unit.doc_id(), Priority::Medium))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(scopes: &[ModuleScope<'_>]) -> Vec<String> {
        scopes
            .iter()
            .map(|s| format!("{}@{}", s.module.name(), s.doc_id.file_name()))
            .collect()
    }

    #[test]
    fn test_priority_order() {
        let mut state = ProjectState::new();
        state.index_document(DocId::from("file:///lib.c3"), "module lib;\nint l;".into());
        state.index_document(DocId::from("file:///child.c3"), "module app::child;\nint c;".into());
        state.index_document(DocId::from("file:///other.c3"), "module app;\nint o;".into());
        state.index_document(DocId::from("file:///unrelated.c3"), "module zzz;\nint z;".into());
        state.open_document(DocId::from("file:///main.c3"), "module helpers;\nint h;\nmodule app;\nimport lib;\nint m;".into(), 1);

        let doc = DocId::from("file:///main.c3");
        let ctx = SearchContext::at(&state, &doc, Position::new(4, 0));
        assert_eq!(ctx.module, ModulePath::parse("app"));

        let scopes = collect_modules(&state, &ctx);
        assert_eq!(
            names(&scopes),
            vec!["app@main.c3", "helpers@main.c3", "app@other.c3", "app::child@child.c3", "lib@lib.c3"]
        );
        assert_eq!(scopes[0].priority, Priority::Highest);
        assert_eq!(scopes[2].priority, Priority::High);
        assert_eq!(scopes[4].priority, Priority::Medium);
    }

    #[test]
    fn test_private_modules_are_hidden_from_imports() {
        let mut state = ProjectState::new();
        state.index_document(DocId::from("file:///secret.c3"), "module secret @private;\nint s;".into());
        state.open_document(DocId::from("file:///main.c3"), "module app;\nimport secret;".into(), 1);

        let doc = DocId::from("file:///main.c3");
        let scopes = collect_modules(&state, &SearchContext::at(&state, &doc, Position::new(1, 0)));
        assert_eq!(names(&scopes), vec!["app@main.c3"]);
    }
}
