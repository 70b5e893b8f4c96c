//! Completion candidates at the cursor.

use indexmap::IndexMap;

use super::resolver::{Resolver, method_host};
use super::word::Word;
use crate::symbols::{ModulePath, SymbolKind, SymbolRef};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: SymbolKind,
    pub detail: String,
    /// Markdown.
    pub documentation: Option<String>,
}

/// Candidates for `word`, unique by label and kind, in discovery order.
///
/// * `a.b.|` lists what `a.b` exposes: members, enumerators, associated
///   values, fault constants and methods, subject to the same visibility
///   rules as access path resolution.
/// * `io::|` lists the declarations of the matching modules and their
///   direct submodules.
/// * Anything else lists every declaration visible from the cursor,
///   including the enclosing function's parameters and earlier locals.
pub fn complete(resolver: &Resolver<'_, '_>, word: &Word) -> Vec<CompletionItem> {
    let mut items = Items::new(word.prefix());
    if word.has_access_path() {
        members(resolver, word, &mut items);
    } else if word.has_module_path() {
        module_members(resolver, word, &mut items);
    } else {
        visible(resolver, &mut items);
    }
    items.finish()
}

struct Items<'p> {
    prefix: &'p str,
    found: IndexMap<(String, SymbolKind), CompletionItem>,
}

impl<'p> Items<'p> {
    fn new(prefix: &'p str) -> Self {
        Self {
            prefix,
            found: IndexMap::new(),
        }
    }

    fn add(&mut self, symbol: SymbolRef<'_>) {
        let label = match symbol {
            SymbolRef::Function(f) if f.type_identifier().is_some() => f.method_name(),
            _ => symbol.name(),
        };
        self.add_labelled(label, symbol);
    }

    /// Add `symbol` shown as `label`.
    fn add_labelled(&mut self, label: &str, symbol: SymbolRef<'_>) {
        if !label.starts_with(self.prefix) {
            return;
        }
        let key = (label.to_string(), symbol.kind());
        self.found.entry(key).or_insert_with(|| CompletionItem {
            label: label.to_string(),
            kind: symbol.kind(),
            detail: symbol.completion_detail(),
            documentation: symbol
                .doc_comment()
                .map(|d| d.display_body_with_contracts())
                .filter(|d| !d.is_empty()),
        });
    }

    fn add_module_name(&mut self, label: &str) {
        if !label.starts_with(self.prefix) {
            return;
        }
        let key = (label.to_string(), SymbolKind::Module);
        self.found.entry(key).or_insert_with(|| CompletionItem {
            label: label.to_string(),
            kind: SymbolKind::Module,
            detail: SymbolKind::Module.display_name().to_string(),
            documentation: None,
        });
    }

    fn finish(self) -> Vec<CompletionItem> {
        self.found.into_values().collect()
    }
}

// ============================================================================
// ACCESS PATHS
// ============================================================================

fn members(resolver: &Resolver<'_, '_>, word: &Word, items: &mut Items<'_>) {
    let Some(parent) = word.parent() else {
        return;
    };
    let Some((symbol, ctx)) = resolver.resolve_parent(&parent) else {
        return;
    };
    let Some((mut symbol, mut ctx)) = resolver.resolve_to_inspectable(symbol, ctx, true) else {
        return;
    };

    if let SymbolRef::Distinct(_) = symbol {
        if ctx.instance && ctx.methods_readable {
            methods_of(resolver, &symbol, items);
        }
        match resolver.resolve_to_inspectable(symbol, ctx, false) {
            Some((base, base_ctx)) => (symbol, ctx) = (base, base_ctx),
            None => return,
        }
    }

    if ctx.can_read_members() {
        direct_members(symbol, items);
    }
    if !ctx.members_readable {
        if let SymbolRef::Enum(e) | SymbolRef::Enumerator(_, e) = symbol {
            for value in e.associated_values() {
                items.add(SymbolRef::Variable(value));
            }
        }
    }
    if ctx.methods_readable {
        methods_of(resolver, &symbol, items);
    }
}

fn direct_members(parent: SymbolRef<'_>, items: &mut Items<'_>) {
    match parent {
        SymbolRef::Enum(e) => {
            for enumerator in e.enumerators() {
                items.add(SymbolRef::Enumerator(enumerator, e));
            }
        }
        SymbolRef::Enumerator(_, e) => {
            for value in e.associated_values() {
                items.add(SymbolRef::Variable(value));
            }
        }
        SymbolRef::Fault(f) => {
            for constant in f.constants() {
                items.add(SymbolRef::FaultConstant(constant));
            }
        }
        SymbolRef::Struct(s) | SymbolRef::Union(s) => {
            for member in s.members() {
                items.add(SymbolRef::StructMember(member));
            }
        }
        SymbolRef::Bitstruct(b) => {
            for member in b.members() {
                items.add(SymbolRef::StructMember(member));
            }
        }
        SymbolRef::Interface(i) => {
            for method in i.methods() {
                items.add_labelled(method.method_name(), SymbolRef::Function(method));
            }
        }
        _ => {}
    }
}

/// `Type.prefix*` from the FQN index.
fn methods_of(resolver: &Resolver<'_, '_>, parent: &SymbolRef<'_>, items: &mut Items<'_>) {
    let Some((host, module)) = method_host(parent) else {
        return;
    };
    let query = if module.is_empty() {
        format!("{host}.{}*", items.prefix)
    } else {
        format!("{module}::{host}.{}*", items.prefix)
    };
    let state = resolver.state();
    for location in state.search_by_fqn(&query) {
        if location.kind != SymbolKind::Function {
            continue;
        }
        if let Some(method) = state.resolve_location(location) {
            items.add(method);
        }
    }
}

// ============================================================================
// MODULE PATHS
// ============================================================================

fn module_members(resolver: &Resolver<'_, '_>, word: &Word, items: &mut Items<'_>) {
    let resolved = word.resolved_module();
    let written = word.written_module();
    for module in resolver.modules_matching(&resolved, &written) {
        for child in module.children() {
            items.add(child);
        }
    }

    for module in resolver.state().symbols().all_modules() {
        if let Some(name) = direct_submodule(module.path(), &resolved)
            .or_else(|| direct_submodule(module.path(), &written))
        {
            items.add_module_name(name);
        }
    }
}

/// The last segment of `path` when it sits directly below `parent`.
fn direct_submodule<'p>(path: &'p ModulePath, parent: &ModulePath) -> Option<&'p str> {
    let (last, init) = path.tokens().split_last()?;
    (init == parent.tokens()).then_some(last.as_str())
}

// ============================================================================
// VISIBLE SYMBOLS
// ============================================================================

fn visible(resolver: &Resolver<'_, '_>, items: &mut Items<'_>) {
    let position = resolver.context().position;
    for scope in resolver.modules() {
        if resolver.is_local(scope) {
            if let Some(function) = scope.module.function_at(position) {
                for arg in function.arguments() {
                    items.add(SymbolRef::Variable(arg));
                }
                for local in function.locals_before(position) {
                    items.add(SymbolRef::Variable(local));
                }
            }
        }

        for child in scope.module.children() {
            items.add(child);
            match child {
                SymbolRef::Enum(e) => {
                    for enumerator in e.enumerators() {
                        items.add(SymbolRef::Enumerator(enumerator, e));
                    }
                }
                SymbolRef::Fault(f) => {
                    for constant in f.constants() {
                        items.add(SymbolRef::FaultConstant(constant));
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{DocId, Position};
    use crate::project::ProjectState;
    use crate::search::SearchContext;
    use crate::search::word_at;

    /// Complete at the `|` marker of `source`, opened as `main.c3`.
    fn complete_at(state: &mut ProjectState, source: &str) -> Vec<(String, SymbolKind)> {
        let offset = source.find('|').expect("cursor marker");
        let doc = DocId::from("file:///main.c3");
        state.open_document(doc.clone(), source.replacen('|', "", 1), 1);
        let document = state.document(&doc).expect("opened");
        let position = document.position(offset);
        let mut word = word_at(document, position);

        let ctx = SearchContext::at(state, &doc, position);
        if let Some(module) = state.unit_modules(&doc).and_then(|u| u.module_at(position)) {
            word.resolve_module_path(module);
        }
        let resolver = Resolver::new(state, &ctx);
        complete(&resolver, &word)
            .into_iter()
            .map(|item| (item.label, item.kind))
            .collect()
    }

    fn labels(items: &[(String, SymbolKind)]) -> Vec<&str> {
        items.iter().map(|(label, _)| label.as_str()).collect()
    }

    #[test]
    fn test_visible_symbols_with_locals_and_prefix() {
        let mut state = ProjectState::new();
        let items = complete_at(
            &mut state,
            "module app;\nint value_global;\nenum Color { RED, VIOLET }\nfn void run(int value_arg) {\n  int value_local;\n  v|;\n  int value_late;\n}",
        );
        assert_eq!(labels(&items), vec!["value_arg", "value_local", "value_global"]);
    }

    #[test]
    fn test_struct_members_and_methods() {
        let mut state = ProjectState::new();
        let items = complete_at(
            &mut state,
            "module app;\nstruct Point { int x; int y; }\nfn void Point.reset(&self) {}\nfn void main() {\n  Point p;\n  p.|;\n}",
        );
        assert_eq!(
            items,
            vec![
                ("x".to_string(), SymbolKind::StructMember),
                ("y".to_string(), SymbolKind::StructMember),
                ("reset".to_string(), SymbolKind::Function),
            ]
        );
    }

    #[test]
    fn test_enum_type_lists_enumerators_not_values() {
        let mut state = ProjectState::new();
        let items = complete_at(
            &mut state,
            "module app;\nenum Planet : int (int mass) { EARTH(1), MARS(2) }\nfn void main() {\n  Planet.|;\n}",
        );
        assert_eq!(labels(&items), vec!["EARTH", "MARS"]);
    }

    #[test]
    fn test_enumerator_lists_associated_values() {
        let mut state = ProjectState::new();
        let items = complete_at(
            &mut state,
            "module app;\nenum Planet : int (int mass) { EARTH(1), MARS(2) }\nfn void main() {\n  Planet.EARTH.|;\n}",
        );
        assert_eq!(labels(&items), vec!["mass"]);
    }

    #[test]
    fn test_module_path_lists_declarations_and_submodules() {
        let mut state = ProjectState::new();
        state.index_document(
            DocId::from("file:///io.c3"),
            "module std::io;\nfn void printn(String s) {}\nfn void print(String s) {}\nint other;".into(),
        );
        state.index_document(DocId::from("file:///path.c3"), "module std::io::path;\nint sep;".into());
        let items = complete_at(&mut state, "module app;\nimport std::io;\nfn void main() {\n  io::pr|;\n}");
        assert_eq!(labels(&items), vec!["printn", "print"]);

        let items = complete_at(&mut state, "module app;\nimport std::io;\nfn void main() {\n  io::|;\n}");
        assert!(items.contains(&("path".to_string(), SymbolKind::Module)));
        assert!(items.contains(&("other".to_string(), SymbolKind::Variable)));
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut state = ProjectState::new();
        state.index_document(DocId::from("file:///a.c3"), "module app;\nint shared;".into());
        let items = complete_at(&mut state, "module app;\nint shared;\nfn void main() {\n  sh|;\n}");
        assert_eq!(labels(&items), vec!["shared"]);
    }
}
