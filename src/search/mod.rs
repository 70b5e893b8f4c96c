//! Cursor queries over a [`ProjectState`].
//!
//! Everything here works on plain project types: positions, ranges and
//! [`SymbolRef`]s. The server converts results to protocol types.
//!
//! A query starts by rebuilding the [`Word`] under the cursor, then asks a
//! [`Resolver`] built for the cursor's [`SearchContext`] to resolve it:
//!
//! ```text
//! word_at ─► Word ─► Resolver::resolve_word ─► SymbolRef
//!                        │
//!                        └─ collect_modules (priority order)
//! ```

mod access;
mod completion;
mod hover;
mod implementation;
mod modules;
mod resolver;
mod signature;
mod word;

pub use access::{AccessContext, FromDistinct};
pub use completion::CompletionItem;
pub use hover::{HoverResult, hover_markdown};
pub use implementation::ImplementationTarget;
pub use modules::{ModuleScope, Priority, SearchContext, collect_modules};
pub use resolver::{MAX_RESOLUTION_DEPTH, Resolver};
pub use signature::{CallSite, ParameterInfo, SignatureInfo, call_site};
pub use word::{Word, WordPart, word_at};

use crate::base::{DocId, Position};
use crate::project::ProjectState;
use crate::symbols::SymbolRef;

/// The word under the cursor with its module path expanded through the
/// enclosing module's imports.
fn prepare_word(state: &ProjectState, doc_id: &DocId, position: Position) -> Option<Word> {
    let document = state.document(doc_id)?;
    let mut word = word_at(document, position);
    if let Some(module) = state
        .unit_modules(doc_id)
        .and_then(|unit| unit.module_at(position))
    {
        word.resolve_module_path(module);
    }
    Some(word)
}

/// The declaration the cursor refers to.
///
/// A cursor on the name of a member-like declaration (struct member,
/// enumerator, fault constant, interface method) yields that declaration
/// directly; names elsewhere go through resolution.
pub fn find_declaration<'a>(state: &'a ProjectState, doc_id: &DocId, position: Position) -> Option<SymbolRef<'a>> {
    let word = prepare_word(state, doc_id, position)?;
    resolve(state, doc_id, position, &word)
}

fn resolve<'a>(state: &'a ProjectState, doc_id: &DocId, position: Position, word: &Word) -> Option<SymbolRef<'a>> {
    if !word.has_access_path() && !word.has_module_path() {
        if let Some(declared) = declared_at(state, doc_id, position) {
            return Some(declared);
        }
    }
    let ctx = SearchContext::at(state, doc_id, position);
    Resolver::new(state, &ctx).resolve_word(word)
}

/// A nested declaration whose name is under `position`.
fn declared_at<'a>(state: &'a ProjectState, doc_id: &DocId, position: Position) -> Option<SymbolRef<'a>> {
    let unit = state.unit_modules(doc_id)?;
    let module = unit.module_at(position)?;
    let at = |symbol: &SymbolRef<'_>| symbol.id_range().has_position(position);

    for strukt in module.structs() {
        if let Some(member) = strukt.members().iter().map(SymbolRef::StructMember).find(at) {
            return Some(member);
        }
    }
    for bitstruct in module.bitstructs() {
        if let Some(member) = bitstruct.members().iter().map(SymbolRef::StructMember).find(at) {
            return Some(member);
        }
    }
    for enumeration in module.enums() {
        let found = enumeration
            .enumerators()
            .iter()
            .map(|e| SymbolRef::Enumerator(e, enumeration))
            .find(at);
        if found.is_some() {
            return found;
        }
    }
    for fault in module.faults() {
        if let Some(constant) = fault.constants().iter().map(SymbolRef::FaultConstant).find(at) {
            return Some(constant);
        }
    }
    module
        .interfaces()
        .flat_map(|i| i.methods())
        .map(SymbolRef::Function)
        .find(at)
}

/// Hover for the symbol under the cursor.
pub fn hover(state: &ProjectState, doc_id: &DocId, position: Position) -> Option<HoverResult> {
    let word = prepare_word(state, doc_id, position)?;
    let symbol = resolve(state, doc_id, position, &word)?;
    Some(HoverResult {
        contents: hover_markdown(&symbol),
        range: word.range(),
    })
}

/// Completion candidates at the cursor.
pub fn completions(state: &ProjectState, doc_id: &DocId, position: Position) -> Vec<CompletionItem> {
    let Some(word) = prepare_word(state, doc_id, position) else {
        return Vec::new();
    };
    let ctx = SearchContext::at(state, doc_id, position);
    completion::complete(&Resolver::new(state, &ctx), &word)
}

/// Signature of the function whose argument list contains the cursor.
pub fn signature_help(state: &ProjectState, doc_id: &DocId, position: Position) -> Option<SignatureInfo> {
    let document = state.document(doc_id)?;
    let site = call_site(document, position)?;
    match find_declaration(state, doc_id, site.callee)? {
        SymbolRef::Function(function) => Some(signature::signature_of(function, &site)),
        _ => None,
    }
}

/// Implementations of the interface, or interface method, at the cursor.
pub fn find_implementations<'a>(state: &'a ProjectState, doc_id: &DocId, position: Position) -> Vec<SymbolRef<'a>> {
    let Some(symbol) = find_declaration(state, doc_id, position) else {
        return Vec::new();
    };
    let target = match symbol {
        SymbolRef::Interface(interface) => ImplementationTarget::Interface(interface),
        SymbolRef::Function(function) => {
            let owner = state
                .symbols()
                .all_modules()
                .flat_map(|m| m.interfaces())
                .find(|i| i.methods().any(|m| std::ptr::eq(m, function)));
            match owner {
                Some(interface) => ImplementationTarget::Method {
                    interface,
                    method: function.name(),
                },
                None => return Vec::new(),
            }
        }
        _ => return Vec::new(),
    };
    let ctx = SearchContext::at(state, doc_id, position);
    implementation::implementations(&Resolver::new(state, &ctx), target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolKind;

    const MAIN: &str = "file:///main.c3";

    /// Open `source` with its `|` marker removed; returns the marker
    /// position.
    fn open(state: &mut ProjectState, source: &str) -> Position {
        let offset = source.find('|').expect("cursor marker");
        let doc = DocId::from(MAIN);
        state.open_document(doc.clone(), source.replacen('|', "", 1), 1);
        state.document(&doc).expect("opened").position(offset)
    }

    fn declaration_fqn(state: &ProjectState, position: Position) -> Option<String> {
        find_declaration(state, &DocId::from(MAIN), position).map(|s| s.fqn())
    }

    #[test]
    fn test_local_shadows_global() {
        let mut state = ProjectState::new();
        let position = open(
            &mut state,
            "module app;\nint value;\nfn void main() {\n  char value = 1;\n  val|ue++;\n}",
        );
        let found = find_declaration(&state, &DocId::from(MAIN), position).unwrap();
        assert_eq!(found.kind(), SymbolKind::Variable);
        assert_eq!(found.id_range().start.line, 3);
    }

    #[test]
    fn test_struct_member_through_variable() {
        let mut state = ProjectState::new();
        let position = open(
            &mut state,
            "module app;\nstruct Point { int x; int y; }\nfn void main() {\n  Point p;\n  p.|y = 2;\n}",
        );
        assert_eq!(declaration_fqn(&state, position), Some("app::Point.y".to_string()));
        let found = find_declaration(&state, &DocId::from(MAIN), position).unwrap();
        assert_eq!(found.kind(), SymbolKind::StructMember);
    }

    #[test]
    fn test_method_through_imported_module() {
        let mut state = ProjectState::new();
        state.index_document(
            DocId::from("file:///io.c3"),
            "module std::io;\nstruct File { int fd; }\nfn void File.close(&self) {}\nfn File* open() {}".into(),
        );
        let position = open(
            &mut state,
            "module app;\nimport std::io;\nfn void main() {\n  io::open().clo|se();\n}",
        );
        assert_eq!(declaration_fqn(&state, position), Some("std::io::File.close".to_string()));
    }

    #[test]
    fn test_member_declaration_under_cursor() {
        let mut state = ProjectState::new();
        let position = open(&mut state, "module app;\nint x;\nstruct Point { int |x; }");
        let found = find_declaration(&state, &DocId::from(MAIN), position).unwrap();
        assert_eq!(found.kind(), SymbolKind::StructMember);
    }

    #[test]
    fn test_hover_range_is_the_word() {
        let mut state = ProjectState::new();
        let position = open(&mut state, "module app;\nint counter;\nfn void main() {\n  coun|ter = 1;\n}");
        let result = hover(&state, &DocId::from(MAIN), position).unwrap();
        assert_eq!(result.contents, "```c3\nint counter\n```\n\nIn module **[app]**");
        assert_eq!(result.range, crate::base::Range::new(3, 2, 3, 9));
    }

    #[test]
    fn test_signature_help_counts_commas() {
        let mut state = ProjectState::new();
        let position = open(
            &mut state,
            "module app;\nfn int add(int a, int b) => a + b;\nfn void main() {\n  add(1, |\n}",
        );
        let signature = signature_help(&state, &DocId::from(MAIN), position).unwrap();
        assert_eq!(signature.label, "int add(int a, int b)");
        assert_eq!(signature.active_parameter, Some(1));
    }

    #[test]
    fn test_signature_help_needs_a_function() {
        let mut state = ProjectState::new();
        let position = open(&mut state, "module app;\nstruct Point { int x; }\nfn void main() {\n  Point(|\n}");
        assert!(signature_help(&state, &DocId::from(MAIN), position).is_none());
    }

    #[test]
    fn test_implementations_of_interface_method() {
        let mut state = ProjectState::new();
        let position = open(
            &mut state,
            "module app;\ninterface Shape { fn float ar|ea(); }\nstruct Square (Shape) { float side; }\nfn float Square.area(&self) => self.side * self.side;\nstruct Line { float len; }\nfn float Line.area(&self) => 0;",
        );
        let found: Vec<String> = find_implementations(&state, &DocId::from(MAIN), position)
            .iter()
            .map(|s| s.fqn())
            .collect();
        assert_eq!(found, vec!["app::Square.area"]);
    }

    #[test]
    fn test_unknown_document() {
        let state = ProjectState::new();
        let doc = DocId::from("file:///missing.c3");
        assert!(find_declaration(&state, &doc, Position::new(0, 0)).is_none());
        assert!(completions(&state, &doc, Position::new(0, 0)).is_empty());
    }
}
