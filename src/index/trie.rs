//! Fully qualified name index.
//!
//! Keys are split into segments on `::` and `.`, so `std::io::File.open`
//! is stored under `std` → `io` → `File` → `open`. Every entry is tagged
//! with the document that declared it so a document's entries can be
//! dropped before it is re-indexed.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{DocId, Range};
use crate::symbols::{Module, ModulePath, SymbolKind, SymbolRef};

/// Where an indexed declaration lives.
///
/// `tag` is the registered document the entry belongs to. It differs from
/// `doc_id` only for merged documents such as the stdlib, whose symbols
/// keep the file they were declared in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolLocation {
    pub tag: DocId,
    pub doc_id: DocId,
    pub module: ModulePath,
    /// Name as the module knows it; `Type.method` for methods.
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub id_range: Range,
}

impl SymbolLocation {
    pub fn from_symbol(symbol: &SymbolRef<'_>, tag: &DocId) -> Self {
        Self {
            tag: tag.clone(),
            doc_id: symbol.doc_id().clone(),
            module: symbol.module().clone(),
            name: SmolStr::new(symbol.name()),
            kind: symbol.kind(),
            id_range: symbol.id_range(),
        }
    }

    pub fn fqn(&self) -> String {
        if self.kind == SymbolKind::Module || self.module.is_empty() {
            self.name.to_string()
        } else {
            format!("{}::{}", self.module, self.name)
        }
    }
}

/// How a query string is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    /// `a::b.c`
    Exact,
    /// `a::b.` or `a::b::`
    Children,
    /// `a::b.c*`
    Prefix,
}

#[derive(Clone, Debug, Default)]
struct Node {
    children: FxHashMap<SmolStr, Node>,
    entries: Vec<SymbolLocation>,
}

impl Node {
    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.entries.is_empty()
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a SymbolLocation>) {
        out.extend(self.entries.iter());
        for child in self.children.values() {
            child.collect(out);
        }
    }

    /// Drop entries tagged `tag` below this node; returns how many went.
    fn clear_by_tag(&mut self, tag: &DocId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| &e.tag != tag);
        let mut removed = before - self.entries.len();
        self.children.retain(|_, child| {
            removed += child.clear_by_tag(tag);
            !child.is_empty()
        });
        removed
    }
}

// ============================================================================
// FQN INDEX
// ============================================================================

/// Prefix tree over fully qualified names.
#[derive(Clone, Debug, Default)]
pub struct FqnIndex {
    root: Node,
    len: usize,
}

impl FqnIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one symbol under its fully qualified name.
    pub fn insert(&mut self, location: SymbolLocation) {
        let key = location.fqn();
        let (segments, _) = split_query(&key);
        if segments.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for segment in segments {
            node = node.children.entry(SmolStr::new(segment)).or_default();
        }
        node.entries.push(location);
        self.len += 1;
    }

    /// Index a module and all of its root declarations under `tag`.
    /// Private modules are not reachable from other documents and are
    /// skipped.
    pub fn insert_module(&mut self, module: &Module, tag: &DocId) {
        if module.is_private() {
            return;
        }
        self.insert(SymbolLocation::from_symbol(&SymbolRef::Module(module), tag));
        for child in module.children() {
            self.insert(SymbolLocation::from_symbol(&child, tag));
        }
    }

    /// Remove every entry tagged with `tag`, pruning emptied branches.
    pub fn clear_by_tag(&mut self, tag: &DocId) {
        let removed = self.root.clear_by_tag(tag);
        self.len -= removed;
    }

    /// Look up a query; see [`QueryKind`] for the accepted forms.
    ///
    /// Children and prefix results come in no particular order.
    pub fn search(&self, query: &str) -> Vec<&SymbolLocation> {
        let (mut segments, kind) = split_query(query);
        let mut out = Vec::new();

        match kind {
            QueryKind::Exact => {
                if let Some(node) = self.descend(&segments) {
                    out.extend(node.entries.iter());
                }
            }
            QueryKind::Children => {
                if let Some(node) = self.descend(&segments) {
                    for child in node.children.values() {
                        child.collect(&mut out);
                    }
                }
            }
            QueryKind::Prefix => {
                let prefix = segments.pop().unwrap_or_default();
                if let Some(node) = self.descend(&segments) {
                    for (key, child) in &node.children {
                        if key.starts_with(prefix) {
                            child.collect(&mut out);
                        }
                    }
                }
            }
        }
        out
    }

    /// Entries whose key ends exactly at `query`.
    pub fn get(&self, query: &str) -> &[SymbolLocation] {
        let (segments, _) = split_query(query);
        self.descend(&segments).map_or(&[], |node| node.entries.as_slice())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn descend(&self, segments: &[&str]) -> Option<&Node> {
        let mut node = &self.root;
        for segment in segments {
            node = node.children.get(*segment)?;
        }
        Some(node)
    }
}

/// Split on `::` and `.` and classify the query by its tail.
fn split_query(query: &str) -> (Vec<&str>, QueryKind) {
    let (body, kind) = if let Some(body) = query.strip_suffix('*') {
        (body, QueryKind::Prefix)
    } else if let Some(body) = query.strip_suffix("::").or_else(|| query.strip_suffix('.')) {
        (body, QueryKind::Children)
    } else {
        (query, QueryKind::Exact)
    };

    let segments = body
        .split("::")
        .flat_map(|part| part.split('.'))
        .map(str::trim)
        .collect::<Vec<_>>();
    // A prefix query keeps its last, possibly empty, segment.
    let segments = match kind {
        QueryKind::Prefix => segments,
        _ => segments.into_iter().filter(|s| !s.is_empty()).collect(),
    };
    (segments, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_symbols;
    use rstest::rstest;

    fn index(docs: &[(&str, &str)]) -> FqnIndex {
        let mut trie = FqnIndex::new();
        for (doc, text) in docs {
            let (unit, _) = parse_symbols(&DocId::from(*doc), text);
            for module in unit.modules() {
                trie.insert_module(module, unit.doc_id());
            }
        }
        trie
    }

    fn names(mut found: Vec<&SymbolLocation>) -> Vec<String> {
        found.sort_by_key(|l| l.fqn());
        found.iter().map(|l| l.fqn()).collect()
    }

    const IO: &str = "module std::io;\nstruct File { int fd; }\nfn void File.open(&self) {}\nfn void File.close(&self) {}\nfn void printn(String s) {}";

    #[rstest]
    #[case("std::io::File", QueryKind::Exact, vec!["std", "io", "File"])]
    #[case("std::io::File.", QueryKind::Children, vec!["std", "io", "File"])]
    #[case("std::io::", QueryKind::Children, vec!["std", "io"])]
    #[case("File.op*", QueryKind::Prefix, vec!["File", "op"])]
    #[case("std::io::*", QueryKind::Prefix, vec!["std", "io", ""])]
    fn test_split_query(#[case] query: &str, #[case] kind: QueryKind, #[case] segments: Vec<&str>) {
        assert_eq!(split_query(query), (segments, kind));
    }

    #[test]
    fn test_exact_children_and_prefix() {
        let trie = index(&[("io.c3", IO)]);

        let file = trie.search("std::io::File");
        assert_eq!(file.len(), 1);
        assert_eq!(file[0].kind, SymbolKind::Struct);

        assert_eq!(
            names(trie.search("std::io::File.")),
            vec!["std::io::File.close", "std::io::File.open"]
        );
        assert_eq!(names(trie.search("std::io::File.o*")), vec!["std::io::File.open"]);
        assert_eq!(names(trie.search("std::io::pr*")), vec!["std::io::printn"]);
        assert!(trie.search("std::io::Missing").is_empty());
    }

    #[test]
    fn test_module_entry_and_children() {
        let trie = index(&[("io.c3", IO)]);
        assert_eq!(trie.get("std::io").first().map(|l| l.kind), Some(SymbolKind::Module));
        assert_eq!(trie.search("std::io::").len(), 4);
    }

    #[test]
    fn test_clear_by_tag_prunes_empty_nodes() {
        let mut trie = index(&[("io.c3", IO), ("app.c3", "module app;\nint counter;")]);
        let total = trie.len();

        trie.clear_by_tag(&DocId::from("io.c3"));
        assert_eq!(trie.len(), total - 5);
        assert!(trie.search("std::").is_empty());
        assert!(trie.descend(&["std"]).is_none());
        assert_eq!(trie.search("app::counter").len(), 1);
    }

    #[test]
    fn test_same_module_from_two_documents() {
        let mut trie = index(&[("a.c3", "module app;\nint a;"), ("b.c3", "module app;\nint b;")]);
        assert_eq!(trie.get("app").len(), 2);

        trie.clear_by_tag(&DocId::from("a.c3"));
        assert_eq!(trie.get("app").len(), 1);
        assert!(trie.search("app::a").is_empty());
        assert_eq!(trie.search("app::b").len(), 1);
    }

    #[test]
    fn test_private_modules_are_not_indexed() {
        let trie = index(&[("p.c3", "module secret @private;\nint hidden;")]);
        assert!(trie.is_empty());
    }
}
