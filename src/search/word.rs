//! Reconstruct the word under the cursor.
//!
//! Walks left from the cursor collecting identifiers separated by `.`
//! (the access path) and `::` (the module path). Call and index groups
//! are skipped, so `list.get(0).name` has the access path `[list, get]`.

use crate::base::{Position, Range};
use crate::project::Document;
use crate::symbols::{Module, ModulePath};

/// One identifier of a [`Word`] and where it is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordPart {
    pub text: String,
    pub range: Range,
}

/// The identifier under the cursor with its qualifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Word {
    head: Option<WordPart>,
    access_path: Vec<WordPart>,
    module_path: Vec<WordPart>,
    resolved_module: Option<ModulePath>,
}

impl Word {
    /// The text under the cursor; `.`/`:` when the cursor sits on a
    /// separator, empty right after one.
    pub fn text(&self) -> &str {
        self.head.as_ref().map_or("", |h| h.text.as_str())
    }

    pub fn range(&self) -> Range {
        self.head.as_ref().map(|h| h.range).unwrap_or_default()
    }

    /// Whether the head is an identifier rather than a separator or
    /// nothing.
    pub fn is_identifier(&self) -> bool {
        self.text().bytes().next().is_some_and(is_ident_byte)
    }

    /// The text usable as a completion prefix.
    pub fn prefix(&self) -> &str {
        if self.is_identifier() { self.text() } else { "" }
    }

    pub fn access_path(&self) -> &[WordPart] {
        &self.access_path
    }

    pub fn has_access_path(&self) -> bool {
        !self.access_path.is_empty()
    }

    pub fn module_path(&self) -> &[WordPart] {
        &self.module_path
    }

    pub fn has_module_path(&self) -> bool {
        !self.module_path.is_empty()
    }

    /// The module path as written.
    pub fn written_module(&self) -> ModulePath {
        ModulePath::new(self.module_path.iter().map(|p| p.text.as_str()))
    }

    /// The module path after matching it against imports, or as written.
    pub fn resolved_module(&self) -> ModulePath {
        self.resolved_module
            .clone()
            .unwrap_or_else(|| self.written_module())
    }

    /// Expand a partial module path (`io` for `import std::io`) using the
    /// imports of `module`.
    pub fn resolve_module_path(&mut self, module: &Module) {
        if self.module_path.is_empty() {
            return;
        }
        let written = self.written_module();
        self.resolved_module = module
            .imports()
            .iter()
            .find(|import| import.ends_with(&written))
            .cloned();
    }

    /// The access path followed by the head.
    pub fn full_access_path(&self) -> Vec<&WordPart> {
        self.access_path.iter().chain(self.head.as_ref()).collect()
    }

    /// The range from the first qualifier to the end of the head.
    pub fn full_range(&self) -> Range {
        let start = self
            .module_path
            .first()
            .or_else(|| self.access_path.first())
            .map_or(self.range().start, |p| p.range.start);
        Range::from_positions(start, self.range().end)
    }

    /// The word for the last access path segment, with the rest as its
    /// own access path. Used to resolve the parent of the head.
    pub fn parent(&self) -> Option<Word> {
        let (last, rest) = self.access_path.split_last()?;
        Some(Word {
            head: Some(last.clone()),
            access_path: rest.to_vec(),
            module_path: self.module_path.clone(),
            resolved_module: self.resolved_module.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn access_texts(&self) -> Vec<&str> {
        self.access_path.iter().map(|p| p.text.as_str()).collect()
    }

    #[cfg(test)]
    pub(crate) fn module_texts(&self) -> Vec<&str> {
        self.module_path.iter().map(|p| p.text.as_str()).collect()
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// The word under `position` in `document`.
pub fn word_at(document: &Document, position: Position) -> Word {
    let text = document.text();
    let offset = document.offset(position).min(text.len());
    let raw = scan(text.as_bytes(), offset);

    let part = |(start, end): (usize, usize)| WordPart {
        text: text[start..end].to_string(),
        range: Range::from_positions(document.position(start), document.position(end)),
    };
    Word {
        head: raw.head.map(part),
        access_path: raw.access_path.into_iter().map(part).collect(),
        module_path: raw.module_path.into_iter().map(part).collect(),
        resolved_module: None,
    }
}

/// Byte spans found by [`scan`].
#[derive(Debug, Default, PartialEq, Eq)]
struct RawWord {
    head: Option<(usize, usize)>,
    access_path: Vec<(usize, usize)>,
    module_path: Vec<(usize, usize)>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Qualifier {
    Access,
    Module,
}

fn scan(bytes: &[u8], offset: usize) -> RawWord {
    let mut word = RawWord::default();
    let at = bytes.get(offset).copied();

    // Head: an identifier containing the cursor, a separator under the
    // cursor, an identifier ending at the cursor, or nothing right after a
    // separator.
    let ident_head = |from: usize| {
        let start = ident_start(bytes, from);
        (start, ident_end(bytes, start))
    };
    let mut cursor = if at.is_some_and(is_ident_byte) {
        let (start, end) = ident_head(offset);
        word.head = Some((start, end));
        start
    } else if at == Some(b'.') {
        word.head = Some((offset, offset + 1));
        offset + 1
    } else if at == Some(b':') {
        word.head = Some((offset, offset + 1));
        if offset > 0 && bytes[offset - 1] == b':' {
            offset + 1
        } else if bytes.get(offset + 1) == Some(&b':') {
            offset + 2
        } else {
            return word;
        }
    } else if offset > 0 && is_ident_byte(bytes[offset - 1]) {
        let (start, end) = ident_head(offset - 1);
        word.head = Some((start, end));
        start
    } else if offset > 0 && matches!(bytes[offset - 1], b'.' | b':') {
        word.head = Some((offset, offset));
        offset
    } else {
        return word;
    };

    let mut mode: Option<Qualifier> = None;
    loop {
        let separator = if cursor > 0 && bytes[cursor - 1] == b'.' {
            Qualifier::Access
        } else if cursor > 1 && bytes[cursor - 1] == b':' && bytes[cursor - 2] == b':' {
            Qualifier::Module
        } else {
            break;
        };
        // A module path never has an access path before it.
        if mode == Some(Qualifier::Module) && separator == Qualifier::Access {
            break;
        }
        mode = Some(separator);
        cursor -= if separator == Qualifier::Access { 1 } else { 2 };

        if separator == Qualifier::Access {
            cursor = skip_groups(bytes, cursor);
        }
        if cursor == 0 || !is_ident_byte(bytes[cursor - 1]) {
            break;
        }
        let start = ident_start(bytes, cursor - 1);
        match separator {
            Qualifier::Access => word.access_path.insert(0, (start, cursor)),
            Qualifier::Module => word.module_path.insert(0, (start, cursor)),
        }
        cursor = start;
    }
    word
}

fn ident_start(bytes: &[u8], mut i: usize) -> usize {
    while i > 0 && is_ident_byte(bytes[i - 1]) {
        i -= 1;
    }
    i
}

fn ident_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    i
}

/// Skip backwards over balanced `(...)` and `[...]` groups ending at
/// `end`. Returns the index just before the opening bracket of the first
/// group, or `end` when no group ends there.
fn skip_groups(bytes: &[u8], mut end: usize) -> usize {
    while end > 0 && matches!(bytes[end - 1], b')' | b']') {
        let mut depth = 0usize;
        let mut i = end;
        let mut matched = false;
        while i > 0 {
            i -= 1;
            match bytes[i] {
                b')' | b']' => depth += 1,
                b'(' | b'[' => {
                    depth -= 1;
                    if depth == 0 {
                        matched = true;
                        break;
                    }
                }
                _ => {}
            }
        }
        if !matched {
            return end;
        }
        end = i;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::DocId;
    use rstest::rstest;

    /// Place the cursor at `|` and scan.
    fn word(source: &str) -> Word {
        let offset = source.find('|').unwrap();
        let text = source.replacen('|', "", 1);
        let document = Document::new(DocId::from("file:///w.c3"), text, 0);
        let position = document.position(offset);
        word_at(&document, position)
    }

    #[rstest]
    #[case("int va|lue = 3;", "value")]
    #[case("int |value = 3;", "value")]
    #[case("int value| = 3;", "value")]
    #[case("$ty|pe", "$type")]
    fn test_head_identifier(#[case] source: &str, #[case] expected: &str) {
        let w = word(source);
        assert_eq!(w.text(), expected);
        assert!(!w.has_access_path());
        assert!(w.is_identifier());
    }

    #[test]
    fn test_access_path() {
        let w = word("o.inner.val|ue;");
        assert_eq!(w.text(), "value");
        assert_eq!(w.access_texts(), vec!["o", "inner"]);
        assert_eq!(w.full_range(), Range::new(0, 0, 0, 13));
    }

    #[test]
    fn test_skips_call_and_index_groups() {
        let w = word("list.get(a, (b)).items[0].na|me");
        assert_eq!(w.text(), "name");
        assert_eq!(w.access_texts(), vec!["list", "get", "items"]);
    }

    #[test]
    fn test_module_path() {
        let w = word("std::io::pri|ntn(\"x\");");
        assert_eq!(w.text(), "printn");
        assert_eq!(w.module_texts(), vec!["std", "io"]);
        assert!(!w.has_access_path());
    }

    #[test]
    fn test_module_then_access() {
        let w = word("io::File.op|en()");
        assert_eq!(w.module_texts(), vec!["io"]);
        assert_eq!(w.access_texts(), vec!["File"]);
    }

    #[rstest]
    #[case("p.|", "", vec!["p"])]
    #[case("p|.", ".", vec!["p"])]
    #[case("io:|:", ":", vec![])]
    fn test_after_and_on_separator(#[case] source: &str, #[case] head: &str, #[case] path: Vec<&str>) {
        let w = word(source);
        assert_eq!(w.text(), head);
        assert_eq!(w.access_texts(), path);
        assert_eq!(w.prefix(), "");
    }

    #[test]
    fn test_module_separator_completion() {
        let w = word("io::|");
        assert_eq!(w.text(), "");
        assert_eq!(w.module_texts(), vec!["io"]);
    }

    #[test]
    fn test_nothing_under_cursor() {
        let w = word("a = |;");
        assert_eq!(w.text(), "");
        assert!(!w.is_identifier());
    }

    #[test]
    fn test_resolve_partial_module_path() {
        let (unit, _) = crate::parser::parse_symbols(
            &DocId::from("file:///w.c3"),
            "module app;\nimport std::io;",
        );
        let mut w = word("io::pri|ntn");
        w.resolve_module_path(unit.get("app").unwrap());
        assert_eq!(w.resolved_module(), ModulePath::parse("std::io"));

        let mut unknown = word("net::op|en");
        unknown.resolve_module_path(unit.get("app").unwrap());
        assert_eq!(unknown.resolved_module(), ModulePath::parse("net"));
    }

    #[test]
    fn test_multibyte_text_before_word() {
        let w = word("// π ≈ 3\nlet.na|me");
        assert_eq!(w.text(), "name");
        assert_eq!(w.range(), Range::new(1, 4, 1, 8));
    }
}
