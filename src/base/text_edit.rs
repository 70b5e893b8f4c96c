//! Incremental edits over a document's text.

use super::{LineIndex, Range};

/// One content change as delivered by `textDocument/didChange`.
///
/// Without a range the change replaces the whole document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentChange {
    pub range: Option<Range>,
    pub text: String,
}

impl ContentChange {
    pub fn replace_all(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }

    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            text: text.into(),
        }
    }
}

/// Apply changes in order, each against the text left by the previous one.
///
/// Positions are clamped, so malformed ranges never panic. An inverted
/// range is treated as an insertion at its start.
pub fn apply_changes(text: &mut String, changes: &[ContentChange]) {
    for change in changes {
        match change.range {
            None => {
                text.clear();
                text.push_str(&change.text);
            }
            Some(range) => {
                let index = LineIndex::new(text);
                let start = usize::from(index.offset(text, range.start));
                let end = usize::from(index.offset(text, range.end)).max(start);
                text.replace_range(start..end, &change.text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_whole_document_replacement() {
        let mut text = String::from("module a;");
        apply_changes(&mut text, &[ContentChange::replace_all("module b;")]);
        assert_eq!(text, "module b;");
    }

    #[test]
    fn test_apply_sequential_ranged_edits() {
        let mut text = String::from("int x;\nint y;\n");
        apply_changes(
            &mut text,
            &[
                ContentChange::replace(Range::new(0, 4, 0, 5), "abc"),
                ContentChange::replace(Range::new(1, 0, 1, 3), "char"),
            ],
        );
        assert_eq!(text, "int abc;\nchar y;\n");
    }

    #[test]
    fn test_apply_edit_after_multibyte_characters() {
        let mut text = String::from("String s = \"😀\"; int z;");
        // '😀' counts as two UTF-16 units
        apply_changes(&mut text, &[ContentChange::replace(Range::new(0, 21, 0, 22), "w")]);
        assert_eq!(text, "String s = \"😀\"; int w;");
    }

    #[test]
    fn test_apply_out_of_range_edit_appends() {
        let mut text = String::from("a");
        apply_changes(&mut text, &[ContentChange::replace(Range::new(9, 9, 9, 9), "b")]);
        assert_eq!(text, "ab");
    }
}
