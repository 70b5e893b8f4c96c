//! Source documents and their parsed trees.

use rowan::GreenNode;

use crate::base::{ContentChange, DocId, LineIndex, Position, TextSize, apply_changes};
use crate::syntax::{self, SyntaxNode};

/// One source file as the server sees it.
///
/// The tree and line index are rebuilt whenever the text changes, so they
/// always describe the current text.
#[derive(Clone, Debug)]
pub struct Document {
    doc_id: DocId,
    text: String,
    version: i32,
    green: GreenNode,
    line_index: LineIndex,
    /// Opened by the editor, as opposed to indexed from disk.
    owned_by_editor: bool,
}

impl Document {
    pub fn new(doc_id: DocId, text: impl Into<String>, version: i32) -> Self {
        let text = text.into();
        let green = syntax::parse(&text).into_green();
        let line_index = LineIndex::new(&text);
        Self {
            doc_id,
            text,
            version,
            green,
            line_index,
            owned_by_editor: false,
        }
    }

    #[inline]
    pub fn doc_id(&self) -> &DocId {
        &self.doc_id
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn is_owned_by_editor(&self) -> bool {
        self.owned_by_editor
    }

    pub(crate) fn set_owned_by_editor(&mut self, owned: bool) {
        self.owned_by_editor = owned;
    }

    pub(crate) fn set_doc_id(&mut self, doc_id: DocId) {
        self.doc_id = doc_id;
    }

    /// Apply incremental edits and reparse.
    pub fn apply_changes(&mut self, changes: &[ContentChange], version: i32) {
        apply_changes(&mut self.text, changes);
        self.version = version;
        self.reparse();
    }

    /// Replace the whole text and reparse.
    pub fn set_text(&mut self, text: impl Into<String>, version: i32) {
        self.text = text.into();
        self.version = version;
        self.reparse();
    }

    fn reparse(&mut self) {
        self.green = syntax::parse(&self.text).into_green();
        self.line_index = LineIndex::new(&self.text);
    }

    /// Byte offset of `position`, clamped into the text.
    pub fn offset(&self, position: Position) -> usize {
        usize::from(self.line_index.offset(&self.text, position))
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = TextSize::from(offset.min(self.text.len()) as u32);
        self.line_index.position(&self.text, offset)
    }
}
