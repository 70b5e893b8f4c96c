//! Concrete syntax of C3.
//!
//! A `logos` lexer feeds a hand-written, error-tolerant parser that builds
//! a lossless `rowan` tree. The tree is untyped: consumers walk
//! [`SyntaxNode`]s and match on [`SyntaxKind`].
//!
//! ```text
//! text ──lexer──▶ tokens ──parser──▶ GreenNode ──▶ SyntaxNode
//! ```

mod keywords;
mod kind;
mod lexer;
mod parser;

pub use keywords::{BUILTIN_TYPES, KEYWORDS, is_builtin_type, is_const_ident, is_keyword, is_type_ident};
pub use kind::SyntaxKind;
pub use lexer::{Token, tokenize};
pub use parser::ParseError;

use rowan::GreenNode;

/// Language marker tying rowan trees to [`SyntaxKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum C3Language {}

impl rowan::Language for C3Language {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::from_raw(raw.0)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<C3Language>;
pub type SyntaxToken = rowan::SyntaxToken<C3Language>;
pub type SyntaxElement = rowan::SyntaxElement<C3Language>;

/// Result of parsing one document.
///
/// The green tree is immutable and cheap to clone, so documents keep it
/// and build a [`SyntaxNode`] view whenever they need one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_green(self) -> GreenNode {
        self.green
    }
}

/// Parse C3 source text. Never fails; malformed regions become `ERROR`
/// nodes and entries in [`Parse::errors`].
pub fn parse(text: &str) -> Parse {
    let (green, errors) = parser::parse_source(text);
    Parse { green, errors }
}
