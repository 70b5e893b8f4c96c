//! Symbol construction from the syntax tree.
//!
//! Walks the top level of one document's tree and builds its
//! [`UnitModules`]: module regions, their imports and declarations, and
//! for every function its parameters and locals. Types that name user
//! declarations are recorded in a [`PendingToResolve`] together with
//! `inline` struct members, for the symbols table to bind once every
//! document is registered.
//!
//! Malformed regions (`ERROR` nodes) are skipped. A declaration with a
//! missing name is still recorded, with an empty name and range.

mod collector;
mod declarations;
mod pending;
mod types;

#[cfg(test)]
mod tests;

pub use pending::{PendingInlineStruct, PendingToResolve, PendingTypeContext};

use crate::base::DocId;
use crate::symbols::UnitModules;
use crate::syntax::{self, SyntaxKind, SyntaxNode, SyntaxToken};

use collector::Collector;

/// Build the symbols of a document from its parsed tree.
pub fn build_symbols(doc_id: &DocId, text: &str, root: &SyntaxNode) -> (UnitModules, PendingToResolve) {
    Collector::new(doc_id.clone(), text).collect(root)
}

/// Parse `text` and build its symbols.
pub fn parse_symbols(doc_id: &DocId, text: &str) -> (UnitModules, PendingToResolve) {
    let parse = syntax::parse(text);
    build_symbols(doc_id, text, &parse.syntax())
}

// ============================================================================
// TREE HELPERS
// ============================================================================

fn child(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    node.children().find(|n| n.kind() == kind)
}

fn children(node: &SyntaxNode, kind: SyntaxKind) -> impl Iterator<Item = SyntaxNode> {
    node.children().filter(move |n| n.kind() == kind)
}

/// A direct child token of `kind`.
fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    token(node, kind).is_some()
}

/// The identifier token inside a `NAME` child.
fn name_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    child(node, SyntaxKind::NAME).and_then(|n| n.first_token())
}

/// Source text of a node with comments removed and whitespace runs
/// collapsed to single spaces.
fn compact_text(node: &SyntaxNode) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for token in node.descendants_with_tokens().filter_map(|e| e.into_token()) {
        match token.kind() {
            SyntaxKind::WHITESPACE => pending_space = true,
            kind if kind.is_trivia() => pending_space = true,
            _ => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push_str(token.text());
            }
        }
    }
    out
}

/// `42`, `0x1F`, `0b101`, `1_000`.
fn parse_int(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u32::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u32::from_str_radix(oct, 8).ok()
    } else {
        lower.parse().ok()
    }
}
