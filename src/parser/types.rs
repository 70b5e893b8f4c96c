//! `TYPE` nodes to [`Type`] values.

use smol_str::SmolStr;

use super::collector::Collector;
use super::{PendingTypeContext, compact_text, parse_int};
use crate::symbols::Type;
use crate::syntax::{SyntaxKind, SyntaxNode, is_builtin_type};

impl Collector<'_> {
    /// Convert a `TYPE` node.
    ///
    /// User types start out attributed to their written qualifier or to the
    /// current module, and are queued for resolution.
    pub(super) fn ty(&mut self, node: &SyntaxNode) -> Type {
        let mut segments: Vec<SmolStr> = Vec::new();
        let mut compile_time = String::new();
        let mut signature: Option<String> = None;
        let mut generic_arguments = Vec::new();
        let mut pointers = 0u8;
        let mut optional = false;
        let mut collection: Option<Option<u32>> = None;

        for element in node.children_with_tokens() {
            match element {
                rowan::NodeOrToken::Token(token) => match token.kind() {
                    SyntaxKind::IDENT if compile_time.is_empty() => segments.push(SmolStr::new(token.text())),
                    SyntaxKind::FAULT_KW => segments.push(SmolStr::new(token.text())),
                    SyntaxKind::CT_IDENT => compile_time.push_str(token.text()),
                    SyntaxKind::STAR => pointers = pointers.saturating_add(1),
                    SyntaxKind::QUESTION | SyntaxKind::BANG => optional = true,
                    kind if kind.is_trivia() || kind == SyntaxKind::COLON_COLON => {}
                    // `$typeof(x)` arguments
                    _ if !compile_time.is_empty() && pointers == 0 => compile_time.push_str(token.text()),
                    _ => {}
                },
                rowan::NodeOrToken::Node(child) => match child.kind() {
                    SyntaxKind::FN_TYPE => signature = Some(compact_text(&child)),
                    SyntaxKind::GENERIC_ARGS => {
                        for argument in super::children(&child, SyntaxKind::TYPE) {
                            generic_arguments.push(self.ty(&argument));
                        }
                    }
                    SyntaxKind::ARRAY_SUFFIX => {
                        let size = child
                            .children_with_tokens()
                            .filter_map(|e| e.into_token())
                            .filter(|t| t.kind() == SyntaxKind::INT_NUMBER)
                            .map(|t| parse_int(t.text()))
                            .next()
                            .flatten();
                        collection = Some(size);
                    }
                    _ => {}
                },
            }
        }

        let mut ty = if let Some(signature) = signature {
            Type::builtin(signature)
        } else if !compile_time.is_empty() {
            Type::builtin(compile_time)
        } else {
            let name = segments.pop().unwrap_or_default();
            let qualifier = segments.join("::");
            self.named_type(&name, &qualifier)
        };

        if !generic_arguments.is_empty() {
            ty = ty.with_generic_arguments(generic_arguments);
        }
        if pointers > 0 {
            ty = ty.with_pointers(pointers);
        }
        if let Some(size) = collection {
            ty = ty.with_collection(size);
        }
        if optional {
            ty = ty.with_optional();
        }
        ty
    }

    /// A type known only by name, as for a method receiver.
    pub(super) fn named_type(&mut self, name: &str, qualifier: &str) -> Type {
        if name.is_empty() {
            return Type::empty();
        }
        if is_builtin_type(name) {
            return Type::builtin(name);
        }
        if qualifier.is_empty() && self.scope.is_generic_parameter(name) {
            return Type::new(name, self.scope.name.clone()).as_generic_argument();
        }

        let written_module = if qualifier.is_empty() {
            self.scope.name.clone()
        } else {
            SmolStr::new(qualifier)
        };
        self.pending.add_type(PendingTypeContext {
            doc_id: self.doc_id.clone(),
            context_module: self.scope.name.clone(),
            type_name: SmolStr::new(name),
            written_module: written_module.clone(),
        });
        Type::new(name, written_module)
    }
}
