//! Top-level traversal: module regions and declaration dispatch.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use tracing::trace;

use super::{PendingToResolve, child, children, name_token};
use crate::base::{DocId, LineIndex, Position, Range};
use crate::symbols::{DocComment, Module, ModulePath, UnitModules, normalize_module_name};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxToken};

/// The module declarations are currently attached to.
pub(super) struct Scope {
    pub(super) name: SmolStr,
    pub(super) path: ModulePath,
    generic_parameters: Vec<SmolStr>,
}

impl Scope {
    fn new(path: ModulePath, generic_parameters: Vec<SmolStr>) -> Self {
        Self {
            name: SmolStr::new(path.to_string()),
            path,
            generic_parameters,
        }
    }

    pub(super) fn is_generic_parameter(&self, name: &str) -> bool {
        self.generic_parameters.iter().any(|p| p == name)
    }
}

pub(super) struct Collector<'t> {
    pub(super) doc_id: DocId,
    text: &'t str,
    line_index: LineIndex,
    unit: UnitModules,
    pub(super) pending: PendingToResolve,
    pub(super) scope: Scope,
    /// Whether `scope` has been registered in `unit` yet.
    module_open: bool,
    /// Where the current module region starts.
    region_start: Position,
}

impl<'t> Collector<'t> {
    pub(super) fn new(doc_id: DocId, text: &'t str) -> Self {
        let anonymous = ModulePath::parse(&normalize_module_name(doc_id.file_name()));
        Self {
            unit: UnitModules::new(doc_id.clone()),
            doc_id,
            text,
            line_index: LineIndex::new(text),
            pending: PendingToResolve::new(),
            scope: Scope::new(anonymous, Vec::new()),
            module_open: false,
            region_start: Position::default(),
        }
    }

    pub(super) fn collect(mut self, root: &SyntaxNode) -> (UnitModules, PendingToResolve) {
        for node in root.children() {
            match node.kind() {
                SyntaxKind::MODULE_DECL => self.module_decl(&node),
                SyntaxKind::IMPORT_DECL => {
                    self.open_module();
                    let imports: Vec<_> = children(&node, SyntaxKind::MODULE_PATH)
                        .map(|path| ModulePath::parse(&super::compact_text(&path)))
                        .filter(|path| !path.is_empty())
                        .collect();
                    self.with_module(|module| {
                        for import in imports {
                            module.add_import(import);
                        }
                    });
                    self.extend_region(&node);
                }
                SyntaxKind::ERROR => {}
                _ => {
                    self.open_module();
                    if self.declaration(&node) {
                        self.extend_region(&node);
                    }
                }
            }
        }

        self.open_module();
        let end = self.position(TextSize::of(self.text));
        let start = self.region_start;
        self.with_module(|module| module.set_doc_range(Range::from_positions(start, end)));

        trace!(doc = %self.doc_id, modules = self.unit.len(), "built document symbols");
        (self.unit, self.pending)
    }

    // ========================================================================
    // MODULE REGIONS
    // ========================================================================

    fn module_decl(&mut self, node: &SyntaxNode) {
        let Some(path_node) = child(node, SyntaxKind::MODULE_PATH) else {
            return;
        };
        let path = ModulePath::parse(&super::compact_text(&path_node));
        if path.is_empty() {
            return;
        }

        let generic_parameters: Vec<SmolStr> = child(node, SyntaxKind::GENERIC_PARAMS)
            .into_iter()
            .flat_map(|params| children(&params, SyntaxKind::NAME).collect::<Vec<_>>())
            .filter_map(|name| name.first_token())
            .map(|token| SmolStr::new(token.text()))
            .collect();

        let doc_range = self.node_range(node);
        let mut module = Module::new(path.clone(), self.doc_id.clone(), self.node_range(&path_node), doc_range);
        module.set_generic_parameters(generic_parameters.clone());
        module.set_doc_comment(doc_comment(node));
        for attribute in children(node, SyntaxKind::ATTRIBUTE) {
            let text = super::compact_text(&attribute);
            if text == "@private" {
                module.set_private(true);
            }
            module.add_attribute(text);
        }

        self.unit.register_module(module);
        self.scope = Scope::new(path, generic_parameters);
        self.module_open = true;
        self.region_start = doc_range.start;
    }

    /// Register the file-named module for declarations before any `module`.
    fn open_module(&mut self) {
        if self.module_open {
            return;
        }
        let module = Module::new(self.scope.path.clone(), self.doc_id.clone(), Range::default(), Range::default());
        self.unit.register_module(module);
        self.module_open = true;
        self.region_start = Position::default();
    }

    fn extend_region(&mut self, node: &SyntaxNode) {
        let end = self.position(node.text_range().end());
        let start = self.region_start;
        self.with_module(|module| module.set_doc_range(Range::from_positions(start, end)));
    }

    pub(super) fn with_module(&mut self, f: impl FnOnce(&mut Module)) {
        if let Some(module) = self.unit.get_mut(&self.scope.name) {
            f(module);
        }
    }

    // ========================================================================
    // RANGES
    // ========================================================================

    fn position(&self, offset: TextSize) -> Position {
        self.line_index.position(self.text, offset)
    }

    pub(super) fn range(&self, range: TextRange) -> Range {
        Range::from_positions(self.position(range.start()), self.position(range.end()))
    }

    pub(super) fn node_range(&self, node: &SyntaxNode) -> Range {
        self.range(node.text_range())
    }

    pub(super) fn token_range(&self, token: &SyntaxToken) -> Range {
        self.range(token.text_range())
    }

    /// The declared name and its range. A missing name is empty, with an
    /// empty range at the start of the declaration.
    pub(super) fn name(&self, node: &SyntaxNode) -> (SmolStr, Range) {
        match name_token(node) {
            Some(token) => (SmolStr::new(token.text()), self.token_range(&token)),
            None => {
                let start = self.position(node.text_range().start());
                (SmolStr::default(), Range::from_positions(start, start))
            }
        }
    }
}

/// The `<* ... *>` comment right before a declaration, if any.
pub(super) fn doc_comment(node: &SyntaxNode) -> Option<DocComment> {
    let mut element = node.prev_sibling_or_token();
    while let Some(current) = element {
        match current.kind() {
            SyntaxKind::WHITESPACE | SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT => {
                element = current.prev_sibling_or_token();
            }
            SyntaxKind::DOC_COMMENT => {
                return current.into_token().map(|token| DocComment::parse(token.text()));
            }
            _ => return None,
        }
    }
    None
}
