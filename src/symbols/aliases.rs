//! Type and symbol aliases: `def`/`alias` and `distinct`/`typedef`.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{DocComment, ModulePath, SymbolBase, Type};
use crate::base::{DocId, Range};

/// What a [`Def`] stands for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DefTarget {
    /// Alias of another declaration, e.g. `def print = io::printn;`.
    Identifier(SmolStr),
    /// Type alias, e.g. `def IntList = List{int};`.
    Type(Type),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Def {
    #[serde(flatten)]
    base: SymbolBase,
    target: DefTarget,
}

impl Def {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn target(&self) -> &DefTarget {
        &self.target
    }

    pub fn resolved_type(&self) -> Option<&Type> {
        match &self.target {
            DefTarget::Type(ty) => Some(ty),
            DefTarget::Identifier(_) => None,
        }
    }

    pub fn resolves_to_type(&self) -> bool {
        matches!(self.target, DefTarget::Type(_))
    }

    pub fn hover_info(&self) -> String {
        match &self.target {
            DefTarget::Identifier(ident) => format!("def {} = {}", self.base.name, ident),
            DefTarget::Type(ty) => format!("def {} = {}", self.base.name, ty),
        }
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
    }

    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        if let DefTarget::Type(ty) = &mut self.target {
            ty.for_each_mut(f);
        }
    }
}

/// A distinct type. Only an inline distinct exposes its base type's members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distinct {
    #[serde(flatten)]
    base: SymbolBase,
    base_type: Type,
    #[serde(default)]
    inline: bool,
}

impl Distinct {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn base_type(&self) -> &Type {
        &self.base_type
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        self.inline
    }

    pub fn hover_info(&self) -> String {
        let inline = if self.inline { "inline " } else { "" };
        format!("distinct {} = {}{}", self.base.name, inline, self.base_type)
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
    }

    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        self.base_type.for_each_mut(f);
    }
}

pub(crate) struct DefBuilder {
    def: Def,
}

impl DefBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, target: DefTarget, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            def: Def {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                target,
            },
        }
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.def.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.def.base.doc_range = range;
        self
    }

    pub(crate) fn doc_comment(mut self, doc: Option<DocComment>) -> Self {
        self.def.base.doc_comment = doc;
        self
    }

    pub(crate) fn build(self) -> Def {
        self.def
    }
}

pub(crate) struct DistinctBuilder {
    distinct: Distinct,
}

impl DistinctBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, base_type: Type, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            distinct: Distinct {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                base_type,
                inline: false,
            },
        }
    }

    pub(crate) fn inline(mut self, inline: bool) -> Self {
        self.distinct.inline = inline;
        self
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.distinct.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.distinct.base.doc_range = range;
        self
    }

    pub(crate) fn doc_comment(mut self, doc: Option<DocComment>) -> Self {
        self.distinct.base.doc_comment = doc;
        self
    }

    pub(crate) fn build(self) -> Distinct {
        self.distinct
    }
}
