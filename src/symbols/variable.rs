//! Variables: globals, constants, parameters, locals and enum associated values.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{DocComment, ModulePath, SymbolBase, Type, Typeable};
use crate::base::{DocId, Range};

/// Extra information carried by function parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgInfo {
    /// `...` parameter.
    pub vararg: bool,
    /// Default value literal, as written.
    pub default: Option<SmolStr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(flatten)]
    base: SymbolBase,
    #[serde(rename = "type")]
    ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arg: Option<ArgInfo>,
    #[serde(default)]
    constant: bool,
}

impl Variable {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn arg_info(&self) -> Option<&ArgInfo> {
        self.arg.as_ref()
    }

    pub fn is_constant(&self) -> bool {
        self.constant
    }

    pub fn hover_info(&self) -> String {
        format!("{} {}", self.ty, self.base.name)
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
    }

    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        self.ty.for_each_mut(f);
    }
}

impl Typeable for Variable {
    fn get_type(&self) -> &Type {
        &self.ty
    }
}

pub(crate) struct VariableBuilder {
    variable: Variable,
}

impl VariableBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, ty: Type, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            variable: Variable {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                ty,
                arg: None,
                constant: false,
            },
        }
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.variable.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.variable.base.doc_range = range;
        self
    }

    pub(crate) fn doc_comment(mut self, doc: Option<DocComment>) -> Self {
        self.variable.base.doc_comment = doc;
        self
    }

    pub(crate) fn arg(mut self, info: ArgInfo) -> Self {
        self.variable.arg = Some(info);
        self
    }

    pub(crate) fn constant(mut self) -> Self {
        self.variable.constant = true;
        self
    }

    pub(crate) fn build(self) -> Variable {
        self.variable
    }
}
