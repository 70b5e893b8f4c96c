//! Functions, methods and macros.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{DocComment, ModulePath, SymbolBase, Type, Typeable, Variable};
use crate::base::{DocId, Position, Range};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    Free,
    Method,
    Macro,
}

/// A function, method or macro.
///
/// Methods are named `Type.method`; [`Function::method_name`] gives the
/// part after the dot and [`Function::type_identifier`] the receiver type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Function {
    #[serde(flatten)]
    base: SymbolBase,
    kind: FunctionKind,
    return_type: Type,
    /// Parameters keyed by name, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    args: IndexMap<SmolStr, Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_identifier: Option<SmolStr>,
    /// Locals in declaration order. Names may repeat across nested blocks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    locals: Vec<Variable>,
}

impl Function {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    /// Full name: `name` for free functions, `Type.name` for methods.
    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// Name without the receiver type.
    pub fn method_name(&self) -> &str {
        let name = self.base.name();
        name.rsplit_once('.').map_or(name, |(_, method)| method)
    }

    #[inline]
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    #[inline]
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    /// Receiver type for methods.
    pub fn type_identifier(&self) -> Option<&str> {
        self.type_identifier.as_deref()
    }

    pub fn argument_ids(&self) -> impl Iterator<Item = &str> {
        self.args.keys().map(SmolStr::as_str)
    }

    pub fn arguments(&self) -> impl Iterator<Item = &Variable> {
        self.args.values()
    }

    pub fn argument(&self, name: &str) -> Option<&Variable> {
        self.args.get(name)
    }

    pub fn locals(&self) -> &[Variable] {
        &self.locals
    }

    /// The latest local named `name` whose declaration starts before
    /// `position`.
    pub fn local_before(&self, name: &str, position: Position) -> Option<&Variable> {
        self.locals
            .iter()
            .rev()
            .find(|local| local.name() == name && local.base().doc_range().start < position)
    }

    /// Locals declared before `position`.
    pub fn locals_before(&self, position: Position) -> impl Iterator<Item = &Variable> {
        self.locals
            .iter()
            .filter(move |local| local.base().doc_range().start < position)
    }

    /// `Ret Full.Name(T a, T b)`
    pub fn hover_info(&self) -> String {
        format!("{} {}({})", self.return_type, self.base.name, self.parameters_label())
    }

    /// Comma separated `Type name` list of the parameters.
    pub fn parameters_label(&self) -> String {
        self.args
            .values()
            .map(|arg| format!("{} {}", arg.get_type(), arg.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
        for arg in self.args.values_mut() {
            arg.rebase_doc_id(doc_id);
        }
        for local in &mut self.locals {
            local.rebase_doc_id(doc_id);
        }
    }

    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        self.return_type.for_each_mut(f);
        for arg in self.args.values_mut() {
            arg.for_each_type_mut(f);
        }
        for local in &mut self.locals {
            local.for_each_type_mut(f);
        }
    }
}

impl Typeable for Function {
    /// The return type.
    fn get_type(&self) -> &Type {
        &self.return_type
    }
}

pub(crate) struct FunctionBuilder {
    function: Function,
}

impl FunctionBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, return_type: Type, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            function: Function {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                kind: FunctionKind::Free,
                return_type,
                args: IndexMap::new(),
                type_identifier: None,
                locals: Vec::new(),
            },
        }
    }

    /// Turn this into a method of `type_name`; the name becomes `Type.name`.
    pub(crate) fn method_of(mut self, type_name: impl Into<SmolStr>) -> Self {
        let type_name = type_name.into();
        self.function.base.name = SmolStr::new(format!("{}.{}", type_name, self.function.base.name));
        self.function.type_identifier = Some(type_name);
        if self.function.kind == FunctionKind::Free {
            self.function.kind = FunctionKind::Method;
        }
        self
    }

    pub(crate) fn is_macro(mut self) -> Self {
        self.function.kind = FunctionKind::Macro;
        self
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.function.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.function.base.doc_range = range;
        self
    }

    pub(crate) fn doc_comment(mut self, doc: Option<DocComment>) -> Self {
        self.function.base.doc_comment = doc;
        self
    }

    pub(crate) fn argument(mut self, arg: Variable) -> Self {
        self.function.args.insert(SmolStr::new(arg.name()), arg);
        self
    }

    pub(crate) fn local(mut self, local: Variable) -> Self {
        self.function.locals.push(local);
        self
    }

    pub(crate) fn build(self) -> Function {
        self.function
    }
}
