//! Interfaces.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{DocComment, Function, ModulePath, SymbolBase, Type};
use crate::base::{DocId, Range};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(flatten)]
    base: SymbolBase,
    /// Method signatures keyed by method name.
    methods: IndexMap<SmolStr, Function>,
}

impl Interface {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn methods(&self) -> impl Iterator<Item = &Function> {
        self.methods.values()
    }

    pub fn method(&self, name: &str) -> Option<&Function> {
        self.methods.get(name)
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
        for method in self.methods.values_mut() {
            method.rebase_doc_id(doc_id);
        }
    }

    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        for method in self.methods.values_mut() {
            method.for_each_type_mut(f);
        }
    }
}

pub(crate) struct InterfaceBuilder {
    interface: Interface,
}

impl InterfaceBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            interface: Interface {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                methods: IndexMap::new(),
            },
        }
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.interface.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.interface.base.doc_range = range;
        self
    }

    pub(crate) fn doc_comment(mut self, doc: Option<DocComment>) -> Self {
        self.interface.base.doc_comment = doc;
        self
    }

    pub(crate) fn method(mut self, method: Function) -> Self {
        self.interface.methods.insert(SmolStr::new(method.name()), method);
        self
    }

    pub(crate) fn build(self) -> Interface {
        self.interface
    }
}
