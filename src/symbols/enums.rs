//! Enums and their enumerators.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{DocComment, ModulePath, SymbolBase, Type, Variable};
use crate::base::{DocId, Range};

/// An enum with its enumerators and associated-value schema.
///
/// `enum Color : int (String hex) { RED("f00") }` declares one associated
/// value `hex`; every enumerator exposes it as a field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    #[serde(flatten)]
    base: SymbolBase,
    #[serde(default)]
    backing_type: SmolStr,
    enumerators: Vec<Enumerator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    associated_values: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    implements: Vec<SmolStr>,
}

impl Enum {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn backing_type(&self) -> &str {
        &self.backing_type
    }

    pub fn enumerators(&self) -> &[Enumerator] {
        &self.enumerators
    }

    pub fn enumerator(&self, name: &str) -> Option<&Enumerator> {
        self.enumerators.iter().find(|e| e.name() == name)
    }

    /// The associated-value schema shared by all enumerators.
    pub fn associated_values(&self) -> &[Variable] {
        &self.associated_values
    }

    pub fn associated_value(&self, name: &str) -> Option<&Variable> {
        self.associated_values.iter().find(|v| v.name() == name)
    }

    pub fn implements(&self) -> &[SmolStr] {
        &self.implements
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
        for enumerator in &mut self.enumerators {
            enumerator.base.doc_id = doc_id.clone();
        }
        for value in &mut self.associated_values {
            value.rebase_doc_id(doc_id);
        }
    }

    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        for value in &mut self.associated_values {
            value.for_each_type_mut(f);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enumerator {
    #[serde(flatten)]
    base: SymbolBase,
    /// Value literal as written, possibly empty.
    #[serde(default)]
    value: SmolStr,
    enum_name: SmolStr,
}

impl Enumerator {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Name of the owning enum.
    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }

    pub fn hover_info(&self) -> String {
        if self.value.is_empty() {
            self.base.name.to_string()
        } else {
            format!("{}: {}", self.base.name, self.value)
        }
    }
}

pub(crate) struct EnumBuilder {
    enumeration: Enum,
}

impl EnumBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, backing_type: impl Into<SmolStr>, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            enumeration: Enum {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                backing_type: backing_type.into(),
                enumerators: Vec::new(),
                associated_values: Vec::new(),
                implements: Vec::new(),
            },
        }
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.enumeration.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.enumeration.base.doc_range = range;
        self
    }

    pub(crate) fn doc_comment(mut self, doc: Option<DocComment>) -> Self {
        self.enumeration.base.doc_comment = doc;
        self
    }

    pub(crate) fn implements(mut self, interface: impl Into<SmolStr>) -> Self {
        self.enumeration.implements.push(interface.into());
        self
    }

    pub(crate) fn associated_value(mut self, value: Variable) -> Self {
        self.enumeration.associated_values.push(value);
        self
    }

    /// Add an enumerator; its owner is this enum.
    pub(crate) fn enumerator(mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>, id_range: Range) -> Self {
        let base = &self.enumeration.base;
        let enumerator_base = SymbolBase::new(name, base.module.clone(), base.doc_id.clone(), id_range, id_range);
        self.enumeration.enumerators.push(Enumerator {
            base: enumerator_base,
            value: value.into(),
            enum_name: base.name.clone(),
        });
        self
    }

    pub(crate) fn build(self) -> Enum {
        self.enumeration
    }
}
