//! Faults and fault constants.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{DocComment, ModulePath, SymbolBase};
use crate::base::{DocId, Range};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    #[serde(flatten)]
    base: SymbolBase,
    #[serde(default)]
    backing_type: SmolStr,
    constants: Vec<FaultConstant>,
}

impl Fault {
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

    pub fn constants(&self) -> &[FaultConstant] {
        &self.constants
    }

    pub fn constant(&self, name: &str) -> Option<&FaultConstant> {
        self.constants.iter().find(|c| c.name() == name)
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
        for constant in &mut self.constants {
            constant.rebase_doc_id(doc_id);
        }
    }
}

/// A fault value. Constants declared with `faultdef` have no owning fault.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaultConstant {
    #[serde(flatten)]
    base: SymbolBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fault_name: Option<SmolStr>,
}

impl FaultConstant {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn fault_name(&self) -> Option<&str> {
        self.fault_name.as_deref()
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
    }
}

pub(crate) struct FaultBuilder {
    fault: Fault,
}

impl FaultBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, backing_type: impl Into<SmolStr>, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            fault: Fault {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                backing_type: backing_type.into(),
                constants: Vec::new(),
            },
        }
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.fault.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.fault.base.doc_range = range;
        self
    }

    pub(crate) fn doc_comment(mut self, doc: Option<DocComment>) -> Self {
        self.fault.base.doc_comment = doc;
        self
    }

    pub(crate) fn constant(mut self, name: impl Into<SmolStr>, id_range: Range) -> Self {
        let base = &self.fault.base;
        self.fault.constants.push(FaultConstant {
            base: SymbolBase::new(name, base.module.clone(), base.doc_id.clone(), id_range, id_range),
            fault_name: Some(base.name.clone()),
        });
        self
    }

    pub(crate) fn build(self) -> Fault {
        self.fault
    }
}

/// Build a `faultdef` constant that lives directly under its module.
pub(crate) fn module_fault_constant(
    name: impl Into<SmolStr>,
    module: ModulePath,
    doc_id: DocId,
    id_range: Range,
    doc_comment: Option<DocComment>,
) -> FaultConstant {
    let mut base = SymbolBase::new(name, module, doc_id, id_range, id_range);
    base.doc_comment = doc_comment;
    FaultConstant { base, fault_name: None }
}
