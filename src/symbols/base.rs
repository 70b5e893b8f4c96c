//! Fields shared by every symbol kind.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{DocComment, ModulePath};
use crate::base::{DocId, Range};

/// Identity, location and documentation of a declared symbol.
///
/// `module` is a lookup key back to the owning module, not a link: the
/// symbols table is the authority that turns it back into a [`Module`].
///
/// [`Module`]: super::Module
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolBase {
    pub(crate) name: SmolStr,
    pub(crate) module: ModulePath,
    pub(crate) doc_id: DocId,
    /// Range of the declaring identifier.
    pub(crate) id_range: Range,
    /// Range of the whole declaration.
    pub(crate) doc_range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) doc_comment: Option<DocComment>,
}

impl SymbolBase {
    pub(crate) fn new(
        name: impl Into<SmolStr>,
        module: ModulePath,
        doc_id: DocId,
        id_range: Range,
        doc_range: Range,
    ) -> Self {
        Self {
            name: name.into(),
            module,
            doc_id,
            id_range,
            doc_range,
            doc_comment: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn module(&self) -> &ModulePath {
        &self.module
    }

    #[inline]
    pub fn doc_id(&self) -> &DocId {
        &self.doc_id
    }

    #[inline]
    pub fn id_range(&self) -> Range {
        self.id_range
    }

    #[inline]
    pub fn doc_range(&self) -> Range {
        self.doc_range
    }

    #[inline]
    pub fn doc_comment(&self) -> Option<&DocComment> {
        self.doc_comment.as_ref()
    }

    /// `module::name`, the key under which root symbols are indexed.
    pub fn fqn(&self) -> String {
        if self.module.is_empty() {
            self.name.to_string()
        } else {
            format!("{}::{}", self.module, self.name)
        }
    }
}
