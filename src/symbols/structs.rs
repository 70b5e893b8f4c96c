//! Structs, unions, bitstructs and their members.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{DocComment, ModulePath, SymbolBase, Type, Typeable};
use crate::base::{DocId, Range};

/// A struct or union.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Struct {
    #[serde(flatten)]
    base: SymbolBase,
    members: Vec<StructMember>,
    #[serde(default)]
    union: bool,
    /// Implemented interfaces, as written.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    implements: Vec<SmolStr>,
}

impl Struct {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn members(&self) -> &[StructMember] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&StructMember> {
        self.members.iter().find(|m| m.name() == name)
    }

    #[inline]
    pub fn is_union(&self) -> bool {
        self.union
    }

    pub fn implements(&self) -> &[SmolStr] {
        &self.implements
    }

    /// Names of the types this struct inlines and still has to expand.
    pub fn pending_inline_types(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|m| m.inline_pending)
            .map(|m| m.ty.name())
    }

    /// Hoist `other`'s members into this struct for the inline member of
    /// type `inlined_type`.
    ///
    /// The hoisted members keep their declaration order and are placed
    /// right after the inline member, so `struct T { inline S; int c; }`
    /// lists `S`'s members before `c`. Returns false, changing nothing,
    /// when no member of that type is waiting for expansion.
    pub fn inherit_members_from(&mut self, inlined_type: &str, other: &[StructMember]) -> bool {
        let Some(at) = self
            .members
            .iter()
            .position(|m| m.inline_pending && m.ty.name() == inlined_type)
        else {
            return false;
        };

        let inline_member = &mut self.members[at];
        inline_member.inline_pending = false;
        inline_member.expanded_inline = true;
        let owner = self.base.name.clone();
        let hoisted = other.iter().cloned().map(|mut m| {
            m.owner = owner.clone();
            m
        });
        self.members.splice(at + 1..at + 1, hoisted);
        true
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
        for member in &mut self.members {
            member.rebase_doc_id(doc_id);
        }
    }

    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        for member in &mut self.members {
            member.for_each_type_mut(f);
        }
    }
}

/// A field of a struct, union or bitstruct.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructMember {
    #[serde(flatten)]
    base: SymbolBase,
    #[serde(rename = "type")]
    ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bit_range: Option<[u32; 2]>,
    #[serde(default)]
    inline_pending: bool,
    #[serde(default)]
    expanded_inline: bool,
    /// Body of a nested `struct name { ... }` member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    substruct: Option<Box<Struct>>,
    /// Name of the struct or bitstruct holding this member.
    #[serde(default, skip_serializing_if = "SmolStr::is_empty")]
    owner: SmolStr,
}

impl StructMember {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn bit_range(&self) -> Option<[u32; 2]> {
        self.bit_range
    }

    /// The struct or bitstruct this member belongs to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_inline_pending(&self) -> bool {
        self.inline_pending
    }

    pub fn is_expanded_inline(&self) -> bool {
        self.expanded_inline
    }

    pub fn substruct(&self) -> Option<&Struct> {
        self.substruct.as_deref()
    }

    pub fn hover_info(&self) -> String {
        format!("{} {}", self.ty, self.base.name)
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
        if let Some(substruct) = &mut self.substruct {
            substruct.rebase_doc_id(doc_id);
        }
    }

    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        self.ty.for_each_mut(f);
        if let Some(substruct) = &mut self.substruct {
            substruct.for_each_type_mut(f);
        }
    }
}

impl Typeable for StructMember {
    fn get_type(&self) -> &Type {
        &self.ty
    }
}

/// A bitstruct with its backing integer type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bitstruct {
    #[serde(flatten)]
    base: SymbolBase,
    backing_type: Type,
    members: Vec<StructMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    implements: Vec<SmolStr>,
}

impl Bitstruct {
    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn backing_type(&self) -> &Type {
        &self.backing_type
    }

    pub fn members(&self) -> &[StructMember] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&StructMember> {
        self.members.iter().find(|m| m.name() == name)
    }

    pub fn implements(&self) -> &[SmolStr] {
        &self.implements
    }

    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
        for member in &mut self.members {
            member.rebase_doc_id(doc_id);
        }
    }

    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        self.backing_type.for_each_mut(f);
        for member in &mut self.members {
            member.for_each_type_mut(f);
        }
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

pub(crate) struct StructBuilder {
    strukt: Struct,
}

impl StructBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            strukt: Struct {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                members: Vec::new(),
                union: false,
                implements: Vec::new(),
            },
        }
    }

    pub(crate) fn union(mut self) -> Self {
        self.strukt.union = true;
        self
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.strukt.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.strukt.base.doc_range = range;
        self
    }

    pub(crate) fn doc_comment(mut self, doc: Option<DocComment>) -> Self {
        self.strukt.base.doc_comment = doc;
        self
    }

    pub(crate) fn implements(mut self, interface: impl Into<SmolStr>) -> Self {
        self.strukt.implements.push(interface.into());
        self
    }

    pub(crate) fn member(mut self, mut member: StructMember) -> Self {
        member.owner = self.strukt.base.name.clone();
        self.strukt.members.push(member);
        self
    }

    pub(crate) fn build(self) -> Struct {
        self.strukt
    }
}

pub(crate) struct StructMemberBuilder {
    member: StructMember,
}

impl StructMemberBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, ty: Type, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            member: StructMember {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                ty,
                bit_range: None,
                inline_pending: false,
                expanded_inline: false,
                substruct: None,
                owner: SmolStr::default(),
            },
        }
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.member.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.member.base.doc_range = range;
        self
    }

    pub(crate) fn bit_range(mut self, low: u32, high: u32) -> Self {
        self.member.bit_range = Some([low, high]);
        self
    }

    /// Member declared with `inline Type`; expanded after registration.
    pub(crate) fn inline_pending(mut self) -> Self {
        self.member.inline_pending = true;
        self
    }

    pub(crate) fn substruct(mut self, body: Struct) -> Self {
        self.member.substruct = Some(Box::new(body));
        self
    }

    pub(crate) fn build(self) -> StructMember {
        self.member
    }
}

pub(crate) struct BitstructBuilder {
    bitstruct: Bitstruct,
}

impl BitstructBuilder {
    pub(crate) fn new(name: impl Into<SmolStr>, backing_type: Type, module: ModulePath, doc_id: DocId) -> Self {
        Self {
            bitstruct: Bitstruct {
                base: SymbolBase::new(name, module, doc_id, Range::default(), Range::default()),
                backing_type,
                members: Vec::new(),
                implements: Vec::new(),
            },
        }
    }

    pub(crate) fn id_range(mut self, range: Range) -> Self {
        self.bitstruct.base.id_range = range;
        self
    }

    pub(crate) fn doc_range(mut self, range: Range) -> Self {
        self.bitstruct.base.doc_range = range;
        self
    }

    pub(crate) fn doc_comment(mut self, doc: Option<DocComment>) -> Self {
        self.bitstruct.base.doc_comment = doc;
        self
    }

    pub(crate) fn implements(mut self, interface: impl Into<SmolStr>) -> Self {
        self.bitstruct.implements.push(interface.into());
        self
    }

    pub(crate) fn member(mut self, mut member: StructMember) -> Self {
        member.owner = self.bitstruct.base.name.clone();
        self.bitstruct.members.push(member);
        self
    }

    pub(crate) fn build(self) -> Bitstruct {
        self.bitstruct
    }
}
