//! What an access path step may read.

use crate::symbols::SymbolRef;

/// How the current parent was reached through a distinct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FromDistinct {
    #[default]
    No,
    Inline,
    NonInline,
}

/// Visibility state threaded through access path resolution.
///
/// Immutable; every transition returns a new context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessContext {
    pub from_distinct: FromDistinct,
    /// Struct members, enumerators and fault constants.
    pub members_readable: bool,
    pub methods_readable: bool,
    /// Whether the parent is a value rather than a type.
    pub instance: bool,
}

impl Default for AccessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessContext {
    pub const fn new() -> Self {
        Self {
            from_distinct: FromDistinct::No,
            members_readable: true,
            methods_readable: true,
            instance: false,
        }
    }

    /// The context after one resolution step from `from` to `to`.
    pub fn after_resolving(self, from: &SymbolRef<'_>, to: &SymbolRef<'_>) -> Self {
        let mut next = self;
        next.members_readable = to.is_type();
        next.instance = self.instance || !from.is_type();

        if let SymbolRef::Distinct(distinct) = from {
            if distinct.is_inline() {
                next.from_distinct = FromDistinct::Inline;
                next.methods_readable = self.methods_readable && next.instance;
            } else {
                next.from_distinct = FromDistinct::NonInline;
                next.methods_readable = false;
            }
        }
        next
    }

    /// The context after `member` was found on the parent.
    pub fn after_finding_member(self, member: &SymbolRef<'_>) -> Self {
        let is_type = member.is_type();
        Self {
            from_distinct: FromDistinct::No,
            members_readable: is_type,
            methods_readable: true,
            instance: !is_type,
        }
    }

    /// Direct members pass through inline distincts only.
    pub fn can_read_members(&self) -> bool {
        self.members_readable && self.from_distinct != FromDistinct::NonInline
    }
}
