//! Symbol model: the declarations the server knows about.
//!
//! Documents contain modules, modules own their declarations, and
//! functions, structs, enums and faults own their nested symbols:
//!
//! ```text
//! UnitModules (one per document)
//!   └─ Module
//!        ├─ Variable, Def, Distinct, Interface
//!        ├─ Struct / Union ─ StructMember
//!        ├─ Bitstruct ─ StructMember
//!        ├─ Enum ─ Enumerator (+ shared associated values)
//!        ├─ Fault ─ FaultConstant
//!        └─ Function ─ parameters, locals
//! ```
//!
//! Symbols point back at their module through a [`ModulePath`] lookup key,
//! never through a reference. Search results borrow the model through
//! [`SymbolRef`], a tagged view with the capabilities shared by every
//! kind.

mod aliases;
mod base;
mod doc_comment;
mod enums;
mod faults;
mod function;
mod interface;
mod module;
mod module_path;
mod structs;
mod types;
mod variable;

pub use aliases::{Def, DefTarget, Distinct};
pub use base::SymbolBase;
pub use doc_comment::{DocComment, DocCommentContract};
pub use enums::{Enum, Enumerator};
pub use faults::{Fault, FaultConstant};
pub use function::{Function, FunctionKind};
pub use interface::Interface;
pub use module::{Module, UnitModules};
pub use module_path::{ModulePath, normalize_module_name};
pub use structs::{Bitstruct, Struct, StructMember};
pub use types::Type;
pub use variable::{ArgInfo, Variable};

pub(crate) use aliases::{DefBuilder, DistinctBuilder};
pub(crate) use enums::EnumBuilder;
pub(crate) use faults::{FaultBuilder, module_fault_constant};
pub(crate) use function::FunctionBuilder;
pub(crate) use interface::InterfaceBuilder;
pub(crate) use structs::{BitstructBuilder, StructBuilder, StructMemberBuilder};
pub(crate) use variable::VariableBuilder;

use crate::base::{DocId, Range};

/// Symbols that carry a declared type.
pub trait Typeable {
    fn get_type(&self) -> &Type;
}

// ============================================================================
// SYMBOL KIND
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Module,
    Variable,
    Function,
    Struct,
    Union,
    Bitstruct,
    Enum,
    Enumerator,
    Fault,
    FaultConstant,
    Def,
    Distinct,
    Interface,
    StructMember,
}

impl SymbolKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SymbolKind::Module => "Module",
            SymbolKind::Variable => "Variable",
            SymbolKind::Function => "Function",
            SymbolKind::Struct => "Struct",
            SymbolKind::Union => "Union",
            SymbolKind::Bitstruct => "Bitstruct",
            SymbolKind::Enum => "Enum",
            SymbolKind::Enumerator => "Enumerator",
            SymbolKind::Fault => "Fault",
            SymbolKind::FaultConstant => "Fault Constant",
            SymbolKind::Def => "Def",
            SymbolKind::Distinct => "Distinct",
            SymbolKind::Interface => "Interface",
            SymbolKind::StructMember => "Member",
        }
    }
}

// ============================================================================
// SYMBOL REF
// ============================================================================

/// A borrowed view of any symbol.
///
/// Enumerators carry their enum so the shared associated values stay
/// reachable without a back pointer.
#[derive(Clone, Copy, Debug)]
pub enum SymbolRef<'a> {
    Module(&'a Module),
    Variable(&'a Variable),
    Function(&'a Function),
    Struct(&'a Struct),
    Union(&'a Struct),
    Bitstruct(&'a Bitstruct),
    Enum(&'a Enum),
    Enumerator(&'a Enumerator, &'a Enum),
    Fault(&'a Fault),
    FaultConstant(&'a FaultConstant),
    Def(&'a Def),
    Distinct(&'a Distinct),
    Interface(&'a Interface),
    StructMember(&'a StructMember),
}

impl<'a> SymbolRef<'a> {
    /// Wrap a struct, choosing `Union` for unions.
    pub fn from_struct(strukt: &'a Struct) -> Self {
        if strukt.is_union() {
            SymbolRef::Union(strukt)
        } else {
            SymbolRef::Struct(strukt)
        }
    }

    pub fn base(&self) -> &'a SymbolBase {
        match *self {
            SymbolRef::Module(m) => m.base(),
            SymbolRef::Variable(v) => v.base(),
            SymbolRef::Function(f) => f.base(),
            SymbolRef::Struct(s) | SymbolRef::Union(s) => s.base(),
            SymbolRef::Bitstruct(b) => b.base(),
            SymbolRef::Enum(e) => e.base(),
            SymbolRef::Enumerator(e, _) => e.base(),
            SymbolRef::Fault(f) => f.base(),
            SymbolRef::FaultConstant(c) => c.base(),
            SymbolRef::Def(d) => d.base(),
            SymbolRef::Distinct(d) => d.base(),
            SymbolRef::Interface(i) => i.base(),
            SymbolRef::StructMember(m) => m.base(),
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolRef::Module(_) => SymbolKind::Module,
            SymbolRef::Variable(_) => SymbolKind::Variable,
            SymbolRef::Function(_) => SymbolKind::Function,
            SymbolRef::Struct(_) => SymbolKind::Struct,
            SymbolRef::Union(_) => SymbolKind::Union,
            SymbolRef::Bitstruct(_) => SymbolKind::Bitstruct,
            SymbolRef::Enum(_) => SymbolKind::Enum,
            SymbolRef::Enumerator(..) => SymbolKind::Enumerator,
            SymbolRef::Fault(_) => SymbolKind::Fault,
            SymbolRef::FaultConstant(_) => SymbolKind::FaultConstant,
            SymbolRef::Def(_) => SymbolKind::Def,
            SymbolRef::Distinct(_) => SymbolKind::Distinct,
            SymbolRef::Interface(_) => SymbolKind::Interface,
            SymbolRef::StructMember(_) => SymbolKind::StructMember,
        }
    }

    #[inline]
    pub fn name(&self) -> &'a str {
        self.base().name()
    }

    #[inline]
    pub fn module(&self) -> &'a ModulePath {
        self.base().module()
    }

    #[inline]
    pub fn doc_id(&self) -> &'a DocId {
        self.base().doc_id()
    }

    #[inline]
    pub fn id_range(&self) -> Range {
        self.base().id_range()
    }

    #[inline]
    pub fn doc_range(&self) -> Range {
        self.base().doc_range()
    }

    #[inline]
    pub fn doc_comment(&self) -> Option<&'a DocComment> {
        self.base().doc_comment()
    }

    /// `module::name`, or `module::Type.name` for methods, struct members
    /// and enumerators. A module is named by its path alone.
    pub fn fqn(&self) -> String {
        let owner = match *self {
            SymbolRef::Module(m) => return m.path().to_string(),
            SymbolRef::StructMember(m) => m.owner(),
            SymbolRef::Enumerator(_, e) => e.name(),
            _ => "",
        };
        if owner.is_empty() {
            return self.base().fqn();
        }
        let base = self.base();
        if base.module().is_empty() {
            format!("{owner}.{}", base.name())
        } else {
            format!("{}::{owner}.{}", base.module(), base.name())
        }
    }

    /// The declared type, for the kinds that carry one.
    pub fn typeable(&self) -> Option<&'a dyn Typeable> {
        match *self {
            SymbolRef::Variable(v) => Some(v),
            SymbolRef::Function(f) => Some(f),
            SymbolRef::StructMember(m) => Some(m),
            _ => None,
        }
    }

    /// Whether this symbol names a type rather than a value.
    pub fn is_type(&self) -> bool {
        match self {
            SymbolRef::Struct(_)
            | SymbolRef::Union(_)
            | SymbolRef::Bitstruct(_)
            | SymbolRef::Enum(_)
            | SymbolRef::Fault(_)
            | SymbolRef::Distinct(_)
            | SymbolRef::Interface(_) => true,
            SymbolRef::Def(def) => def.resolves_to_type(),
            _ => false,
        }
    }

    /// Identity comparison: same declaration in the same document.
    pub fn same_as(&self, other: &SymbolRef<'_>) -> bool {
        self.kind() == other.kind()
            && self.name() == other.name()
            && self.doc_id() == other.doc_id()
            && self.id_range() == other.id_range()
    }

    /// One-line signature shown in hovers.
    pub fn hover_info(&self) -> String {
        match self {
            SymbolRef::Variable(v) => v.hover_info(),
            SymbolRef::Function(f) => f.hover_info(),
            SymbolRef::StructMember(m) => m.hover_info(),
            SymbolRef::Def(d) => d.hover_info(),
            SymbolRef::Distinct(d) => d.hover_info(),
            SymbolRef::Enumerator(e, _) => e.hover_info(),
            _ => self.name().to_string(),
        }
    }

    /// Short detail shown next to a completion label.
    pub fn completion_detail(&self) -> String {
        match self {
            SymbolRef::Variable(v) => v.get_type().to_string(),
            SymbolRef::StructMember(m) => m.get_type().to_string(),
            SymbolRef::Function(f) => f.hover_info(),
            SymbolRef::Struct(_)
            | SymbolRef::Union(_)
            | SymbolRef::Def(_)
            | SymbolRef::Distinct(_)
            | SymbolRef::Bitstruct(_) => "Type".to_string(),
            SymbolRef::Enumerator(_, e) => format!("{} value", e.name()),
            SymbolRef::Interface(_) => "Interface".to_string(),
            other => other.kind().display_name().to_string(),
        }
    }
}
