//! Resolve names, types and access paths to declarations.

use tracing::{debug, error};

use super::access::AccessContext;
use super::modules::{ModuleScope, SearchContext, collect_modules, modules_at};
use super::word::Word;
use crate::project::ProjectState;
use crate::symbols::{DefTarget, Module, ModulePath, SymbolRef, Type, Typeable};
use crate::syntax::is_keyword;

/// Resolution steps allowed for one access path segment. Running out means
/// the declarations form a cycle.
pub const MAX_RESOLUTION_DEPTH: usize = 100;

/// Name resolution from one cursor context.
pub struct Resolver<'a, 'c> {
    state: &'a ProjectState,
    ctx: &'c SearchContext<'c>,
    modules: Vec<ModuleScope<'a>>,
}

impl<'a, 'c> Resolver<'a, 'c> {
    pub fn new(state: &'a ProjectState, ctx: &'c SearchContext<'c>) -> Self {
        Self {
            state,
            ctx,
            modules: collect_modules(state, ctx),
        }
    }

    pub fn state(&self) -> &'a ProjectState {
        self.state
    }

    pub fn context(&self) -> &SearchContext<'c> {
        self.ctx
    }

    /// Candidate modules in priority order.
    pub fn modules(&self) -> &[ModuleScope<'a>] {
        &self.modules
    }

    /// Whether `scope` is searched with the cursor's function scope.
    pub fn is_local(&self, scope: &ModuleScope<'_>) -> bool {
        scope.doc_id == self.ctx.doc_id && *scope.module.path() == self.ctx.module
    }

    // ========================================================================
    // SIMPLE NAMES
    // ========================================================================

    /// Find a bare identifier.
    ///
    /// Keywords are never found. Otherwise each candidate module is tried in
    /// priority order; the cursor's own module first looks at the enclosing
    /// function's parameters and earlier locals. A name matching none of
    /// them may still name one of the visited modules.
    pub fn find_simple(&self, name: &str) -> Option<SymbolRef<'a>> {
        if is_keyword(name) {
            return None;
        }
        for scope in &self.modules {
            if let Some(found) = self.find_in_scope(scope, name) {
                return Some(found);
            }
        }
        self.modules
            .iter()
            .map(|scope| scope.module)
            .find(|m| m.name() == name || m.path().last() == Some(name))
            .map(SymbolRef::Module)
    }

    fn find_in_scope(&self, scope: &ModuleScope<'a>, name: &str) -> Option<SymbolRef<'a>> {
        if self.is_local(scope) {
            if let Some(function) = scope.module.function_at(self.ctx.position) {
                if let Some(arg) = function.argument(name) {
                    return Some(SymbolRef::Variable(arg));
                }
                if let Some(local) = function.local_before(name, self.ctx.position) {
                    return Some(SymbolRef::Variable(local));
                }
            }
        }
        scope.module.find_child(name)
    }

    /// Find `name` declared in the module `path`, or failing that in a
    /// module whose path ends with `written`.
    pub fn find_qualified(&self, path: &ModulePath, written: &ModulePath, name: &str) -> Option<SymbolRef<'a>> {
        if is_keyword(name) {
            return None;
        }
        let exact = modules_at(self.state, path);
        if let Some(found) = exact.iter().find_map(|s| s.module.find_child(name)) {
            return Some(found);
        }
        self.state
            .symbols()
            .all_modules()
            .filter(|m| m.path().ends_with(written))
            .find_map(|m| m.find_child(name))
    }

    /// Modules whose path is `path`, or ends with `written`.
    pub fn modules_matching(&self, path: &ModulePath, written: &ModulePath) -> Vec<&'a Module> {
        let exact: Vec<&Module> = modules_at(self.state, path).iter().map(|s| s.module).collect();
        if !exact.is_empty() {
            return exact;
        }
        self.state
            .symbols()
            .all_modules()
            .filter(|m| m.path().ends_with(written))
            .collect()
    }

    // ========================================================================
    // WORDS
    // ========================================================================

    /// Resolve the word under the cursor.
    pub fn resolve_word(&self, word: &Word) -> Option<SymbolRef<'a>> {
        if !word.is_identifier() || is_keyword(word.text()) {
            return None;
        }
        let path = word.full_access_path();
        let (first, rest) = path.split_first()?;

        let mut current = if word.has_module_path() {
            let resolved = word.resolved_module();
            let written = word.written_module();
            self.find_qualified(&resolved, &written, &first.text)
                .or_else(|| self.module_named(&resolved, &written, &first.text).filter(|_| rest.is_empty()))?
        } else {
            self.find_simple(&first.text)?
        };

        let mut ctx = AccessContext::new();
        for segment in rest {
            let (found, next) = self.step(current, &segment.text, ctx)?;
            current = found;
            ctx = next;
        }
        debug!(word = word.text(), found = %current.fqn(), "resolved word");
        Some(current)
    }

    /// `std::io` written as `std::io` with the cursor on `io`.
    fn module_named(&self, path: &ModulePath, written: &ModulePath, last: &str) -> Option<SymbolRef<'a>> {
        let with = |p: &ModulePath| ModulePath::new(p.tokens().iter().map(|t| t.as_str()).chain([last]));
        let full = with(path);
        let written = with(written);
        self.state
            .symbols()
            .all_modules()
            .find(|m| *m.path() == full)
            .or_else(|| self.state.symbols().all_modules().find(|m| m.path().ends_with(&written)))
            .map(SymbolRef::Module)
    }

    /// Resolve the symbol a parent expression stands for, ready for member
    /// lookup.
    pub fn resolve_parent(&self, parent: &Word) -> Option<(SymbolRef<'a>, AccessContext)> {
        let symbol = self.resolve_word(parent)?;
        let ctx = if parent.has_access_path() {
            AccessContext::new().after_finding_member(&symbol)
        } else {
            AccessContext::new()
        };
        Some((symbol, ctx))
    }

    /// One access path step: `name` on `current`.
    pub fn step(
        &self,
        current: SymbolRef<'a>,
        name: &str,
        ctx: AccessContext,
    ) -> Option<(SymbolRef<'a>, AccessContext)> {
        let (mut parent, mut ctx) = self.resolve_to_inspectable(current, ctx, true)?;

        if let SymbolRef::Distinct(distinct) = parent {
            if ctx.instance && ctx.methods_readable {
                if let Some(method) = self.find_method(distinct.name(), distinct.base().module(), name) {
                    return Some((method, ctx.after_finding_member(&method)));
                }
            }
            (parent, ctx) = self.resolve_to_inspectable(parent, ctx, false)?;
        }

        let found = self.find_member_or_method(parent, name, ctx)?;
        Some((found, ctx.after_finding_member(&found)))
    }

    // ========================================================================
    // TYPES
    // ========================================================================

    /// Reduce `symbol` to something with named members, one step at a
    /// time. With `stop_at_distinct`, a distinct reached on the way is
    /// returned as is.
    pub fn resolve_to_inspectable(
        &self,
        mut symbol: SymbolRef<'a>,
        mut ctx: AccessContext,
        stop_at_distinct: bool,
    ) -> Option<(SymbolRef<'a>, AccessContext)> {
        for _ in 0..MAX_RESOLUTION_DEPTH {
            if stop_at_distinct && matches!(symbol, SymbolRef::Distinct(_)) {
                return Some((symbol, ctx));
            }
            if is_inspectable(&symbol) {
                return Some((symbol, ctx));
            }
            let next = self.resolve_one_level(&symbol)?;
            ctx = ctx.after_resolving(&symbol, &next);
            symbol = next;
        }
        error!(symbol = %symbol.fqn(), "type resolution exceeded {MAX_RESOLUTION_DEPTH} steps");
        None
    }

    fn resolve_one_level(&self, symbol: &SymbolRef<'a>) -> Option<SymbolRef<'a>> {
        match *symbol {
            SymbolRef::Variable(v) => self.lookup_type(v.get_type()),
            SymbolRef::StructMember(m) => match m.substruct() {
                Some(substruct) => Some(SymbolRef::from_struct(substruct)),
                None => self.lookup_type(m.get_type()),
            },
            SymbolRef::Function(f) => self.lookup_type(f.return_type()),
            SymbolRef::Def(d) => match d.target() {
                DefTarget::Type(ty) => self.lookup_type(ty),
                DefTarget::Identifier(target) => self.lookup_identifier(target, d.base().module()),
            },
            SymbolRef::Distinct(d) => self.lookup_type(d.base_type()),
            _ => None,
        }
    }

    /// The declaration of a written type.
    pub fn lookup_type(&self, ty: &Type) -> Option<SymbolRef<'a>> {
        if ty.is_empty() || ty.is_builtin() || ty.is_generic_argument() {
            return None;
        }
        let indexed = self
            .state
            .search_by_fqn(&ty.fqn())
            .into_iter()
            .filter_map(|location| self.state.resolve_location(location))
            .find(SymbolRef::is_type);
        indexed.or_else(|| {
            self.modules
                .iter()
                .filter_map(|scope| scope.module.find_child(ty.name()))
                .find(SymbolRef::is_type)
        })
    }

    /// The declaration an alias such as `def print = io::printn` names.
    fn lookup_identifier(&self, target: &str, from_module: &ModulePath) -> Option<SymbolRef<'a>> {
        match target.rsplit_once("::") {
            Some((module, name)) => {
                let written = ModulePath::parse(module);
                self.find_qualified(&written, &written, name)
            }
            None => modules_at(self.state, from_module)
                .iter()
                .find_map(|scope| scope.module.find_child(target))
                .or_else(|| self.find_simple(target)),
        }
    }

    // ========================================================================
    // MEMBERS
    // ========================================================================

    /// Find `name` on an inspectable `parent`, honouring `ctx`.
    pub fn find_member_or_method(
        &self,
        parent: SymbolRef<'a>,
        name: &str,
        ctx: AccessContext,
    ) -> Option<SymbolRef<'a>> {
        if ctx.can_read_members() {
            if let Some(member) = direct_member(parent, name) {
                return Some(member);
            }
        }
        if !ctx.members_readable {
            let associated = match parent {
                SymbolRef::Enum(e) | SymbolRef::Enumerator(_, e) => e.associated_value(name),
                _ => None,
            };
            if let Some(value) = associated {
                return Some(SymbolRef::Variable(value));
            }
        }
        if ctx.methods_readable {
            let (host, module) = method_host(&parent)?;
            return self.find_method(host, module, name);
        }
        None
    }

    /// `Type.method`, looked up in the type's module first and then in the
    /// candidate modules.
    pub fn find_method(&self, type_name: &str, type_module: &ModulePath, method: &str) -> Option<SymbolRef<'a>> {
        let full = format!("{type_name}.{method}");
        let by_fqn = self
            .state
            .search_by_fqn(&format!("{type_module}::{full}"))
            .into_iter()
            .filter_map(|location| self.state.resolve_location(location))
            .find(|s| matches!(s, SymbolRef::Function(_)));
        if by_fqn.is_some() {
            return by_fqn;
        }
        modules_at(self.state, type_module)
            .iter()
            .chain(self.modules.iter())
            .find_map(|scope| scope.module.function(&full))
            .map(SymbolRef::Function)
    }
}

/// Variables, functions, members and aliases stand for some other
/// declaration; everything else has members of its own.
pub fn is_inspectable(symbol: &SymbolRef<'_>) -> bool {
    !matches!(
        symbol,
        SymbolRef::Variable(_)
            | SymbolRef::Function(_)
            | SymbolRef::StructMember(_)
            | SymbolRef::Def(_)
            | SymbolRef::Distinct(_)
    )
}

fn direct_member<'a>(parent: SymbolRef<'a>, name: &str) -> Option<SymbolRef<'a>> {
    match parent {
        SymbolRef::Enum(e) => e
            .enumerator(name)
            .map(|en| SymbolRef::Enumerator(en, e))
            .or_else(|| e.associated_value(name).map(SymbolRef::Variable)),
        SymbolRef::Enumerator(_, e) => e.associated_value(name).map(SymbolRef::Variable),
        SymbolRef::Fault(f) => f.constant(name).map(SymbolRef::FaultConstant),
        SymbolRef::Struct(s) | SymbolRef::Union(s) => s.member(name).map(SymbolRef::StructMember),
        SymbolRef::Bitstruct(b) => b.member(name).map(SymbolRef::StructMember),
        SymbolRef::Interface(i) => i.method(name).map(SymbolRef::Function),
        _ => None,
    }
}

/// The type name methods of `parent` are declared on, with its module.
pub fn method_host<'a>(parent: &SymbolRef<'a>) -> Option<(&'a str, &'a ModulePath)> {
    match *parent {
        SymbolRef::Struct(_)
        | SymbolRef::Union(_)
        | SymbolRef::Bitstruct(_)
        | SymbolRef::Enum(_)
        | SymbolRef::Fault(_)
        | SymbolRef::Interface(_)
        | SymbolRef::Distinct(_) => Some((parent.name(), parent.module())),
        SymbolRef::Enumerator(_, e) => Some((e.name(), e.base().module())),
        SymbolRef::FaultConstant(c) => Some((c.fault_name()?, c.base().module())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{DocId, Position};

    fn resolver_test(source: &str, find: &str) -> Option<String> {
        let mut state = ProjectState::new();
        let doc = DocId::from("file:///main.c3");
        state.open_document(doc.clone(), source.to_string(), 1);
        let ctx = SearchContext::at(&state, &doc, Position::new(0, 0));
        let resolver = Resolver::new(&state, &ctx);
        resolver.find_simple(find).map(|s| s.fqn())
    }

    #[test]
    fn test_keywords_are_never_found() {
        assert_eq!(resolver_test("module app;\nint int;", "int"), None);
        assert_eq!(resolver_test("module app;\nfn void while() {}", "while"), None);
    }

    #[test]
    fn test_module_name_fallback() {
        assert_eq!(resolver_test("module app;\nint x;", "app"), Some("app".to_string()));
    }

    #[test]
    fn test_cyclic_distincts_stop() {
        let mut state = ProjectState::new();
        let doc = DocId::from("file:///main.c3");
        state.open_document(doc.clone(), "module app;\ndistinct Aa = Bb;\ndistinct Bb = Aa;\nAa value;".into(), 1);
        let ctx = SearchContext::at(&state, &doc, Position::new(0, 0));
        let resolver = Resolver::new(&state, &ctx);

        let value = resolver.find_simple("value").unwrap();
        assert!(resolver.resolve_to_inspectable(value, AccessContext::new(), false).is_none());
    }

    #[test]
    fn test_def_identifier_resolves_through_module() {
        let mut state = ProjectState::new();
        state.index_document(DocId::from("file:///io.c3"), "module std::io;\nstruct File { int fd; }".into());
        let doc = DocId::from("file:///main.c3");
        state.open_document(doc.clone(), "module app;\nimport std::io;\nalias Handle = io::File;".into(), 1);
        let ctx = SearchContext::at(&state, &doc, Position::new(2, 0));
        let resolver = Resolver::new(&state, &ctx);

        let handle = resolver.find_simple("Handle").unwrap();
        let (inspectable, _) = resolver
            .resolve_to_inspectable(handle, AccessContext::new(), false)
            .unwrap();
        assert_eq!(inspectable.fqn(), "std::io::File");
    }
}
