//! Modules and the per-document collection of them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{
    Bitstruct, Def, Distinct, Enum, Fault, FaultConstant, Function, Interface, ModulePath, Struct,
    SymbolBase, SymbolRef, Type, Variable,
};
use crate::base::{DocId, Position, Range};

/// One module as declared in one document.
///
/// The same module name may be declared by many documents; each document
/// owns its own `Module` value and the symbols table keeps them apart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(flatten)]
    base: SymbolBase,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    imports: Vec<ModulePath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    generic_parameters: Vec<SmolStr>,
    #[serde(default)]
    private: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<SmolStr>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    variables: IndexMap<SmolStr, Variable>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    enums: IndexMap<SmolStr, Enum>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    faults: IndexMap<SmolStr, Fault>,
    /// Constants of `faultdef` declarations, which have no owning fault.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    fault_constants: IndexMap<SmolStr, FaultConstant>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    structs: IndexMap<SmolStr, Struct>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    bitstructs: IndexMap<SmolStr, Bitstruct>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    defs: IndexMap<SmolStr, Def>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    distincts: IndexMap<SmolStr, Distinct>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    interfaces: IndexMap<SmolStr, Interface>,
    /// Functions and methods. A list, as methods of different types share
    /// their short name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    functions: Vec<Function>,
}

impl Module {
    pub fn new(path: ModulePath, doc_id: DocId, id_range: Range, doc_range: Range) -> Self {
        Self {
            base: SymbolBase::new(path.to_string(), path, doc_id, id_range, doc_range),
            imports: Vec::new(),
            generic_parameters: Vec::new(),
            private: false,
            attributes: Vec::new(),
            variables: IndexMap::new(),
            enums: IndexMap::new(),
            faults: IndexMap::new(),
            fault_constants: IndexMap::new(),
            structs: IndexMap::new(),
            bitstructs: IndexMap::new(),
            defs: IndexMap::new(),
            distincts: IndexMap::new(),
            interfaces: IndexMap::new(),
            functions: Vec::new(),
        }
    }

    #[inline]
    pub fn base(&self) -> &SymbolBase {
        &self.base
    }

    /// The full module name, e.g. `std::io`.
    #[inline]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    #[inline]
    pub fn path(&self) -> &ModulePath {
        self.base.module()
    }

    #[inline]
    pub fn doc_id(&self) -> &DocId {
        self.base.doc_id()
    }

    pub fn imports(&self) -> &[ModulePath] {
        &self.imports
    }

    pub fn generic_parameters(&self) -> &[SmolStr] {
        &self.generic_parameters
    }

    pub fn is_generic_parameter(&self, name: &str) -> bool {
        self.generic_parameters.iter().any(|p| p == name)
    }

    #[inline]
    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn attributes(&self) -> &[SmolStr] {
        &self.attributes
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &Enum> {
        self.enums.values()
    }

    pub fn faults(&self) -> impl Iterator<Item = &Fault> {
        self.faults.values()
    }

    pub fn fault_constants(&self) -> impl Iterator<Item = &FaultConstant> {
        self.fault_constants.values()
    }

    pub fn structs(&self) -> impl Iterator<Item = &Struct> {
        self.structs.values()
    }

    pub fn bitstructs(&self) -> impl Iterator<Item = &Bitstruct> {
        self.bitstructs.values()
    }

    pub fn defs(&self) -> impl Iterator<Item = &Def> {
        self.defs.values()
    }

    pub fn distincts(&self) -> impl Iterator<Item = &Distinct> {
        self.distincts.values()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values()
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enum> {
        self.enums.get(name)
    }

    pub fn fault(&self, name: &str) -> Option<&Fault> {
        self.faults.get(name)
    }

    pub fn fault_constant(&self, name: &str) -> Option<&FaultConstant> {
        self.fault_constants.get(name)
    }

    pub fn structure(&self, name: &str) -> Option<&Struct> {
        self.structs.get(name)
    }

    pub fn bitstruct(&self, name: &str) -> Option<&Bitstruct> {
        self.bitstructs.get(name)
    }

    pub fn def(&self, name: &str) -> Option<&Def> {
        self.defs.get(name)
    }

    pub fn distinct(&self, name: &str) -> Option<&Distinct> {
        self.distincts.get(name)
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(name)
    }

    /// First function whose full name (`name` or `Type.name`) matches.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }

    /// The function whose declaration contains `position`.
    pub fn function_at(&self, position: Position) -> Option<&Function> {
        self.functions
            .iter()
            .find(|f| f.base().doc_range().has_position(position))
    }

    /// Direct name lookup over every child declaration of the module root.
    pub fn find_child(&self, name: &str) -> Option<SymbolRef<'_>> {
        if let Some(v) = self.variables.get(name) {
            return Some(SymbolRef::Variable(v));
        }
        if let Some(e) = self.enums.get(name) {
            return Some(SymbolRef::Enum(e));
        }
        if let Some(f) = self.faults.get(name) {
            return Some(SymbolRef::Fault(f));
        }
        if let Some(s) = self.structs.get(name) {
            return Some(SymbolRef::from_struct(s));
        }
        if let Some(b) = self.bitstructs.get(name) {
            return Some(SymbolRef::Bitstruct(b));
        }
        if let Some(d) = self.defs.get(name) {
            return Some(SymbolRef::Def(d));
        }
        if let Some(d) = self.distincts.get(name) {
            return Some(SymbolRef::Distinct(d));
        }
        if let Some(i) = self.interfaces.get(name) {
            return Some(SymbolRef::Interface(i));
        }
        if let Some(c) = self.fault_constants.get(name) {
            return Some(SymbolRef::FaultConstant(c));
        }
        self.function(name).map(SymbolRef::Function)
    }

    /// Whether the module root declares a type or value named `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.find_child(name).is_some()
    }

    /// Every root-level declaration, in kind order then declaration order.
    pub fn children(&self) -> impl Iterator<Item = SymbolRef<'_>> {
        self.variables
            .values()
            .map(SymbolRef::Variable)
            .chain(self.enums.values().map(SymbolRef::Enum))
            .chain(self.faults.values().map(SymbolRef::Fault))
            .chain(self.fault_constants.values().map(SymbolRef::FaultConstant))
            .chain(self.structs.values().map(SymbolRef::from_struct))
            .chain(self.bitstructs.values().map(SymbolRef::Bitstruct))
            .chain(self.defs.values().map(SymbolRef::Def))
            .chain(self.distincts.values().map(SymbolRef::Distinct))
            .chain(self.interfaces.values().map(SymbolRef::Interface))
            .chain(self.functions.iter().map(SymbolRef::Function))
    }

    pub fn is_empty(&self) -> bool {
        self.children().next().is_none()
    }

    // ========================================================================
    // MUTATION (parser and symbols table only)
    // ========================================================================

    pub(crate) fn set_private(&mut self, private: bool) {
        self.private = private;
    }

    pub(crate) fn add_attribute(&mut self, attribute: impl Into<SmolStr>) {
        self.attributes.push(attribute.into());
    }

    pub(crate) fn set_generic_parameters(&mut self, parameters: Vec<SmolStr>) {
        self.generic_parameters = parameters;
    }

    pub(crate) fn set_doc_range(&mut self, range: Range) {
        self.base.doc_range = range;
    }

    pub(crate) fn set_doc_comment(&mut self, doc: Option<super::DocComment>) {
        if doc.is_some() {
            self.base.doc_comment = doc;
        }
    }

    pub(crate) fn add_import(&mut self, import: ModulePath) {
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }

    pub(crate) fn add_variable(&mut self, variable: Variable) {
        self.variables.insert(SmolStr::new(variable.name()), variable);
    }

    pub(crate) fn add_enum(&mut self, enumeration: Enum) {
        self.enums.insert(SmolStr::new(enumeration.name()), enumeration);
    }

    pub(crate) fn add_fault(&mut self, fault: Fault) {
        self.faults.insert(SmolStr::new(fault.name()), fault);
    }

    pub(crate) fn add_fault_constant(&mut self, constant: FaultConstant) {
        self.fault_constants.insert(SmolStr::new(constant.name()), constant);
    }

    pub(crate) fn add_struct(&mut self, strukt: Struct) {
        self.structs.insert(SmolStr::new(strukt.name()), strukt);
    }

    pub(crate) fn add_bitstruct(&mut self, bitstruct: Bitstruct) {
        self.bitstructs.insert(SmolStr::new(bitstruct.name()), bitstruct);
    }

    pub(crate) fn add_def(&mut self, def: Def) {
        self.defs.insert(SmolStr::new(def.name()), def);
    }

    pub(crate) fn add_distinct(&mut self, distinct: Distinct) {
        self.distincts.insert(SmolStr::new(distinct.name()), distinct);
    }

    pub(crate) fn add_interface(&mut self, interface: Interface) {
        self.interfaces.insert(SmolStr::new(interface.name()), interface);
    }

    pub(crate) fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub(crate) fn struct_mut(&mut self, name: &str) -> Option<&mut Struct> {
        self.structs.get_mut(name)
    }

    /// Merge another declaration of the same module from the same document.
    pub(crate) fn merge(&mut self, other: Module) {
        for import in other.imports {
            self.add_import(import);
        }
        self.variables.extend(other.variables);
        self.enums.extend(other.enums);
        self.faults.extend(other.faults);
        self.fault_constants.extend(other.fault_constants);
        self.structs.extend(other.structs);
        self.bitstructs.extend(other.bitstructs);
        self.defs.extend(other.defs);
        self.distincts.extend(other.distincts);
        self.interfaces.extend(other.interfaces);
        self.functions.extend(other.functions);
    }

    /// Point this module and everything it owns at another document.
    pub(crate) fn rebase_doc_id(&mut self, doc_id: &DocId) {
        self.base.doc_id = doc_id.clone();
        for v in self.variables.values_mut() {
            v.rebase_doc_id(doc_id);
        }
        for e in self.enums.values_mut() {
            e.rebase_doc_id(doc_id);
        }
        for fault in self.faults.values_mut() {
            fault.rebase_doc_id(doc_id);
        }
        for c in self.fault_constants.values_mut() {
            c.rebase_doc_id(doc_id);
        }
        for s in self.structs.values_mut() {
            s.rebase_doc_id(doc_id);
        }
        for b in self.bitstructs.values_mut() {
            b.rebase_doc_id(doc_id);
        }
        for d in self.defs.values_mut() {
            d.rebase_doc_id(doc_id);
        }
        for d in self.distincts.values_mut() {
            d.rebase_doc_id(doc_id);
        }
        for i in self.interfaces.values_mut() {
            i.rebase_doc_id(doc_id);
        }
        for function in &mut self.functions {
            function.rebase_doc_id(doc_id);
        }
    }

    /// Visit every type written anywhere in this module.
    pub(crate) fn for_each_type_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        for v in self.variables.values_mut() {
            v.for_each_type_mut(f);
        }
        for e in self.enums.values_mut() {
            e.for_each_type_mut(f);
        }
        for s in self.structs.values_mut() {
            s.for_each_type_mut(f);
        }
        for b in self.bitstructs.values_mut() {
            b.for_each_type_mut(f);
        }
        for d in self.defs.values_mut() {
            d.for_each_type_mut(f);
        }
        for d in self.distincts.values_mut() {
            d.for_each_type_mut(f);
        }
        for i in self.interfaces.values_mut() {
            i.for_each_type_mut(f);
        }
        for function in &mut self.functions {
            function.for_each_type_mut(f);
        }
    }
}

/// The modules declared in one document, in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitModules {
    doc_id: DocId,
    modules: IndexMap<SmolStr, Module>,
}

impl UnitModules {
    pub fn new(doc_id: DocId) -> Self {
        Self {
            doc_id,
            modules: IndexMap::new(),
        }
    }

    #[inline]
    pub fn doc_id(&self) -> &DocId {
        &self.doc_id
    }

    pub fn get(&self, module: &str) -> Option<&Module> {
        self.modules.get(module)
    }

    pub(crate) fn get_mut(&mut self, module: &str) -> Option<&mut Module> {
        self.modules.get_mut(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub(crate) fn modules_mut(&mut self) -> impl Iterator<Item = &mut Module> {
        self.modules.values_mut()
    }

    pub fn into_modules(self) -> impl Iterator<Item = Module> {
        self.modules.into_values()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Add a module, merging into an existing one of the same name.
    pub(crate) fn register_module(&mut self, module: Module) {
        match self.modules.get_mut(module.name()) {
            Some(existing) => existing.merge(module),
            None => {
                self.modules.insert(SmolStr::new(module.name()), module);
            }
        }
    }

    pub(crate) fn set_doc_id(&mut self, doc_id: DocId) {
        self.doc_id = doc_id;
    }

    /// Modules visible from `path` without an import.
    pub fn implicitly_loadable(&self, path: &ModulePath) -> impl Iterator<Item = &Module> {
        self.modules
            .values()
            .filter(move |m| m.path().is_implicitly_imported(path))
    }

    /// The module whose region contains `position`, or failing that the
    /// closest module declared before it.
    pub fn module_at(&self, position: Position) -> Option<&Module> {
        let mut prior: Option<&Module> = None;
        for module in self.modules.values() {
            let range = module.base().doc_range();
            if range.has_position(position) {
                return Some(module);
            }
            if range.is_after_position(position)
                && prior.is_none_or(|p| range.ends_after(&p.base().doc_range()))
            {
                prior = Some(module);
            }
        }
        prior.or_else(|| self.modules.values().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{StructBuilder, VariableBuilder};

    fn module(name: &str, doc_range: Range) -> Module {
        Module::new(ModulePath::parse(name), DocId::from("a.c3"), doc_range, doc_range)
    }

    #[test]
    fn test_find_child_across_kinds() {
        let mut m = module("app", Range::new(0, 0, 10, 0));
        m.add_variable(
            VariableBuilder::new("counter", Type::builtin("int"), ModulePath::parse("app"), DocId::from("a.c3")).build(),
        );
        m.add_struct(StructBuilder::new("Point", ModulePath::parse("app"), DocId::from("a.c3")).build());

        assert!(matches!(m.find_child("counter"), Some(SymbolRef::Variable(_))));
        assert!(matches!(m.find_child("Point"), Some(SymbolRef::Struct(_))));
        assert!(m.find_child("missing").is_none());
        assert_eq!(m.children().count(), 2);
    }

    #[test]
    fn test_module_at_prefers_containing_region() {
        let mut unit = UnitModules::new(DocId::from("a.c3"));
        unit.register_module(module("first", Range::new(0, 0, 4, 0)));
        unit.register_module(module("second", Range::new(5, 0, 9, 0)));

        assert_eq!(unit.module_at(Position::new(2, 3)).map(Module::name), Some("first"));
        assert_eq!(unit.module_at(Position::new(7, 0)).map(Module::name), Some("second"));
        assert_eq!(unit.module_at(Position::new(20, 0)).map(Module::name), Some("second"));
    }

    #[test]
    fn test_register_module_merges_same_name() {
        let mut unit = UnitModules::new(DocId::from("a.c3"));
        let mut a = module("app", Range::default());
        a.add_import(ModulePath::parse("std::io"));
        let mut b = module("app", Range::default());
        b.add_import(ModulePath::parse("std::io"));
        b.add_import(ModulePath::parse("std::math"));
        unit.register_module(a);
        unit.register_module(b);

        assert_eq!(unit.len(), 1);
        assert_eq!(unit.get("app").map(|m| m.imports().len()), Some(2));
    }
}
