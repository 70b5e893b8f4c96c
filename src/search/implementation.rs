//! Find the types and methods implementing an interface.

use super::resolver::Resolver;
use crate::symbols::{Interface, SymbolRef};

/// Implementations of `target`.
///
/// An interface yields the types listing it; an interface method yields
/// the `Type.method` functions of those types.
pub fn implementations<'a>(resolver: &Resolver<'a, '_>, target: ImplementationTarget<'a>) -> Vec<SymbolRef<'a>> {
    let (interface, method) = match target {
        ImplementationTarget::Interface(interface) => (interface, None),
        ImplementationTarget::Method { interface, method } => (interface, Some(method)),
    };

    let mut found = Vec::new();
    for module in resolver.state().symbols().all_modules() {
        let implementors = module
            .structs()
            .filter(|s| lists_interface(s.implements(), interface))
            .map(SymbolRef::from_struct)
            .chain(
                module
                    .bitstructs()
                    .filter(|b| lists_interface(b.implements(), interface))
                    .map(SymbolRef::Bitstruct),
            )
            .chain(
                module
                    .enums()
                    .filter(|e| lists_interface(e.implements(), interface))
                    .map(SymbolRef::Enum),
            );

        for implementor in implementors {
            match method {
                None => found.push(implementor),
                Some(method) => {
                    if let Some(f) = resolver.find_method(implementor.name(), implementor.module(), method) {
                        if !found.iter().any(|s: &SymbolRef<'_>| s.same_as(&f)) {
                            found.push(f);
                        }
                    }
                }
            }
        }
    }
    found
}

/// What implementation search starts from.
#[derive(Clone, Copy, Debug)]
pub enum ImplementationTarget<'a> {
    Interface(&'a Interface),
    Method { interface: &'a Interface, method: &'a str },
}

/// Whether an implements-list entry names `interface`, written as its
/// simple name, its FQN or any `::`-qualified suffix of it.
fn lists_interface(implements: &[smol_str::SmolStr], interface: &Interface) -> bool {
    let fqn = interface.base().fqn();
    implements.iter().any(|entry| {
        entry.as_str() == interface.name()
            || entry.as_str() == fqn
            || fqn.ends_with(&format!("::{entry}"))
    })
}
