//! Declared types.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A type as written in a declaration.
///
/// Only what the declaration states is recorded; no inference happens.
/// `module` starts out as the module the type was written in and is
/// rebound to the declaring module once pending resolution finds it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    name: SmolStr,
    #[serde(default)]
    builtin: bool,
    #[serde(default)]
    pointer_count: u8,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    generic_argument: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    generic_arguments: Vec<Type>,
    #[serde(default)]
    collection: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collection_size: Option<u32>,
    #[serde(default)]
    module: SmolStr,
}

impl Type {
    /// A user type declared (or assumed declared) in `module`.
    pub fn new(name: impl Into<SmolStr>, module: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            ..Self::default()
        }
    }

    /// A language built-in such as `int` or `void`.
    pub fn builtin(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            builtin: true,
            ..Self::default()
        }
    }

    /// The absent type, used for functions declared without a return type.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn module(&self) -> &str {
        &self.module
    }

    pub(crate) fn set_module(&mut self, module: impl Into<SmolStr>) {
        self.module = module.into();
    }

    #[inline]
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    #[inline]
    pub fn pointer_count(&self) -> u8 {
        self.pointer_count
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether this type names one of the module's generic parameters.
    #[inline]
    pub fn is_generic_argument(&self) -> bool {
        self.generic_argument
    }

    pub fn generic_arguments(&self) -> &[Type] {
        &self.generic_arguments
    }

    #[inline]
    pub fn is_collection(&self) -> bool {
        self.collection
    }

    #[inline]
    pub fn collection_size(&self) -> Option<u32> {
        self.collection_size
    }

    /// `module::Name`, or the bare name for built-ins.
    pub fn fqn(&self) -> String {
        if self.builtin || self.module.is_empty() {
            self.name.to_string()
        } else {
            format!("{}::{}", self.module, self.name)
        }
    }

    pub(crate) fn with_pointers(mut self, count: u8) -> Self {
        self.pointer_count = count;
        self
    }

    pub(crate) fn with_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub(crate) fn with_collection(mut self, size: Option<u32>) -> Self {
        self.collection = true;
        self.collection_size = size;
        self
    }

    pub(crate) fn with_generic_arguments(mut self, arguments: Vec<Type>) -> Self {
        self.generic_arguments = arguments;
        self
    }

    pub(crate) fn as_generic_argument(mut self) -> Self {
        self.generic_argument = true;
        self
    }

    /// Visit this type and its generic arguments.
    pub(crate) fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Type)) {
        f(self);
        for argument in &mut self.generic_arguments {
            argument.for_each_mut(f);
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.generic_arguments.is_empty() {
            f.write_str("{")?;
            for (i, argument) in self.generic_arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{argument}")?;
            }
            f.write_str("}")?;
        }
        for _ in 0..self.pointer_count {
            f.write_str("*")?;
        }
        if self.collection {
            match self.collection_size {
                Some(size) => write!(f, "[{size}]")?,
                None => f.write_str("[]")?,
            }
        }
        if self.optional {
            f.write_str("?")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_suffixes() {
        let ty = Type::new("Point", "app")
            .with_pointers(2)
            .with_collection(Some(4))
            .with_optional();
        assert_eq!(ty.to_string(), "Point**[4]?");
    }

    #[test]
    fn test_display_generic_arguments() {
        let ty = Type::new("List", "std::collections::list")
            .with_generic_arguments(vec![Type::builtin("int")]);
        assert_eq!(ty.to_string(), "List{int}");
    }

    #[test]
    fn test_fqn() {
        assert_eq!(Type::new("Point", "app").fqn(), "app::Point");
        assert_eq!(Type::builtin("int").fqn(), "int");
    }
}
