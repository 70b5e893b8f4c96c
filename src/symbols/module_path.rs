//! Module paths such as `std::io::file`.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A `::`-separated module path.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ModulePath {
    tokens: Vec<SmolStr>,
}

impl ModulePath {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `a::b::c`. The empty string yields the empty path.
    pub fn parse(module: &str) -> Self {
        if module.is_empty() {
            return Self::default();
        }
        Self::new(module.split("::").map(str::trim))
    }

    pub fn tokens(&self) -> &[SmolStr] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The last segment, e.g. `io` for `std::io`.
    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(SmolStr::as_str)
    }

    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Whether `self` equals `parent` or is nested below it.
    pub fn is_submodule_of(&self, parent: &ModulePath) -> bool {
        self.tokens.len() >= parent.tokens.len()
            && self.tokens.iter().zip(&parent.tokens).all(|(a, b)| a == b)
    }

    /// Same module, a submodule or a parent: modules visible without `import`.
    pub fn is_implicitly_imported(&self, other: &ModulePath) -> bool {
        self.is_submodule_of(other) || other.is_submodule_of(self)
    }

    /// Whether the trailing segments of `self` equal `suffix`.
    ///
    /// `std::io::file` ends with `io::file` and with `file`.
    pub fn ends_with(&self, suffix: &ModulePath) -> bool {
        !suffix.is_empty()
            && self.tokens.len() >= suffix.tokens.len()
            && self.tokens[self.tokens.len() - suffix.tokens.len()..] == suffix.tokens[..]
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str("::")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModulePath({self})")
    }
}

impl From<&str> for ModulePath {
    fn from(module: &str) -> Self {
        Self::parse(module)
    }
}

impl From<String> for ModulePath {
    fn from(module: String) -> Self {
        Self::parse(&module)
    }
}

impl From<ModulePath> for String {
    fn from(path: ModulePath) -> Self {
        path.to_string()
    }
}

const MAX_MODULE_NAME_LEN: usize = 31;

/// Derive a module name from a file name for files without a `module`
/// declaration: lowercase letters and digits are kept, anything else
/// becomes `_`, the `.c3` extension is dropped and the result is capped at
/// 31 characters.
pub fn normalize_module_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".c3").unwrap_or(file_name);
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .take(MAX_MODULE_NAME_LEN)
        .collect()
}
