//! Document identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// The identity of a registered document.
///
/// Usually the document's `file://` URI as sent by the client, but synthetic
/// documents such as the stdlib use a plain name (`_stdlib_0.7.1`) that is
/// not a valid URI, so this is deliberately just a string.
///
/// Cloning is cheap: short ids are stored inline and long ones are shared.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(SmolStr);

impl DocId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    /// Get the raw identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path segment, without any query or fragment.
    ///
    /// Used to derive module names for files without a `module` declaration.
    pub fn file_name(&self) -> &str {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        path.rsplit(['/', '\\']).next().unwrap_or(path)
    }

    /// Whether this document lives under `prefix` (a directory URI).
    pub fn is_under(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches('/');
        self.0 == prefix
            || self
                .0
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Debug for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocId({})", self.0)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    #[inline]
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocId {
    #[inline]
    fn from(id: String) -> Self {
        Self(SmolStr::from(id))
    }
}

impl AsRef<str> for DocId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_equality() {
        let a = DocId::from("file:///a.c3");
        let b = DocId::from("file:///a.c3".to_string());
        let c = DocId::from("file:///b.c3");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_doc_id_file_name() {
        assert_eq!(DocId::from("file:///src/app/main.c3").file_name(), "main.c3");
        assert_eq!(DocId::from("scratch.c3").file_name(), "scratch.c3");
        assert_eq!(DocId::from("_stdlib_0.7.1").file_name(), "_stdlib_0.7.1");
    }

    #[test]
    fn test_doc_id_is_under() {
        let doc = DocId::from("file:///ws/src/app.c3");
        assert!(doc.is_under("file:///ws/src"));
        assert!(doc.is_under("file:///ws/src/"));
        assert!(!doc.is_under("file:///ws/sr"));
    }
}
