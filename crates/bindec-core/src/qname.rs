//! # Qualified Names
//!
//! A [`QName`] names a schema node, an identity, or a normalized tree node. It
//! is a namespace, an optional revision scoping that namespace, and a local
//! name. Two names are equal only when all three parts are equal.
//!
//! The text form is `(namespace?revision=R)local`, or `(namespace)local` when
//! no revision is present. Serialization uses the text form so that documents
//! stay readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A namespace-qualified, revision-scoped name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QName {
    namespace: String,
    revision: Option<String>,
    local_name: String,
}

impl QName {
    /// Create a name without a revision.
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            revision: None,
            local_name: local_name.into(),
        }
    }

    /// Create a name scoped to a module revision.
    pub fn with_revision(
        namespace: impl Into<String>,
        revision: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            revision: Some(revision.into()),
            local_name: local_name.into(),
        }
    }

    /// A name in the same namespace and revision with a different local name.
    pub fn sibling(&self, local_name: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            revision: self.revision.clone(),
            local_name: local_name.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Whether both names belong to the same namespace and revision.
    pub fn same_module(&self, other: &QName) -> bool {
        self.namespace == other.namespace && self.revision == other.revision
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "({}?revision={}){}", self.namespace, rev, self.local_name),
            None => write!(f, "({}){}", self.namespace, self.local_name),
        }
    }
}

impl FromStr for QName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidQName(s.to_string());
        let rest = s.strip_prefix('(').ok_or_else(invalid)?;
        let (module, local) = rest.split_once(')').ok_or_else(invalid)?;
        if local.is_empty() || local.contains(['(', ')', '/', '[', ']']) {
            return Err(invalid());
        }
        let (namespace, revision) = match module.split_once("?revision=") {
            Some((ns, rev)) if !rev.is_empty() => (ns, Some(rev.to_string())),
            Some(_) => return Err(invalid()),
            None => (module, None),
        };
        if namespace.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            namespace: namespace.to_string(),
            revision,
            local_name: local.to_string(),
        })
    }
}

impl TryFrom<String> for QName {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QName> for String {
    fn from(value: QName) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_revision() {
        let plain = QName::new("urn:example:library", "book");
        assert_eq!(plain.to_string(), "(urn:example:library)book");

        let revised = QName::with_revision("urn:example:library", "2024-01-01", "book");
        assert_eq!(revised.to_string(), "(urn:example:library?revision=2024-01-01)book");
    }

    #[test]
    fn parse_accepts_both_forms() {
        let q: QName = "(urn:a?revision=2020-02-02)x".parse().unwrap();
        assert_eq!(q.namespace(), "urn:a");
        assert_eq!(q.revision(), Some("2020-02-02"));
        assert_eq!(q.local_name(), "x");

        let q: QName = "(urn:a)y".parse().unwrap();
        assert_eq!(q.revision(), None);
        assert_eq!(q.local_name(), "y");
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for bad in ["30", "urn:a)x", "(urn:a", "(urn:a)", "()x", "(urn:a?revision=)x", "(a)b/c"] {
            assert!(bad.parse::<QName>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn revision_distinguishes_names() {
        let a = QName::new("urn:a", "x");
        let b = QName::with_revision("urn:a", "2020-01-01", "x");
        assert_ne!(a, b);
        assert!(!a.same_module(&b));
        assert!(b.same_module(&b.sibling("y")));
    }

    #[test]
    fn serde_uses_text_form() {
        let q = QName::new("urn:a", "x");
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "\"(urn:a)x\"");
        let back: QName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
