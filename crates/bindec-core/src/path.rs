//! # Normalized Paths
//!
//! A [`NormalizedPath`] addresses a node inside a normalized tree as a sequence
//! of [`PathArgument`]s from the root. A keyed list is addressed in two steps:
//! the list itself (`Node`) and then one of its entries (`Entry`) with the key
//! predicates that identify it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::qname::QName;
use crate::value::NormalizedValue;

/// One component of a list entry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyPredicate {
    pub name: QName,
    pub value: NormalizedValue,
}

/// The key of a list entry, components in schema key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPredicates(Vec<KeyPredicate>);

impl KeyPredicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component. Components keep the order they were added in.
    pub fn with(mut self, name: QName, value: impl Into<NormalizedValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: QName, value: impl Into<NormalizedValue>) {
        self.0.push(KeyPredicate {
            name,
            value: value.into(),
        });
    }

    pub fn get(&self, name: &QName) -> Option<&NormalizedValue> {
        self.0.iter().find(|p| &p.name == name).map(|p| &p.value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyPredicate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<KeyPredicate> for KeyPredicates {
    fn from_iter<T: IntoIterator<Item = KeyPredicate>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for KeyPredicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.0 {
            write!(f, "[{}='{}']", p.name, p.value)?;
        }
        Ok(())
    }
}

/// One step of a normalized path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum PathArgument {
    /// A container, choice, leaf, leaf-set, or list as a whole.
    Node { name: QName },
    /// A single keyed list entry.
    Entry { name: QName, key: KeyPredicates },
    /// A single leaf-set entry, identified by its value.
    Value { name: QName, value: NormalizedValue },
}

impl PathArgument {
    pub fn node(name: QName) -> Self {
        Self::Node { name }
    }

    pub fn entry(name: QName, key: KeyPredicates) -> Self {
        Self::Entry { name, key }
    }

    /// The qualified name of the addressed node, regardless of step kind.
    pub fn name(&self) -> &QName {
        match self {
            Self::Node { name } | Self::Entry { name, .. } | Self::Value { name, .. } => name,
        }
    }
}

impl fmt::Display for PathArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node { name } => write!(f, "{name}"),
            Self::Entry { name, key } => write!(f, "{name}{key}"),
            Self::Value { name, value } => write!(f, "{name}[.='{value}']"),
        }
    }
}

/// A path from the root of a normalized tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedPath(Vec<PathArgument>);

impl NormalizedPath {
    /// The empty path, addressing the tree root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_args(args: Vec<PathArgument>) -> Self {
        Self(args)
    }

    /// A new path extended by one step.
    pub fn child(&self, arg: PathArgument) -> Self {
        let mut args = self.0.clone();
        args.push(arg);
        Self(args)
    }

    pub fn push(&mut self, arg: PathArgument) {
        self.0.push(arg);
    }

    /// The path without its last step; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    pub fn last(&self) -> Option<&PathArgument> {
        self.0.last()
    }

    pub fn args(&self) -> &[PathArgument] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PathArgument> for NormalizedPath {
    fn from_iter<T: IntoIterator<Item = PathArgument>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for arg in &self.0 {
            write!(f, "/{arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(local: &str) -> QName {
        QName::new("urn:t", local)
    }

    #[test]
    fn display_renders_predicates() {
        let path: NormalizedPath = [
            PathArgument::node(q("lib")),
            PathArgument::node(q("book")),
            PathArgument::entry(q("book"), KeyPredicates::new().with(q("isbn"), "42")),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            path.to_string(),
            "/(urn:t)lib/(urn:t)book/(urn:t)book[(urn:t)isbn='42']"
        );
        assert_eq!(NormalizedPath::root().to_string(), "/");
    }

    #[test]
    fn parent_and_child_are_inverse() {
        let base = NormalizedPath::root().child(PathArgument::node(q("a")));
        let deeper = base.child(PathArgument::node(q("b")));
        assert_eq!(deeper.parent(), Some(base));
        assert_eq!(NormalizedPath::root().parent(), None);
    }

    #[test]
    fn predicates_keep_declaration_order() {
        let key = KeyPredicates::new().with(q("z"), 1u64).with(q("a"), 2u64);
        let names: Vec<_> = key.iter().map(|p| p.name.local_name().to_string()).collect();
        assert_eq!(names, ["z", "a"]);
        assert_eq!(key.get(&q("a")), Some(&NormalizedValue::Uint64(2)));
    }
}
