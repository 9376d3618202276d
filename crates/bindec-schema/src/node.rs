//! # Schema Nodes
//!
//! A schema node is a qualified position in the loaded schema. It is
//! identified by its [`SchemaPath`], the chain of qualified names from the
//! schema root. Choice and case names are part of the path even though they
//! never appear as steps in a normalized path below a choice node.

use std::fmt;

use bindec_core::{ListOrdering, QName};
use serde::{Deserialize, Serialize};

/// Structural path of a schema node from the schema root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaPath(Vec<QName>);

impl SchemaPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_names(names: Vec<QName>) -> Self {
        Self(names)
    }

    pub fn child(&self, name: QName) -> Self {
        let mut names = self.0.clone();
        names.push(name);
        Self(names)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    pub fn last(&self) -> Option<&QName> {
        self.0.last()
    }

    pub fn names(&self) -> &[QName] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for name in &self.0 {
            write!(f, "/{name}")?;
        }
        Ok(())
    }
}

/// A node of the loaded schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub qname: QName,
    pub path: SchemaPath,
    pub kind: SchemaNodeKind,
}

impl SchemaNode {
    /// A node named `qname` directly below `parent`.
    pub fn new(parent: &SchemaPath, qname: QName, kind: SchemaNodeKind) -> Self {
        Self {
            path: parent.child(qname.clone()),
            qname,
            kind,
        }
    }
}

/// Classification of a schema node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaNodeKind {
    Container,
    /// A repeated element. An empty key means the list is unkeyed.
    List {
        key: Vec<QName>,
        ordering: ListOrdering,
    },
    Leaf {
        ty: LeafType,
    },
    LeafList {
        ty: LeafType,
        ordering: ListOrdering,
    },
    Choice,
    Case,
    /// An extension point: children grafted onto the node at `target`.
    Augmentation {
        target: SchemaPath,
    },
}

impl SchemaNodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::List { .. } => "list",
            Self::Leaf { .. } => "leaf",
            Self::LeafList { .. } => "leaf-list",
            Self::Choice => "choice",
            Self::Case => "case",
            Self::Augmentation { .. } => "augmentation",
        }
    }
}

/// The declared type of a leaf or leaf-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeafType {
    Empty,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Decimal64 { fraction_digits: u8 },
    String,
    Binary,
    Enumeration(Vec<EnumMember>),
    Bits(Vec<BitDef>),
    IdentityRef { base: QName },
    InstanceIdentifier,
    /// Alternatives in declared order. The order decides ambiguous values.
    Union(Vec<UnionMember>),
}

impl LeafType {
    /// The schema language keyword of this type.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Boolean => "boolean",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Decimal64 { .. } => "decimal64",
            Self::String => "string",
            Self::Binary => "binary",
            Self::Enumeration(_) => "enumeration",
            Self::Bits(_) => "bits",
            Self::IdentityRef { .. } => "identityref",
            Self::InstanceIdentifier => "instance-identifier",
            Self::Union(_) => "union",
        }
    }
}

/// One value of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Schema name, the normalized form.
    pub name: String,
    pub value: i32,
    /// Generated symbol, the typed form.
    pub symbol: String,
}

/// One bit of a bits type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitDef {
    /// Schema name, the normalized form.
    pub name: String,
    pub position: u32,
    /// Generated property name, the typed form.
    pub property: String,
}

/// One alternative of a union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionMember {
    /// Generated member name.
    pub name: String,
    pub ty: LeafType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_display_and_parent() {
        let a = QName::new("urn:t", "a");
        let path = SchemaPath::root().child(a.clone()).child(a.sibling("b"));
        assert_eq!(path.to_string(), "/(urn:t)a/(urn:t)b");
        assert_eq!(path.parent(), Some(SchemaPath::root().child(a)));
        assert!(SchemaPath::root().is_root());
    }

    #[test]
    fn node_path_includes_own_name() {
        let parent = SchemaPath::root().child(QName::new("urn:t", "lib"));
        let node = SchemaNode::new(&parent, QName::new("urn:t", "name"), SchemaNodeKind::Container);
        assert_eq!(node.path.last(), Some(&node.qname));
        assert_eq!(node.path.parent(), Some(parent));
    }
}
