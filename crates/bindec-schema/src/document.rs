//! # Descriptor Documents
//!
//! Reads generator output from a YAML or JSON document and turns it into a
//! [`SchemaIndex`]. The document mirrors the schema tree:
//!
//! ```yaml
//! modules:
//!   - prefix: lib
//!     namespace: urn:example:library
//!     revision: 2024-01-01
//! identities:
//!   - name: lib:crime
//!     base: lib:genre
//! data:
//!   - kind: container
//!     name: lib:library
//!     children:
//!       - kind: leaf
//!         name: name
//!         type: string
//! augmentations:
//!   - name: lib:library-ext
//!     target: [lib:library]
//!     children: []
//! ```
//!
//! Names are `prefix:local`; an unprefixed name inherits the module of its
//! enclosing declaration. Omitted generated names follow the binding naming
//! rules: types and enum symbols in upper camel case, accessors and bit
//! properties in lower camel case.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bindec_core::{ListOrdering, QName, TypeName};
use heck::{ToLowerCamelCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

use crate::descriptor::{Accessor, AccessorTarget, FieldKeyExtractor, TypeDescriptor};
use crate::error::SchemaIndexError;
use crate::index::{SchemaIndex, SchemaIndexBuilder};
use crate::node::{
    BitDef, EnumMember, LeafType, SchemaNode, SchemaNodeKind, SchemaPath, UnionMember,
};

/// Top-level descriptor document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub modules: Vec<ModuleDecl>,
    #[serde(default)]
    pub identities: Vec<IdentityDecl>,
    #[serde(default)]
    pub data: Vec<NodeDecl>,
    #[serde(default)]
    pub augmentations: Vec<AugmentationDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDecl {
    pub prefix: String,
    pub namespace: String,
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityDecl {
    pub name: String,
    #[serde(default)]
    pub binding: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
}

/// A data node declaration, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeDecl {
    Container {
        name: String,
        #[serde(default)]
        binding: Option<String>,
        #[serde(default)]
        accessor: Option<String>,
        #[serde(default)]
        children: Vec<NodeDecl>,
    },
    List {
        name: String,
        #[serde(default)]
        binding: Option<String>,
        #[serde(default)]
        accessor: Option<String>,
        #[serde(default)]
        key: Vec<String>,
        #[serde(default, rename = "ordered-by")]
        ordered_by: ListOrdering,
        #[serde(default)]
        children: Vec<NodeDecl>,
    },
    Leaf {
        name: String,
        #[serde(default)]
        accessor: Option<String>,
        #[serde(rename = "type")]
        ty: TypeDecl,
    },
    LeafList {
        name: String,
        #[serde(default)]
        accessor: Option<String>,
        #[serde(rename = "type")]
        ty: TypeDecl,
        #[serde(default, rename = "ordered-by")]
        ordered_by: ListOrdering,
    },
    Choice {
        name: String,
        #[serde(default)]
        binding: Option<String>,
        #[serde(default)]
        accessor: Option<String>,
        cases: Vec<CaseDecl>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseDecl {
    pub name: String,
    #[serde(default)]
    pub binding: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AugmentationDecl {
    pub name: String,
    #[serde(default)]
    pub binding: Option<String>,
    pub target: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeDecl>,
}

/// A leaf type: a bare keyword, or a single-key map for parameterized types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeDecl {
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
    String,
    Binary,
    InstanceIdentifier,
    Decimal64 {
        #[serde(rename = "fraction-digits")]
        fraction_digits: u8,
    },
    Enumeration(Vec<EnumDecl>),
    Bits(Vec<BitDecl>),
    Identityref {
        base: String,
    },
    Union(Vec<UnionMemberDecl>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumDecl {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        value: Option<i32>,
        #[serde(default)]
        symbol: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BitDecl {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        position: Option<u32>,
        #[serde(default)]
        property: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnionMemberDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeDecl,
}

impl SchemaDocument {
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaIndexError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SchemaIndexError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the schema index this document describes.
    pub fn into_index(self) -> Result<SchemaIndex, SchemaIndexError> {
        let mut loader = Loader::new(&self.modules);

        for identity in &self.identities {
            let qname = loader.qname(&identity.name, None)?;
            if let Some(base) = &identity.base {
                // Bases are resolved only to report undeclared prefixes.
                loader.qname(base, Some(&qname))?;
            }
            let binding = identity
                .binding
                .clone()
                .unwrap_or_else(|| qname.local_name().to_upper_camel_case());
            loader.builder.add_identity(qname, TypeName::from(binding));
        }

        let root = SchemaPath::root();
        for decl in &self.data {
            let accessor = loader.data_node(decl, &root, None)?;
            match accessor.target {
                AccessorTarget::Container(ty) | AccessorTarget::List(ty) => {
                    loader.builder.add_root(ty)
                }
                _ => return Err(SchemaIndexError::InvalidRoot(accessor.schema)),
            }
        }

        for augmentation in &self.augmentations {
            loader.augmentation(augmentation)?;
        }

        loader.builder.build()
    }
}

/// Load a descriptor document from disk. `.json` files are read as JSON,
/// everything else as YAML.
pub fn load_path(path: &Path) -> Result<SchemaIndex, SchemaIndexError> {
    let text = std::fs::read_to_string(path).map_err(|source| SchemaIndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => SchemaDocument::from_json_str(&text)?,
        _ => SchemaDocument::from_yaml_str(&text)?,
    };
    tracing::debug!(path = %path.display(), "loaded schema document");
    document.into_index()
}

struct Loader<'a> {
    modules: HashMap<&'a str, &'a ModuleDecl>,
    default_module: Option<&'a ModuleDecl>,
    builder: SchemaIndexBuilder,
}

impl<'a> Loader<'a> {
    fn new(modules: &'a [ModuleDecl]) -> Self {
        Self {
            modules: modules.iter().map(|m| (m.prefix.as_str(), m)).collect(),
            default_module: modules.first(),
            builder: SchemaIndex::builder(),
        }
    }

    /// Resolve `prefix:local`, or an unprefixed name in the module of
    /// `inherit` (the first declared module when there is none).
    fn qname(&self, text: &str, inherit: Option<&QName>) -> Result<QName, SchemaIndexError> {
        let qualify = |module: &ModuleDecl, local: &str| match &module.revision {
            Some(rev) => QName::with_revision(&module.namespace, rev, local),
            None => QName::new(&module.namespace, local),
        };
        let (prefix, local) = match text.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, text),
        };
        if local.is_empty() || local.contains(['(', ')', '/', '[', ']']) {
            return Err(SchemaIndexError::InvalidName(text.to_string()));
        }
        match (prefix, inherit) {
            (Some(prefix), _) => {
                let module = self.modules.get(prefix).copied().ok_or_else(|| {
                    SchemaIndexError::UnknownPrefix {
                        prefix: prefix.to_string(),
                        name: text.to_string(),
                    }
                })?;
                Ok(qualify(module, local))
            }
            (None, Some(parent)) => Ok(parent.sibling(local)),
            (None, None) => self
                .default_module
                .map(|m| qualify(m, local))
                .ok_or_else(|| SchemaIndexError::InvalidName(text.to_string())),
        }
    }

    /// Register a data node and everything below it; return the accessor the
    /// enclosing type uses to reach it.
    fn data_node(
        &mut self,
        decl: &NodeDecl,
        parent: &SchemaPath,
        module: Option<&QName>,
    ) -> Result<Accessor, SchemaIndexError> {
        match decl {
            NodeDecl::Leaf { name, accessor, ty } => {
                let qname = self.qname(name, module)?;
                let ty = self.leaf_type(ty, &qname)?;
                self.builder
                    .add_node(SchemaNode::new(parent, qname.clone(), SchemaNodeKind::Leaf { ty }));
                Ok(Accessor::new(accessor_name(accessor, &qname), parent, qname, AccessorTarget::Value))
            }
            NodeDecl::LeafList {
                name,
                accessor,
                ty,
                ordered_by,
            } => {
                let qname = self.qname(name, module)?;
                let ty = self.leaf_type(ty, &qname)?;
                self.builder.add_node(SchemaNode::new(
                    parent,
                    qname.clone(),
                    SchemaNodeKind::LeafList {
                        ty,
                        ordering: *ordered_by,
                    },
                ));
                Ok(Accessor::new(accessor_name(accessor, &qname), parent, qname, AccessorTarget::Value))
            }
            NodeDecl::Container {
                name,
                binding,
                accessor,
                children,
            } => {
                let qname = self.qname(name, module)?;
                let node = SchemaNode::new(parent, qname.clone(), SchemaNodeKind::Container);
                let path = node.path.clone();
                self.builder.add_node(node);
                let accessors = self.children(children, &path, &qname)?;
                let ty = type_name(binding, &qname);
                self.builder
                    .add_descriptor(TypeDescriptor::new(ty.clone(), path).with_accessors(accessors));
                Ok(Accessor::new(
                    accessor_name(accessor, &qname),
                    parent,
                    qname,
                    AccessorTarget::Container(ty),
                ))
            }
            NodeDecl::List {
                name,
                binding,
                accessor,
                key,
                ordered_by,
                children,
            } => {
                let qname = self.qname(name, module)?;
                let path = parent.child(qname.clone());
                let accessors = self.children(children, &path, &qname)?;

                let mut key_names = Vec::with_capacity(key.len());
                let mut components = Vec::with_capacity(key.len());
                for k in key {
                    let key_qname = self.qname(k, Some(&qname))?;
                    let leaf = accessors
                        .iter()
                        .find(|a| a.qname == key_qname && a.target == AccessorTarget::Value)
                        .ok_or_else(|| SchemaIndexError::UnknownKeyLeaf {
                            list: path.clone(),
                            key: k.clone(),
                        })?;
                    components.push(leaf.name.clone());
                    key_names.push(key_qname);
                }

                self.builder.add_node(SchemaNode::new(
                    parent,
                    qname.clone(),
                    SchemaNodeKind::List {
                        key: key_names,
                        ordering: *ordered_by,
                    },
                ));
                let ty = type_name(binding, &qname);
                let mut descriptor = TypeDescriptor::new(ty.clone(), path).with_accessors(accessors);
                if !components.is_empty() {
                    descriptor =
                        descriptor.with_key_extractor(Arc::new(FieldKeyExtractor::new(components)));
                }
                self.builder.add_descriptor(descriptor);
                Ok(Accessor::new(
                    accessor_name(accessor, &qname),
                    parent,
                    qname,
                    AccessorTarget::List(ty),
                ))
            }
            NodeDecl::Choice {
                name,
                binding,
                accessor,
                cases,
            } => {
                let qname = self.qname(name, module)?;
                let node = SchemaNode::new(parent, qname.clone(), SchemaNodeKind::Choice);
                let choice_path = node.path.clone();
                self.builder.add_node(node);

                let mut case_types = Vec::with_capacity(cases.len());
                for case in cases {
                    let case_qname = self.qname(&case.name, Some(&qname))?;
                    let case_node =
                        SchemaNode::new(&choice_path, case_qname.clone(), SchemaNodeKind::Case);
                    let case_path = case_node.path.clone();
                    self.builder.add_node(case_node);
                    let accessors = self.children(&case.children, &case_path, &case_qname)?;
                    let case_ty = type_name(&case.binding, &case_qname);
                    self.builder.add_descriptor(
                        TypeDescriptor::new(case_ty.clone(), case_path).with_accessors(accessors),
                    );
                    case_types.push(case_ty);
                }

                let ty = type_name(binding, &qname);
                self.builder
                    .add_descriptor(TypeDescriptor::new(ty.clone(), choice_path).with_cases(case_types));
                Ok(Accessor::new(
                    accessor_name(accessor, &qname),
                    parent,
                    qname,
                    AccessorTarget::Choice(ty),
                ))
            }
        }
    }

    fn children(
        &mut self,
        decls: &[NodeDecl],
        parent: &SchemaPath,
        module: &QName,
    ) -> Result<Vec<Accessor>, SchemaIndexError> {
        decls
            .iter()
            .map(|d| self.data_node(d, parent, Some(module)))
            .collect()
    }

    fn augmentation(&mut self, decl: &AugmentationDecl) -> Result<(), SchemaIndexError> {
        let qname = self.qname(&decl.name, None)?;
        let mut target = SchemaPath::root();
        let mut previous: Option<QName> = None;
        for step in &decl.target {
            let name = self.qname(step, previous.as_ref())?;
            target = target.child(name.clone());
            previous = Some(name);
        }

        let node = SchemaNode::new(
            &target,
            qname.clone(),
            SchemaNodeKind::Augmentation {
                target: target.clone(),
            },
        );
        let path = node.path.clone();
        self.builder.add_node(node);
        // Augmented children live under the target, in the augmenting module.
        let accessors = self.children(&decl.children, &target, &qname)?;
        self.builder.add_descriptor(
            TypeDescriptor::new(type_name(&decl.binding, &qname), path).with_accessors(accessors),
        );
        Ok(())
    }

    fn leaf_type(&self, decl: &TypeDecl, owner: &QName) -> Result<LeafType, SchemaIndexError> {
        Ok(match decl {
            TypeDecl::Empty => LeafType::Empty,
            TypeDecl::Boolean => LeafType::Boolean,
            TypeDecl::Int8 => LeafType::Int8,
            TypeDecl::Int16 => LeafType::Int16,
            TypeDecl::Int32 => LeafType::Int32,
            TypeDecl::Int64 => LeafType::Int64,
            TypeDecl::Uint8 => LeafType::Uint8,
            TypeDecl::Uint16 => LeafType::Uint16,
            TypeDecl::Uint32 => LeafType::Uint32,
            TypeDecl::Uint64 => LeafType::Uint64,
            TypeDecl::String => LeafType::String,
            TypeDecl::Binary => LeafType::Binary,
            TypeDecl::InstanceIdentifier => LeafType::InstanceIdentifier,
            TypeDecl::Decimal64 { fraction_digits } => LeafType::Decimal64 {
                fraction_digits: *fraction_digits,
            },
            TypeDecl::Identityref { base } => LeafType::IdentityRef {
                base: self.qname(base, Some(owner))?,
            },
            TypeDecl::Enumeration(members) => {
                let mut next = 0i32;
                let mut out = Vec::with_capacity(members.len());
                for member in members {
                    let (name, value, symbol) = match member {
                        EnumDecl::Name(name) => (name, None, None),
                        EnumDecl::Full {
                            name,
                            value,
                            symbol,
                        } => (name, *value, symbol.clone()),
                    };
                    let value = value.unwrap_or(next);
                    next = value.saturating_add(1);
                    out.push(EnumMember {
                        name: name.clone(),
                        value,
                        symbol: symbol.unwrap_or_else(|| name.to_upper_camel_case()),
                    });
                }
                LeafType::Enumeration(out)
            }
            TypeDecl::Bits(bits) => {
                let mut next = 0u32;
                let mut out = Vec::with_capacity(bits.len());
                for bit in bits {
                    let (name, position, property) = match bit {
                        BitDecl::Name(name) => (name, None, None),
                        BitDecl::Full {
                            name,
                            position,
                            property,
                        } => (name, *position, property.clone()),
                    };
                    let position = position.unwrap_or(next);
                    next = position.saturating_add(1);
                    out.push(BitDef {
                        name: name.clone(),
                        position,
                        property: property.unwrap_or_else(|| name.to_lower_camel_case()),
                    });
                }
                LeafType::Bits(out)
            }
            TypeDecl::Union(members) => {
                let mut out: Vec<UnionMember> = Vec::with_capacity(members.len());
                for member in members {
                    let ty = self.leaf_type(&member.ty, owner)?;
                    let base = member
                        .name
                        .clone()
                        .unwrap_or_else(|| ty.keyword().to_lower_camel_case());
                    let mut name = base.clone();
                    let mut suffix = 1;
                    while out.iter().any(|m| m.name == name) {
                        suffix += 1;
                        name = format!("{base}{suffix}");
                    }
                    out.push(UnionMember { name, ty });
                }
                LeafType::Union(out)
            }
        })
    }
}

fn accessor_name(explicit: &Option<String>, qname: &QName) -> String {
    explicit
        .clone()
        .unwrap_or_else(|| qname.local_name().to_lower_camel_case())
}

fn type_name(explicit: &Option<String>, qname: &QName) -> TypeName {
    TypeName::from(
        explicit
            .clone()
            .unwrap_or_else(|| qname.local_name().to_upper_camel_case()),
    )
}
