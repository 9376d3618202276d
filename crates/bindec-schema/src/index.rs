//! # Schema Index
//!
//! The immutable reverse mapping {generated type ↔ schema node}, plus the
//! identity table. One index is built per schema generation and then only
//! read, so it is shared behind an `Arc` without locking.

use std::collections::HashMap;
use std::sync::Arc;

use bindec_core::{QName, TypeName};

use crate::descriptor::{KeyExtractor, TypeDescriptor};
use crate::error::SchemaIndexError;
use crate::node::{SchemaNode, SchemaNodeKind, SchemaPath};

/// Queryable, immutable schema index.
#[derive(Debug)]
pub struct SchemaIndex {
    nodes: HashMap<SchemaPath, SchemaNode>,
    types: HashMap<TypeName, TypeDescriptor>,
    by_schema: HashMap<SchemaPath, TypeName>,
    identities: HashMap<QName, TypeName>,
    identity_names: HashMap<TypeName, QName>,
    roots: Vec<TypeName>,
}

impl SchemaIndex {
    pub fn builder() -> SchemaIndexBuilder {
        SchemaIndexBuilder::default()
    }

    /// The schema node a generated type represents.
    pub fn resolve_schema_node(&self, ty: &TypeName) -> Option<&SchemaNode> {
        self.types.get(ty).and_then(|d| self.nodes.get(d.schema()))
    }

    pub fn schema_node(&self, path: &SchemaPath) -> Option<&SchemaNode> {
        self.nodes.get(path)
    }

    pub fn descriptor(&self, ty: &TypeName) -> Option<&TypeDescriptor> {
        self.types.get(ty)
    }

    /// The generated type that represents the schema node at `path`.
    pub fn type_for_schema(&self, path: &SchemaPath) -> Option<&TypeName> {
        self.by_schema.get(path)
    }

    pub fn key_extractor(&self, ty: &TypeName) -> Option<&Arc<dyn KeyExtractor>> {
        self.types.get(ty).and_then(TypeDescriptor::key_extractor)
    }

    /// Qualified identity name → generated identity type.
    pub fn identity_table(&self) -> &HashMap<QName, TypeName> {
        &self.identities
    }

    pub fn identity_type(&self, name: &QName) -> Option<&TypeName> {
        self.identities.get(name)
    }

    pub fn identity_name(&self, ty: &TypeName) -> Option<&QName> {
        self.identity_names.get(ty)
    }

    /// Top-level types, in declaration order.
    pub fn roots(&self) -> &[TypeName] {
        &self.roots
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Assembles a [`SchemaIndex`].
///
/// Extension descriptors whose schema node is an augmentation are attached to
/// the type at the augmentation target when the index is built.
#[derive(Debug, Default)]
pub struct SchemaIndexBuilder {
    nodes: Vec<SchemaNode>,
    descriptors: Vec<TypeDescriptor>,
    identities: Vec<(QName, TypeName)>,
    roots: Vec<TypeName>,
}

impl SchemaIndexBuilder {
    pub fn node(mut self, node: SchemaNode) -> Self {
        self.add_node(node);
        self
    }

    pub fn add_node(&mut self, node: SchemaNode) {
        self.nodes.push(node);
    }

    pub fn descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.add_descriptor(descriptor);
        self
    }

    pub fn add_descriptor(&mut self, descriptor: TypeDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn identity(mut self, name: QName, ty: impl Into<TypeName>) -> Self {
        self.add_identity(name, ty.into());
        self
    }

    pub fn add_identity(&mut self, name: QName, ty: TypeName) {
        self.identities.push((name, ty));
    }

    pub fn root(mut self, ty: impl Into<TypeName>) -> Self {
        self.add_root(ty.into());
        self
    }

    pub fn add_root(&mut self, ty: TypeName) {
        self.roots.push(ty);
    }

    pub fn build(self) -> Result<SchemaIndex, SchemaIndexError> {
        let nodes: HashMap<SchemaPath, SchemaNode> = self
            .nodes
            .into_iter()
            .map(|n| (n.path.clone(), n))
            .collect();

        let mut types = HashMap::with_capacity(self.descriptors.len());
        let mut by_schema = HashMap::with_capacity(self.descriptors.len());
        for descriptor in self.descriptors {
            let name = descriptor.name().clone();
            by_schema.insert(descriptor.schema().clone(), name.clone());
            if types.insert(name.clone(), descriptor).is_some() {
                return Err(SchemaIndexError::DuplicateType(name));
            }
        }

        let mut attachments = Vec::new();
        for descriptor in types.values() {
            let Some(node) = nodes.get(descriptor.schema()) else {
                continue;
            };
            if let SchemaNodeKind::Augmentation { target } = &node.kind {
                let host = by_schema.get(target).cloned().ok_or_else(|| {
                    SchemaIndexError::DanglingAugmentation {
                        augmentation: descriptor.name().clone(),
                        target: target.clone(),
                    }
                })?;
                attachments.push((host, descriptor.name().clone()));
            }
        }
        // Deterministic attachment order regardless of map iteration.
        attachments.sort();
        for (host, augmentation) in attachments {
            if let Some(d) = types.get_mut(&host) {
                d.add_augmentation(augmentation);
            }
        }

        let identity_names = self
            .identities
            .iter()
            .map(|(q, t)| (t.clone(), q.clone()))
            .collect();

        tracing::debug!(
            nodes = nodes.len(),
            types = types.len(),
            identities = self.identities.len(),
            "built schema index"
        );

        Ok(SchemaIndex {
            nodes,
            types,
            by_schema,
            identities: self.identities.into_iter().collect(),
            identity_names,
            roots: self.roots,
        })
    }
}
