//! # Generated Type Descriptors
//!
//! The metadata a generator emits alongside each generated type: the schema
//! node it represents, its accessors in declaration order, the extension
//! types that may be attached to it, the case types of a choice, and for keyed
//! lists the function that reads an entry's key.

use std::fmt;
use std::sync::Arc;

use bindec_core::{QName, TypeName, TypedKey, TypedObject};

use crate::error::KeyExtractionError;
use crate::node::SchemaPath;

/// Reads the key of a keyed list entry.
pub trait KeyExtractor: Send + Sync + fmt::Debug {
    /// Accessor names of the key leaves, in schema key order.
    fn components(&self) -> &[String];

    /// Extract the key of `entry`.
    fn extract(&self, entry: &TypedObject) -> Result<TypedKey, KeyExtractionError>;
}

/// Key extractor that reads each key leaf through its accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKeyExtractor {
    components: Vec<String>,
}

impl FieldKeyExtractor {
    pub fn new(components: Vec<String>) -> Self {
        Self { components }
    }
}

impl KeyExtractor for FieldKeyExtractor {
    fn components(&self) -> &[String] {
        &self.components
    }

    fn extract(&self, entry: &TypedObject) -> Result<TypedKey, KeyExtractionError> {
        let mut key = TypedKey::new();
        for component in &self.components {
            let value = entry.get(component).ok_or_else(|| KeyExtractionError {
                ty: entry.type_name().clone(),
                component: component.clone(),
            })?;
            key.push(component.clone(), value.clone());
        }
        Ok(key)
    }
}

/// What an accessor yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorTarget {
    /// A leaf or leaf-list value; the leaf type lives on the schema node.
    Value,
    /// A nested object of the given type.
    Container(TypeName),
    /// Entries of the given list type.
    List(TypeName),
    /// An object of one of the cases of the given choice type.
    Choice(TypeName),
}

/// One declared accessor of a generated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub name: String,
    pub qname: QName,
    pub schema: SchemaPath,
    pub target: AccessorTarget,
}

impl Accessor {
    /// An accessor for the child `qname` of the node at `parent`.
    pub fn new(
        name: impl Into<String>,
        parent: &SchemaPath,
        qname: QName,
        target: AccessorTarget,
    ) -> Self {
        Self {
            name: name.into(),
            schema: parent.child(qname.clone()),
            qname,
            target,
        }
    }

    /// The generated type behind this accessor, if it yields an object.
    pub fn target_type(&self) -> Option<&TypeName> {
        match &self.target {
            AccessorTarget::Value => None,
            AccessorTarget::Container(ty) | AccessorTarget::List(ty) | AccessorTarget::Choice(ty) => {
                Some(ty)
            }
        }
    }
}

/// Descriptor of one generated type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: TypeName,
    schema: SchemaPath,
    accessors: Vec<Accessor>,
    augmentations: Vec<TypeName>,
    cases: Vec<TypeName>,
    key_extractor: Option<Arc<dyn KeyExtractor>>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<TypeName>, schema: SchemaPath) -> Self {
        Self {
            name: name.into(),
            schema,
            accessors: Vec::new(),
            augmentations: Vec::new(),
            cases: Vec::new(),
            key_extractor: None,
        }
    }

    pub fn with_accessor(mut self, accessor: Accessor) -> Self {
        self.accessors.push(accessor);
        self
    }

    pub fn with_accessors(mut self, accessors: impl IntoIterator<Item = Accessor>) -> Self {
        self.accessors.extend(accessors);
        self
    }

    /// Declare an extension type attachable to instances of this type.
    pub fn with_augmentation(mut self, ty: impl Into<TypeName>) -> Self {
        self.add_augmentation(ty.into());
        self
    }

    /// Declare the case types of a choice, in declared order.
    pub fn with_cases(mut self, cases: impl IntoIterator<Item = TypeName>) -> Self {
        self.cases.extend(cases);
        self
    }

    pub fn with_key_extractor(mut self, extractor: Arc<dyn KeyExtractor>) -> Self {
        self.key_extractor = Some(extractor);
        self
    }

    pub(crate) fn add_augmentation(&mut self, ty: TypeName) {
        if !self.augmentations.contains(&ty) {
            self.augmentations.push(ty);
        }
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn schema(&self) -> &SchemaPath {
        &self.schema
    }

    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }

    pub fn augmentations(&self) -> &[TypeName] {
        &self.augmentations
    }

    pub fn cases(&self) -> &[TypeName] {
        &self.cases
    }

    pub fn key_extractor(&self) -> Option<&Arc<dyn KeyExtractor>> {
        self.key_extractor.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_extractor_reads_components_in_order() {
        let extractor = FieldKeyExtractor::new(vec!["b".into(), "a".into()]);
        let entry = TypedObject::builder("Item")
            .field("a", 1u64)
            .field("b", "x")
            .build();
        let key = extractor.extract(&entry).unwrap();
        let names: Vec<_> = key.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn field_extractor_reports_missing_component() {
        let extractor = FieldKeyExtractor::new(vec!["id".into()]);
        let entry = TypedObject::builder("Item").field("name", "x").build();
        let err = extractor.extract(&entry).unwrap_err();
        assert_eq!(err.component, "id");
        assert_eq!(err.ty.as_str(), "Item");
    }

    #[test]
    fn augmentations_are_deduplicated() {
        let d = TypeDescriptor::new("Library", SchemaPath::root())
            .with_augmentation("Ext")
            .with_augmentation("Ext");
        assert_eq!(d.augmentations().len(), 1);
    }
}
