//! # Typed Trees
//!
//! Instances of generated types. A [`TypedObject`] is identified by its
//! [`TypeName`] and exposes values through named accessors. Extension objects
//! (augmentations) are attached beside the accessors and keyed by their own
//! type, so they never collide with declared fields.
//!
//! Objects are immutable; [`TypedObjectBuilder`] is the only way to assemble
//! one and is the construction hook the codec uses when decoding.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Decimal64;

/// Identity of a generated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A value held by a typed-object accessor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum TypedValue {
    Empty,
    Boolean(bool),
    Int(i64),
    Uint(u64),
    Decimal(Decimal64),
    String(String),
    Binary(Vec<u8>),
    /// Generated enumeration symbol.
    Enum(String),
    /// Generated property names of the bits that are set.
    Bits(BTreeSet<String>),
    /// Generated identity type.
    Identity(TypeName),
    InstanceIdentifier(TypedPath),
    /// One alternative of a union, tagged with the member that holds it.
    Union(UnionValue),
    Object(TypedObject),
    List(Vec<TypedObject>),
    LeafList(Vec<TypedValue>),
}

impl TypedValue {
    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Boolean(_) => "boolean",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Enum(_) => "enum",
            Self::Bits(_) => "bits",
            Self::Identity(_) => "identity",
            Self::InstanceIdentifier(_) => "instance-identifier",
            Self::Union(_) => "union",
            Self::Object(_) => "object",
            Self::List(_) => "list",
            Self::LeafList(_) => "leaf-list",
        }
    }

    pub fn union(member: impl Into<String>, value: TypedValue) -> Self {
        Self::Union(UnionValue {
            member: member.into(),
            value: Box::new(value),
        })
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<u64> for TypedValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<TypedObject> for TypedValue {
    fn from(value: TypedObject) -> Self {
        Self::Object(value)
    }
}

/// The resolved alternative of a union value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnionValue {
    /// Generated member name of the alternative.
    pub member: String,
    pub value: Box<TypedValue>,
}

/// An instance of a generated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedObject {
    #[serde(rename = "type")]
    ty: TypeName,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, TypedValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    augmentations: BTreeMap<TypeName, TypedObject>,
}

impl TypedObject {
    pub fn builder(ty: impl Into<TypeName>) -> TypedObjectBuilder {
        TypedObjectBuilder {
            object: TypedObject {
                ty: ty.into(),
                fields: BTreeMap::new(),
                augmentations: BTreeMap::new(),
            },
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.ty
    }

    /// Value of the named accessor, `None` when unset.
    pub fn get(&self, accessor: &str) -> Option<&TypedValue> {
        self.fields.get(accessor)
    }

    pub fn has_field(&self, accessor: &str) -> bool {
        self.fields.contains_key(accessor)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn augmentation(&self, ty: &TypeName) -> Option<&TypedObject> {
        self.augmentations.get(ty)
    }

    pub fn augmentations(&self) -> impl Iterator<Item = (&TypeName, &TypedObject)> {
        self.augmentations.iter()
    }
}

/// Assembles a [`TypedObject`].
#[derive(Debug, Clone)]
pub struct TypedObjectBuilder {
    object: TypedObject,
}

impl TypedObjectBuilder {
    pub fn field(mut self, accessor: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.set_field(accessor, value);
        self
    }

    pub fn set_field(&mut self, accessor: impl Into<String>, value: impl Into<TypedValue>) {
        self.object.fields.insert(accessor.into(), value.into());
    }

    pub fn has_field(&self, accessor: &str) -> bool {
        self.object.fields.contains_key(accessor)
    }

    /// Attach an extension object, keyed by its own type.
    pub fn augmentation(mut self, augmentation: TypedObject) -> Self {
        self.add_augmentation(augmentation);
        self
    }

    pub fn add_augmentation(&mut self, augmentation: TypedObject) {
        self.object
            .augmentations
            .insert(augmentation.ty.clone(), augmentation);
    }

    pub fn build(self) -> TypedObject {
        self.object
    }
}

/// One named component of a typed list key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyComponent {
    /// Accessor name of the key leaf.
    pub name: String,
    pub value: TypedValue,
}

/// A typed list key, components in schema key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypedKey(Vec<KeyComponent>);

impl TypedKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<TypedValue>) {
        self.0.push(KeyComponent {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.0.iter().find(|c| c.name == name).map(|c| &c.value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyComponent> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<KeyComponent> for TypedKey {
    fn from_iter<T: IntoIterator<Item = KeyComponent>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One step of a typed path: a type, optionally the case it sits in, and for
/// keyed lists the key of the addressed entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedPathArgument {
    #[serde(rename = "type")]
    pub ty: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<TypedKey>,
}

impl TypedPathArgument {
    pub fn item(ty: impl Into<TypeName>) -> Self {
        Self {
            ty: ty.into(),
            case: None,
            key: None,
        }
    }

    pub fn keyed(ty: impl Into<TypeName>, key: TypedKey) -> Self {
        Self {
            ty: ty.into(),
            case: None,
            key: Some(key),
        }
    }

    pub fn in_case(mut self, case: impl Into<TypeName>) -> Self {
        self.case = Some(case.into());
        self
    }
}

impl fmt::Display for TypedPathArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(case) = &self.case {
            write!(f, "{case}:")?;
        }
        write!(f, "{}", self.ty)?;
        if let Some(key) = &self.key {
            f.write_str("[")?;
            for (i, c) in key.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}={:?}", c.name, c.value)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// A path from the root of a typed tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypedPath(Vec<TypedPathArgument>);

impl TypedPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(mut self, arg: TypedPathArgument) -> Self {
        self.0.push(arg);
        self
    }

    pub fn push(&mut self, arg: TypedPathArgument) {
        self.0.push(arg);
    }

    pub fn args(&self) -> &[TypedPathArgument] {
        &self.0
    }

    pub fn last(&self) -> Option<&TypedPathArgument> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<TypedPathArgument> for TypedPath {
    fn from_iter<T: IntoIterator<Item = TypedPathArgument>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for TypedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assembles_fields_and_augmentations() {
        let ext = TypedObject::builder("LibraryExt").field("extra", 42u64).build();
        let obj = TypedObject::builder("Library")
            .field("name", "bar")
            .augmentation(ext.clone())
            .build();
        assert_eq!(obj.type_name().as_str(), "Library");
        assert_eq!(obj.get("name"), Some(&TypedValue::from("bar")));
        assert!(!obj.has_field("missing"));
        assert_eq!(obj.augmentation(&TypeName::from("LibraryExt")), Some(&ext));
    }

    #[test]
    fn object_equality_ignores_field_order() {
        let a = TypedObject::builder("T").field("a", 1u64).field("b", 2u64).build();
        let b = TypedObject::builder("T").field("b", 2u64).field("a", 1u64).build();
        assert_eq!(a, b);
    }

    #[test]
    fn typed_key_keeps_order() {
        let key = TypedKey::new().with("z", 1u64).with("a", "x");
        let names: Vec<_> = key.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["z", "a"]);
        assert_eq!(key.get("a"), Some(&TypedValue::from("x")));
    }

    #[test]
    fn object_json_shape() {
        let obj = TypedObject::builder("Library").field("name", "bar").build();
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "Library",
                "fields": {"name": {"type": "string", "value": "bar"}}
            })
        );
        let back: TypedObject = serde_json::from_value(json).unwrap();
        assert_eq!(back, obj);
    }

    #[test]
    fn path_display() {
        let path = TypedPath::new()
            .child(TypedPathArgument::item("Library"))
            .child(TypedPathArgument::keyed("Book", TypedKey::new().with("isbn", "42")));
        assert_eq!(path.to_string(), "Library / Book[isbn=String(\"42\")]");
    }
}
