//! Contexts for containers, list entries, cases and augmentations.
//!
//! Direct children are dispatched by qualified name. Augmentation children
//! live in a separate map keyed by the augmentation's own type, and are only
//! consulted for normalized children no direct accessor claims.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use bindec_core::{
    ContainerNode, DataChildren, LeafNode, LeafSetNode, ListOrdering, MapEntryNode, MapNode,
    NormalizedNode, QName, TypeName, TypedObject, TypedObjectBuilder, TypedValue, UnkeyedListNode,
};
use bindec_schema::{
    Accessor, AccessorTarget, FieldKeyExtractor, KeyExtractor, SchemaIndex, SchemaNode, SchemaNodeKind,
    TypeDescriptor,
};

use super::key::ListKeyCodec;
use super::CodecPrototype;
use crate::error::CodecError;
use crate::tree::CodecTree;
use crate::value::ValueCodec;

/// Which kind of schema node a [`DataObjectContext`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataObjectShape {
    Container,
    ListEntry,
    Case,
    Augmentation,
}

/// How a typed-path step descends into a child type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathChildKind {
    Container,
    List { keyed: bool },
}

/// A child type reachable by one typed-path step, possibly through choices.
#[derive(Debug, Clone)]
pub(crate) struct PathChild {
    pub(crate) qname: QName,
    /// Choice names between the parent and the child, outermost first.
    pub(crate) choices: Vec<QName>,
    /// The innermost case holding the child.
    pub(crate) case: Option<TypeName>,
    pub(crate) kind: PathChildKind,
}

impl PathChild {
    pub(crate) fn direct(qname: QName, kind: PathChildKind) -> Self {
        Self {
            qname,
            choices: Vec::new(),
            case: None,
            kind,
        }
    }
}

/// What a normalized-path step names inside a data object.
pub(crate) enum ChildStep<'a> {
    Value { leaf_list: bool },
    Data { ty: &'a TypeName, kind: PathChildKind },
    Choice(&'a Arc<CodecPrototype>),
}

#[derive(Debug)]
enum ChildCodec {
    Leaf {
        accessor: String,
        qname: QName,
        codec: Arc<dyn ValueCodec>,
    },
    LeafList {
        accessor: String,
        qname: QName,
        ordering: ListOrdering,
        codec: Arc<dyn ValueCodec>,
    },
    Container {
        accessor: String,
        qname: QName,
        prototype: Arc<CodecPrototype>,
    },
    List {
        accessor: String,
        qname: QName,
        ordering: ListOrdering,
        keyed: bool,
        prototype: Arc<CodecPrototype>,
    },
    Choice {
        accessor: String,
        qname: QName,
        prototype: Arc<CodecPrototype>,
    },
}

impl ChildCodec {
    fn accessor(&self) -> &str {
        match self {
            Self::Leaf { accessor, .. }
            | Self::LeafList { accessor, .. }
            | Self::Container { accessor, .. }
            | Self::List { accessor, .. }
            | Self::Choice { accessor, .. } => accessor,
        }
    }

    fn qname(&self) -> &QName {
        match self {
            Self::Leaf { qname, .. }
            | Self::LeafList { qname, .. }
            | Self::Container { qname, .. }
            | Self::List { qname, .. }
            | Self::Choice { qname, .. } => qname,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Self::Leaf { .. } => "leaf",
            Self::LeafList { .. } => "leaf-set",
            Self::Container { .. } => "container",
            Self::List { keyed: true, .. } => "map",
            Self::List { keyed: false, .. } => "unkeyed-list",
            Self::Choice { .. } => "choice",
        }
    }

    fn prototype(&self) -> Option<&Arc<CodecPrototype>> {
        match self {
            Self::Container { prototype, .. }
            | Self::List { prototype, .. }
            | Self::Choice { prototype, .. } => Some(prototype),
            Self::Leaf { .. } | Self::LeafList { .. } => None,
        }
    }

    fn typed_mismatch(&self, value: &TypedValue) -> CodecError {
        CodecError::IncorrectNesting(format!(
            "accessor '{}' expects a {} value, found {}",
            self.accessor(),
            self.expected(),
            value.kind()
        ))
    }

    fn encode(&self, tree: &CodecTree, value: &TypedValue) -> Result<NormalizedNode, CodecError> {
        match self {
            Self::Leaf { qname, codec, .. } => Ok(NormalizedNode::Leaf(LeafNode {
                name: qname.clone(),
                value: codec.encode(value)?,
            })),
            Self::LeafList {
                qname,
                ordering,
                codec,
                ..
            } => {
                let TypedValue::LeafList(values) = value else {
                    return Err(self.typed_mismatch(value));
                };
                let mut set = LeafSetNode::new(qname.clone(), *ordering);
                for v in values {
                    set.push(codec.encode(v)?);
                }
                Ok(NormalizedNode::LeafSet(set))
            }
            Self::Container { prototype, .. } => {
                let TypedValue::Object(object) = value else {
                    return Err(self.typed_mismatch(value));
                };
                let ctx = prototype.get(tree)?;
                Ok(NormalizedNode::Container(
                    ctx.as_data_object()?.encode_container(tree, object)?,
                ))
            }
            Self::List {
                qname,
                ordering,
                keyed,
                prototype,
                ..
            } => {
                let TypedValue::List(entries) = value else {
                    return Err(self.typed_mismatch(value));
                };
                let ctx = prototype.get(tree)?;
                let ctx = ctx.as_data_object()?;
                if *keyed {
                    let mut map = MapNode::new(qname.clone(), *ordering);
                    for entry in entries {
                        map.push(ctx.encode_entry(tree, entry)?);
                    }
                    Ok(NormalizedNode::Map(map))
                } else {
                    let mut list = UnkeyedListNode::new(qname.clone());
                    for entry in entries {
                        list.entries.push(ctx.encode_container(tree, entry)?);
                    }
                    Ok(NormalizedNode::UnkeyedList(list))
                }
            }
            Self::Choice { prototype, .. } => {
                let TypedValue::Object(case) = value else {
                    return Err(self.typed_mismatch(value));
                };
                let ctx = prototype.get(tree)?;
                Ok(NormalizedNode::Choice(ctx.as_choice()?.encode(tree, case)?))
            }
        }
    }

    fn decode(&self, tree: &CodecTree, node: &NormalizedNode) -> Result<TypedValue, CodecError> {
        match (self, node) {
            (Self::Leaf { codec, .. }, NormalizedNode::Leaf(leaf)) => codec.decode(&leaf.value),
            (Self::LeafList { codec, .. }, NormalizedNode::LeafSet(set)) => set
                .values()
                .iter()
                .map(|v| codec.decode(v))
                .collect::<Result<Vec<_>, _>>()
                .map(TypedValue::LeafList),
            (Self::Container { prototype, .. }, NormalizedNode::Container(container)) => {
                let ctx = prototype.get(tree)?;
                ctx.as_data_object()?
                    .decode_children(tree, &container.children)
                    .map(TypedValue::Object)
            }
            (Self::List { keyed: true, prototype, .. }, NormalizedNode::Map(map)) => {
                let ctx = prototype.get(tree)?;
                let ctx = ctx.as_data_object()?;
                map.entries()
                    .iter()
                    .map(|entry| ctx.decode_entry(tree, entry))
                    .collect::<Result<Vec<_>, _>>()
                    .map(TypedValue::List)
            }
            (Self::List { keyed: false, prototype, .. }, NormalizedNode::UnkeyedList(list)) => {
                let ctx = prototype.get(tree)?;
                let ctx = ctx.as_data_object()?;
                list.entries
                    .iter()
                    .map(|entry| ctx.decode_children(tree, &entry.children))
                    .collect::<Result<Vec<_>, _>>()
                    .map(TypedValue::List)
            }
            (Self::Choice { prototype, .. }, NormalizedNode::Choice(choice)) => {
                let ctx = prototype.get(tree)?;
                ctx.as_choice()?.decode(tree, choice).map(TypedValue::Object)
            }
            (codec, other) => Err(CodecError::IncorrectNesting(format!(
                "expected {} node for {}, found {}",
                codec.expected(),
                codec.qname(),
                other.kind()
            ))),
        }
    }
}

/// Codec for one container, list entry, case or augmentation type.
#[derive(Debug)]
pub struct DataObjectContext {
    ty: TypeName,
    qname: QName,
    shape: DataObjectShape,
    strict: bool,
    children: Vec<ChildCodec>,
    by_qname: HashMap<QName, usize>,
    by_accessor: HashMap<String, usize>,
    path_children: HashMap<TypeName, PathChild>,
    augmentations: HashMap<TypeName, Arc<CodecPrototype>>,
    augmentation_by_qname: HashMap<QName, TypeName>,
    key: Option<ListKeyCodec>,
}

impl DataObjectContext {
    pub(crate) fn build(
        tree: &CodecTree,
        descriptor: &TypeDescriptor,
        node: &SchemaNode,
    ) -> Result<Self, CodecError> {
        let index = tree.index();
        let ty = descriptor.name();
        let (shape, key_names) = match &node.kind {
            SchemaNodeKind::Container => (DataObjectShape::Container, &[][..]),
            SchemaNodeKind::List { key, .. } => (DataObjectShape::ListEntry, key.as_slice()),
            SchemaNodeKind::Case => (DataObjectShape::Case, &[][..]),
            SchemaNodeKind::Augmentation { .. } => (DataObjectShape::Augmentation, &[][..]),
            other => {
                return Err(CodecError::mismatch(
                    ty,
                    format!("{} node {} is not a data object", other.name(), node.path),
                ))
            }
        };

        let mut children = Vec::with_capacity(descriptor.accessors().len());
        for accessor in descriptor.accessors() {
            children.push(child_codec(tree, ty, accessor)?);
        }
        let by_qname = children
            .iter()
            .enumerate()
            .map(|(i, c)| (c.qname().clone(), i))
            .collect();
        let by_accessor = children
            .iter()
            .enumerate()
            .map(|(i, c)| (c.accessor().to_string(), i))
            .collect();

        let mut path_children = HashMap::new();
        collect_path_children(
            index,
            ty,
            descriptor.accessors(),
            &mut Vec::new(),
            None,
            &mut HashSet::new(),
            &mut path_children,
        )?;

        let mut augmentations = HashMap::new();
        let mut augmentation_by_qname = HashMap::new();
        for aug in descriptor.augmentations() {
            let aug_descriptor = index.descriptor(aug).ok_or_else(|| {
                CodecError::mismatch(ty, format!("augmentation {aug} has no type descriptor"))
            })?;
            for accessor in aug_descriptor.accessors() {
                augmentation_by_qname
                    .entry(accessor.qname.clone())
                    .or_insert_with(|| aug.clone());
            }
            augmentations.insert(aug.clone(), tree.prototype(aug)?);
        }

        let key = if key_names.is_empty() {
            None
        } else {
            Some(key_codec(index, descriptor, key_names, &children)?)
        };

        Ok(Self {
            ty: ty.clone(),
            qname: node.qname.clone(),
            shape,
            strict: tree.config().strict_children,
            children,
            by_qname,
            by_accessor,
            path_children,
            augmentations,
            augmentation_by_qname,
            key,
        })
    }

    pub fn type_name(&self) -> &TypeName {
        &self.ty
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn shape(&self) -> DataObjectShape {
        self.shape
    }

    /// Key codec, present only for keyed list entries.
    pub fn key_codec(&self) -> Option<&ListKeyCodec> {
        self.key.as_ref()
    }

    pub fn augmentation(&self, ty: &TypeName) -> Option<&Arc<CodecPrototype>> {
        self.augmentations.get(ty)
    }

    pub(crate) fn path_child(&self, ty: &TypeName) -> Option<&PathChild> {
        self.path_children.get(ty)
    }

    pub(crate) fn child_step(&self, name: &QName) -> Option<ChildStep<'_>> {
        let child = &self.children[*self.by_qname.get(name)?];
        Some(match child {
            ChildCodec::Leaf { .. } => ChildStep::Value { leaf_list: false },
            ChildCodec::LeafList { .. } => ChildStep::Value { leaf_list: true },
            ChildCodec::Container { prototype, .. } => ChildStep::Data {
                ty: prototype.type_name(),
                kind: PathChildKind::Container,
            },
            ChildCodec::List {
                prototype, keyed, ..
            } => ChildStep::Data {
                ty: prototype.type_name(),
                kind: PathChildKind::List { keyed: *keyed },
            },
            ChildCodec::Choice { prototype, .. } => ChildStep::Choice(prototype),
        })
    }

    /// The augmentation that declares the child `name`, if any.
    pub(crate) fn augmentation_for_child(&self, name: &QName) -> Option<&TypeName> {
        self.augmentation_by_qname.get(name)
    }

    pub(crate) fn referenced_types(&self) -> Vec<TypeName> {
        self.children
            .iter()
            .filter_map(ChildCodec::prototype)
            .map(|p| p.type_name().clone())
            .chain(self.augmentations.keys().cloned())
            .collect()
    }

    fn check_type(&self, object: &TypedObject) -> Result<(), CodecError> {
        if object.type_name() == &self.ty {
            Ok(())
        } else {
            Err(CodecError::IncorrectNesting(format!(
                "expected a {} object, found {}",
                self.ty,
                object.type_name()
            )))
        }
    }

    /// Encode the children of `object`, augmentation children included.
    pub fn encode_children(
        &self,
        tree: &CodecTree,
        object: &TypedObject,
    ) -> Result<DataChildren, CodecError> {
        self.check_type(object)?;
        for (field, _) in object.fields() {
            if self.by_accessor.contains_key(field) {
                continue;
            }
            if self.strict {
                return Err(CodecError::IncorrectNesting(format!(
                    "{} declares no accessor '{field}'",
                    self.ty
                )));
            }
            tracing::debug!(ty = %self.ty, field = %field, "skipping undeclared field");
        }

        let mut children = DataChildren::new();
        for child in &self.children {
            if let Some(value) = object.get(child.accessor()) {
                children.insert(child.encode(tree, value)?);
            }
        }
        for (aug_ty, augmentation) in object.augmentations() {
            let prototype = self.augmentation(aug_ty).ok_or_else(|| {
                CodecError::IncorrectNesting(format!("{aug_ty} is not an augmentation of {}", self.ty))
            })?;
            let ctx = prototype.get(tree)?;
            let encoded = ctx.as_data_object()?.encode_children(tree, augmentation)?;
            children.extend(Vec::from(encoded));
        }
        Ok(children)
    }

    pub fn encode_container(
        &self,
        tree: &CodecTree,
        object: &TypedObject,
    ) -> Result<ContainerNode, CodecError> {
        Ok(ContainerNode::with_children(
            self.qname.clone(),
            self.encode_children(tree, object)?,
        ))
    }

    /// Encode a keyed list entry; the key is read through the key extractor.
    pub fn encode_entry(
        &self,
        tree: &CodecTree,
        object: &TypedObject,
    ) -> Result<MapEntryNode, CodecError> {
        let key = self.key.as_ref().ok_or_else(|| {
            CodecError::IncorrectNesting(format!("{} is not a keyed list", self.ty))
        })?;
        let predicates = key.encode_key(&key.key_of(object)?)?;
        Ok(MapEntryNode::with_children(
            self.qname.clone(),
            predicates,
            self.encode_children(tree, object)?,
        ))
    }

    /// Encode `object` as the node it is addressed as by a path.
    pub fn encode_node(
        &self,
        tree: &CodecTree,
        object: &TypedObject,
    ) -> Result<NormalizedNode, CodecError> {
        match self.shape {
            DataObjectShape::ListEntry if self.key.is_some() => {
                self.encode_entry(tree, object).map(NormalizedNode::MapEntry)
            }
            DataObjectShape::Container | DataObjectShape::ListEntry => {
                self.encode_container(tree, object).map(NormalizedNode::Container)
            }
            DataObjectShape::Case | DataObjectShape::Augmentation => {
                Err(CodecError::IncorrectNesting(format!(
                    "{} objects have no normalized node of their own",
                    self.ty
                )))
            }
        }
    }

    fn decode_into(
        &self,
        tree: &CodecTree,
        children: &DataChildren,
    ) -> Result<TypedObjectBuilder, CodecError> {
        let mut builder = TypedObject::builder(self.ty.clone());
        let mut extensions: BTreeMap<&TypeName, DataChildren> = BTreeMap::new();
        for child in children {
            if let Some(&i) = self.by_qname.get(child.name()) {
                let codec = &self.children[i];
                builder.set_field(codec.accessor(), codec.decode(tree, child)?);
            } else if let Some(aug) = self.augmentation_by_qname.get(child.name()) {
                extensions.entry(aug).or_default().insert(child.clone());
            } else if self.strict {
                return Err(CodecError::IncorrectNesting(format!(
                    "{} is not a child of {}",
                    child.name(),
                    self.ty
                )));
            } else {
                tracing::debug!(ty = %self.ty, child = %child.name(), "skipping unknown normalized child");
            }
        }
        for (aug, group) in extensions {
            let prototype = self.augmentation(aug).ok_or_else(|| {
                CodecError::IncorrectNesting(format!("{aug} is not an augmentation of {}", self.ty))
            })?;
            let ctx = prototype.get(tree)?;
            builder.add_augmentation(ctx.as_data_object()?.decode_children(tree, &group)?);
        }
        Ok(builder)
    }

    pub fn decode_children(
        &self,
        tree: &CodecTree,
        children: &DataChildren,
    ) -> Result<TypedObject, CodecError> {
        self.decode_into(tree, children).map(TypedObjectBuilder::build)
    }

    /// Decode a keyed list entry. Key leaves missing from the children are
    /// restored from the entry's predicates.
    pub fn decode_entry(
        &self,
        tree: &CodecTree,
        entry: &MapEntryNode,
    ) -> Result<TypedObject, CodecError> {
        if entry.name != self.qname {
            return Err(CodecError::IncorrectNesting(format!(
                "entry {} is not an entry of {}",
                entry.name, self.qname
            )));
        }
        let mut builder = self.decode_into(tree, &entry.children)?;
        if let Some(key) = &self.key {
            key.fill_from_predicates(&mut builder, &entry.key)?;
        }
        Ok(builder.build())
    }

    pub fn decode_node(
        &self,
        tree: &CodecTree,
        node: &NormalizedNode,
    ) -> Result<TypedObject, CodecError> {
        match (self.shape, node) {
            (DataObjectShape::ListEntry, NormalizedNode::MapEntry(entry)) if self.key.is_some() => {
                self.decode_entry(tree, entry)
            }
            (DataObjectShape::Container, NormalizedNode::Container(container))
            | (DataObjectShape::ListEntry, NormalizedNode::Container(container))
                if container.name == self.qname && self.key.is_none() =>
            {
                self.decode_children(tree, &container.children)
            }
            (_, other) => Err(CodecError::IncorrectNesting(format!(
                "{} node {} cannot be decoded as {}",
                other.kind(),
                other.name(),
                self.ty
            ))),
        }
    }
}

fn child_codec(tree: &CodecTree, ty: &TypeName, accessor: &Accessor) -> Result<ChildCodec, CodecError> {
    let node = tree.index().schema_node(&accessor.schema).ok_or_else(|| {
        CodecError::mismatch(
            ty,
            format!("accessor '{}' has no schema node at {}", accessor.name, accessor.schema),
        )
    })?;
    let name = accessor.name.clone();
    let qname = node.qname.clone();
    Ok(match (&accessor.target, &node.kind) {
        (AccessorTarget::Value, SchemaNodeKind::Leaf { ty: leaf }) => ChildCodec::Leaf {
            accessor: name,
            qname,
            codec: tree.value_codec(leaf),
        },
        (AccessorTarget::Value, SchemaNodeKind::LeafList { ty: leaf, ordering }) => {
            ChildCodec::LeafList {
                accessor: name,
                qname,
                ordering: *ordering,
                codec: tree.value_codec(leaf),
            }
        }
        (AccessorTarget::Container(target), SchemaNodeKind::Container) => ChildCodec::Container {
            accessor: name,
            qname,
            prototype: tree.prototype(target)?,
        },
        (AccessorTarget::List(target), SchemaNodeKind::List { key, ordering }) => ChildCodec::List {
            accessor: name,
            qname,
            ordering: *ordering,
            keyed: !key.is_empty(),
            prototype: tree.prototype(target)?,
        },
        (AccessorTarget::Choice(target), SchemaNodeKind::Choice) => ChildCodec::Choice {
            accessor: name,
            qname,
            prototype: tree.prototype(target)?,
        },
        (target, kind) => {
            return Err(CodecError::mismatch(
                ty,
                format!(
                    "accessor '{}' ({target:?}) does not fit {} node {}",
                    accessor.name,
                    kind.name(),
                    node.path
                ),
            ))
        }
    })
}

fn key_codec(
    index: &SchemaIndex,
    descriptor: &TypeDescriptor,
    key_names: &[QName],
    children: &[ChildCodec],
) -> Result<ListKeyCodec, CodecError> {
    let ty = descriptor.name();
    let mut components = Vec::with_capacity(key_names.len());
    for name in key_names {
        let leaf = children.iter().find_map(|c| match c {
            ChildCodec::Leaf {
                accessor,
                qname,
                codec,
            } if qname == name => Some((accessor.clone(), qname.clone(), Arc::clone(codec))),
            _ => None,
        });
        components.push(
            leaf.ok_or_else(|| CodecError::mismatch(ty, format!("key leaf {name} has no leaf accessor")))?,
        );
    }
    let extractor: Arc<dyn KeyExtractor> = match index.key_extractor(ty) {
        Some(extractor) => Arc::clone(extractor),
        None => Arc::new(FieldKeyExtractor::new(
            components.iter().map(|(accessor, _, _)| accessor.clone()).collect(),
        )),
    };
    Ok(ListKeyCodec::new(ty.clone(), extractor, components))
}

/// Index every container and list type reachable from `accessors` by one
/// typed-path step, looking through choices and their cases.
fn collect_path_children(
    index: &SchemaIndex,
    owner: &TypeName,
    accessors: &[Accessor],
    choices: &mut Vec<QName>,
    case: Option<&TypeName>,
    visiting: &mut HashSet<TypeName>,
    out: &mut HashMap<TypeName, PathChild>,
) -> Result<(), CodecError> {
    for accessor in accessors {
        let kind = match &accessor.target {
            AccessorTarget::Value => continue,
            AccessorTarget::Container(_) => PathChildKind::Container,
            AccessorTarget::List(_) => {
                let keyed = matches!(
                    index.schema_node(&accessor.schema).map(|n| &n.kind),
                    Some(SchemaNodeKind::List { key, .. }) if !key.is_empty()
                );
                PathChildKind::List { keyed }
            }
            AccessorTarget::Choice(choice) => {
                if !visiting.insert(choice.clone()) {
                    return Err(CodecError::mismatch(
                        owner,
                        format!("choice {choice} contains itself without an intervening container"),
                    ));
                }
                let choice_descriptor = index.descriptor(choice).ok_or_else(|| {
                    CodecError::mismatch(owner, format!("choice {choice} has no type descriptor"))
                })?;
                choices.push(accessor.qname.clone());
                for case_ty in choice_descriptor.cases() {
                    let case_descriptor = index.descriptor(case_ty).ok_or_else(|| {
                        CodecError::mismatch(owner, format!("case {case_ty} has no type descriptor"))
                    })?;
                    collect_path_children(
                        index,
                        owner,
                        case_descriptor.accessors(),
                        choices,
                        Some(case_ty),
                        visiting,
                        out,
                    )?;
                }
                choices.pop();
                visiting.remove(choice);
                continue;
            }
        };
        if let Some(ty) = accessor.target_type() {
            out.entry(ty.clone()).or_insert_with(|| PathChild {
                qname: accessor.qname.clone(),
                choices: choices.clone(),
                case: case.cloned(),
                kind,
            });
        }
    }
    Ok(())
}
