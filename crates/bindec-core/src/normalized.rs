//! # Normalized Tree Nodes
//!
//! The generic, schema-agnostic labeled tree. Every node is tagged with a
//! [`QName`]; list entries are additionally tagged with their key.
//!
//! ## Structural Equality
//!
//! - Children of containers, choices and list entries form an unordered set
//!   keyed by child identifier. [`DataChildren`] stores them sorted by
//!   identifier, so derived equality ignores insertion order. Inserting a child
//!   whose identifier is already present replaces it.
//! - [`MapNode`] and [`LeafSetNode`] keep entries in the order they were added.
//!   Equality honors that order only for [`ListOrdering::User`]; system-ordered
//!   collections compare as sets.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::path::{KeyPredicates, PathArgument};
use crate::qname::QName;
use crate::value::NormalizedValue;

/// Whether the order of list entries is significant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListOrdering {
    /// Order is chosen by the system and carries no meaning.
    #[default]
    System,
    /// Order is chosen by the user and must be preserved.
    User,
}

/// A node of a normalized tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NormalizedNode {
    Container(ContainerNode),
    Choice(ChoiceNode),
    Leaf(LeafNode),
    LeafSet(LeafSetNode),
    Map(MapNode),
    MapEntry(MapEntryNode),
    UnkeyedList(UnkeyedListNode),
}

impl NormalizedNode {
    /// The qualified name tagging this node.
    pub fn name(&self) -> &QName {
        match self {
            Self::Container(n) => &n.name,
            Self::Choice(n) => &n.name,
            Self::Leaf(n) => &n.name,
            Self::LeafSet(n) => &n.name,
            Self::Map(n) => &n.name,
            Self::MapEntry(n) => &n.name,
            Self::UnkeyedList(n) => &n.name,
        }
    }

    /// The path argument identifying this node within its parent.
    pub fn identifier(&self) -> PathArgument {
        match self {
            Self::MapEntry(entry) => PathArgument::entry(entry.name.clone(), entry.key.clone()),
            other => PathArgument::node(other.name().clone()),
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::Choice(_) => "choice",
            Self::Leaf(_) => "leaf",
            Self::LeafSet(_) => "leaf-set",
            Self::Map(_) => "map",
            Self::MapEntry(_) => "map-entry",
            Self::UnkeyedList(_) => "unkeyed-list",
        }
    }

    /// Children of a data container node (container, choice or map entry).
    pub fn data_children(&self) -> Option<&DataChildren> {
        match self {
            Self::Container(n) => Some(&n.children),
            Self::Choice(n) => Some(&n.children),
            Self::MapEntry(n) => Some(&n.children),
            _ => None,
        }
    }
}

fn identifier_order(a: &NormalizedNode, b: &NormalizedNode) -> Ordering {
    a.name()
        .cmp(b.name())
        .then_with(|| a.identifier().cmp(&b.identifier()))
}

/// The unordered child set of a data container node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<NormalizedNode>", into = "Vec<NormalizedNode>")]
pub struct DataChildren(Vec<NormalizedNode>);

impl DataChildren {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a child, replacing any child with the same identifier.
    pub fn insert(&mut self, child: NormalizedNode) {
        match self.0.binary_search_by(|probe| identifier_order(probe, &child)) {
            Ok(pos) => self.0[pos] = child,
            Err(pos) => self.0.insert(pos, child),
        }
    }

    /// The child tagged with `name`, if any.
    pub fn get(&self, name: &QName) -> Option<&NormalizedNode> {
        self.0.iter().find(|c| c.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedNode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<NormalizedNode>> for DataChildren {
    fn from(nodes: Vec<NormalizedNode>) -> Self {
        nodes.into_iter().collect()
    }
}

impl From<DataChildren> for Vec<NormalizedNode> {
    fn from(children: DataChildren) -> Self {
        children.0
    }
}

impl FromIterator<NormalizedNode> for DataChildren {
    fn from_iter<T: IntoIterator<Item = NormalizedNode>>(iter: T) -> Self {
        let mut children = Self::new();
        for child in iter {
            children.insert(child);
        }
        children
    }
}

impl Extend<NormalizedNode> for DataChildren {
    fn extend<T: IntoIterator<Item = NormalizedNode>>(&mut self, iter: T) {
        for child in iter {
            self.insert(child);
        }
    }
}

impl<'a> IntoIterator for &'a DataChildren {
    type Item = &'a NormalizedNode;
    type IntoIter = std::slice::Iter<'a, NormalizedNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A container: a named, unordered set of children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerNode {
    pub name: QName,
    #[serde(default)]
    pub children: DataChildren,
}

impl ContainerNode {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            children: DataChildren::new(),
        }
    }

    pub fn with_children(name: QName, children: DataChildren) -> Self {
        Self { name, children }
    }

    pub fn with_child(mut self, child: NormalizedNode) -> Self {
        self.children.insert(child);
        self
    }
}

/// A choice: the children of whichever case is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceNode {
    pub name: QName,
    #[serde(default)]
    pub children: DataChildren,
}

impl ChoiceNode {
    pub fn with_children(name: QName, children: DataChildren) -> Self {
        Self { name, children }
    }
}

/// A single scalar value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafNode {
    pub name: QName,
    pub value: NormalizedValue,
}

impl LeafNode {
    pub fn new(name: QName, value: impl Into<NormalizedValue>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// A keyed list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntryNode {
    pub name: QName,
    pub key: KeyPredicates,
    #[serde(default)]
    pub children: DataChildren,
}

impl MapEntryNode {
    pub fn new(name: QName, key: KeyPredicates) -> Self {
        Self {
            name,
            key,
            children: DataChildren::new(),
        }
    }

    pub fn with_children(name: QName, key: KeyPredicates, children: DataChildren) -> Self {
        Self {
            name,
            key,
            children,
        }
    }

    pub fn with_child(mut self, child: NormalizedNode) -> Self {
        self.children.insert(child);
        self
    }
}

/// A keyed list: entries addressed by their key.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(from = "MapNodeRepr", into = "MapNodeRepr")]
pub struct MapNode {
    pub name: QName,
    pub ordering: ListOrdering,
    entries: Vec<MapEntryNode>,
    positions: HashMap<KeyPredicates, usize>,
}

#[derive(Serialize, Deserialize)]
struct MapNodeRepr {
    name: QName,
    #[serde(default)]
    ordering: ListOrdering,
    entries: Vec<MapEntryNode>,
}

impl MapNode {
    pub fn new(name: QName, ordering: ListOrdering) -> Self {
        Self {
            name,
            ordering,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Add an entry. An entry with an equal key is replaced in place.
    pub fn push(&mut self, entry: MapEntryNode) {
        match self.positions.get(&entry.key) {
            Some(&at) => self.entries[at] = entry,
            None => {
                self.positions.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn with_entry(mut self, entry: MapEntryNode) -> Self {
        self.push(entry);
        self
    }

    pub fn entry(&self, key: &KeyPredicates) -> Option<&MapEntryNode> {
        self.positions.get(key).map(|&at| &self.entries[at])
    }

    /// Entries in the order they were added.
    pub fn entries(&self) -> &[MapEntryNode] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<MapNodeRepr> for MapNode {
    fn from(repr: MapNodeRepr) -> Self {
        let mut map = Self::new(repr.name, repr.ordering);
        for entry in repr.entries {
            map.push(entry);
        }
        map
    }
}

impl From<MapNode> for MapNodeRepr {
    fn from(map: MapNode) -> Self {
        Self {
            name: map.name,
            ordering: map.ordering,
            entries: map.entries,
        }
    }
}

impl PartialEq for MapNode {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name
            || self.ordering != other.ordering
            || self.entries.len() != other.entries.len()
        {
            return false;
        }
        match self.ordering {
            ListOrdering::User => self.entries == other.entries,
            ListOrdering::System => self
                .entries
                .iter()
                .all(|e| other.entry(&e.key).is_some_and(|o| o == e)),
        }
    }
}

/// A list of scalar values.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(from = "LeafSetNodeRepr", into = "LeafSetNodeRepr")]
pub struct LeafSetNode {
    pub name: QName,
    pub ordering: ListOrdering,
    values: Vec<NormalizedValue>,
    seen: HashSet<NormalizedValue>,
}

#[derive(Serialize, Deserialize)]
struct LeafSetNodeRepr {
    name: QName,
    #[serde(default)]
    ordering: ListOrdering,
    values: Vec<NormalizedValue>,
}

impl LeafSetNode {
    pub fn new(name: QName, ordering: ListOrdering) -> Self {
        Self {
            name,
            ordering,
            values: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Add a value. Leaf-sets hold distinct values; a duplicate is ignored.
    pub fn push(&mut self, value: NormalizedValue) {
        if self.seen.insert(value.clone()) {
            self.values.push(value);
        }
    }

    pub fn with_value(mut self, value: impl Into<NormalizedValue>) -> Self {
        self.push(value.into());
        self
    }

    pub fn contains(&self, value: &NormalizedValue) -> bool {
        self.seen.contains(value)
    }

    pub fn values(&self) -> &[NormalizedValue] {
        &self.values
    }
}

impl From<LeafSetNodeRepr> for LeafSetNode {
    fn from(repr: LeafSetNodeRepr) -> Self {
        let mut set = Self::new(repr.name, repr.ordering);
        for value in repr.values {
            set.push(value);
        }
        set
    }
}

impl From<LeafSetNode> for LeafSetNodeRepr {
    fn from(set: LeafSetNode) -> Self {
        Self {
            name: set.name,
            ordering: set.ordering,
            values: set.values,
        }
    }
}

impl PartialEq for LeafSetNode {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name
            || self.ordering != other.ordering
            || self.values.len() != other.values.len()
        {
            return false;
        }
        match self.ordering {
            ListOrdering::User => self.values == other.values,
            ListOrdering::System => self.values.iter().all(|v| other.contains(v)),
        }
    }
}

/// A list without keys: ordered container entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnkeyedListNode {
    pub name: QName,
    #[serde(default)]
    pub entries: Vec<ContainerNode>,
}

impl UnkeyedListNode {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(local: &str) -> QName {
        QName::new("urn:t", local)
    }

    fn leaf(local: &str, v: &str) -> NormalizedNode {
        NormalizedNode::Leaf(LeafNode::new(q(local), v))
    }

    fn entry(id: u64) -> MapEntryNode {
        MapEntryNode::new(q("item"), KeyPredicates::new().with(q("id"), id))
            .with_child(NormalizedNode::Leaf(LeafNode::new(q("id"), id)))
    }

    #[test]
    fn children_equality_ignores_insertion_order() {
        let a = ContainerNode::new(q("c"))
            .with_child(leaf("x", "1"))
            .with_child(leaf("y", "2"));
        let b = ContainerNode::new(q("c"))
            .with_child(leaf("y", "2"))
            .with_child(leaf("x", "1"));
        assert_eq!(a, b);
    }

    #[test]
    fn inserting_same_identifier_replaces() {
        let c = ContainerNode::new(q("c"))
            .with_child(leaf("x", "1"))
            .with_child(leaf("x", "2"));
        assert_eq!(c.children.len(), 1);
        assert_eq!(c.children.get(&q("x")), Some(&leaf("x", "2")));
    }

    #[test]
    fn user_ordered_map_compares_as_sequence() {
        let forward = MapNode::new(q("item"), ListOrdering::User)
            .with_entry(entry(1))
            .with_entry(entry(2));
        let backward = MapNode::new(q("item"), ListOrdering::User)
            .with_entry(entry(2))
            .with_entry(entry(1));
        assert_ne!(forward, backward);
    }

    #[test]
    fn system_ordered_map_compares_as_set() {
        let forward = MapNode::new(q("item"), ListOrdering::System)
            .with_entry(entry(1))
            .with_entry(entry(2));
        let backward = MapNode::new(q("item"), ListOrdering::System)
            .with_entry(entry(2))
            .with_entry(entry(1));
        assert_eq!(forward, backward);
        let keys: Vec<_> = backward.entries().iter().map(|e| e.key.clone()).collect();
        assert_eq!(keys[0], entry(2).key, "insertion order is still retained");
    }

    #[test]
    fn leaf_set_ignores_duplicates() {
        let set = LeafSetNode::new(q("tag"), ListOrdering::System)
            .with_value("a")
            .with_value("a")
            .with_value("b");
        assert_eq!(set.values().len(), 2);
    }

    #[test]
    fn replaced_entry_keeps_its_position() {
        let mut map = MapNode::new(q("item"), ListOrdering::User);
        for id in 0..2000 {
            map.push(entry(id));
        }
        let replacement = entry(7).with_child(leaf("note", "changed"));
        map.push(replacement.clone());
        assert_eq!(map.len(), 2000);
        assert_eq!(map.entries()[7], replacement);
        assert_eq!(map.entry(&entry(1999).key), Some(&entry(1999)));
    }

    #[test]
    fn deserialized_map_collapses_duplicate_keys() {
        let json = serde_json::json!({
            "name": "(urn:t)item",
            "ordering": "system",
            "entries": [
                serde_json::to_value(entry(1)).unwrap(),
                serde_json::to_value(entry(1)).unwrap(),
                serde_json::to_value(entry(2)).unwrap()
            ]
        });
        let parsed: MapNode = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.len(), 2);

        let built = MapNode::new(q("item"), ListOrdering::System)
            .with_entry(entry(2))
            .with_entry(entry(1));
        assert_eq!(parsed, built);
        assert_eq!(built, parsed);
        assert_eq!(serde_json::to_value(&built).unwrap()["entries"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn deserialized_leaf_set_collapses_duplicates() {
        let json = serde_json::json!({
            "name": "(urn:t)tag",
            "values": [
                {"type": "string", "value": "a"},
                {"type": "string", "value": "a"},
                {"type": "string", "value": "b"}
            ]
        });
        let parsed: LeafSetNode = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.ordering, ListOrdering::System);
        assert_eq!(parsed.values().len(), 2);

        let three = LeafSetNode::new(q("tag"), ListOrdering::System)
            .with_value("a")
            .with_value("b")
            .with_value("c");
        let built = LeafSetNode::new(q("tag"), ListOrdering::System)
            .with_value("b")
            .with_value("a");
        assert_eq!(parsed, built);
        assert_ne!(parsed, three);
        assert_ne!(three, parsed);
    }

    #[test]
    fn deserialized_children_are_canonicalized() {
        let a = ContainerNode::new(q("c"))
            .with_child(leaf("x", "1"))
            .with_child(leaf("y", "2"));
        let json = serde_json::json!({
            "name": "(urn:t)c",
            "children": [
                {"kind": "leaf", "name": "(urn:t)y", "value": {"type": "string", "value": "2"}},
                {"kind": "leaf", "name": "(urn:t)x", "value": {"type": "string", "value": "1"}}
            ]
        });
        let b: ContainerNode = serde_json::from_value(json).unwrap();
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any permutation of the same children yields an equal child set.
        #[test]
        fn child_set_is_permutation_invariant(names in prop::collection::btree_set("[a-z]{1,6}", 1..10)) {
            let nodes: Vec<NormalizedNode> = names
                .iter()
                .map(|n| NormalizedNode::Leaf(LeafNode::new(QName::new("urn:p", n.as_str()), n.as_str())))
                .collect();
            let forward: DataChildren = nodes.iter().cloned().collect();
            let backward: DataChildren = nodes.iter().rev().cloned().collect();
            prop_assert_eq!(forward, backward);
        }
    }
}
