use crate::id_generator;
use crate::rules::tags;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an attached node. Snapshots share untouched subtrees.
pub type NodeRef = Arc<ElementNode>;

/// Opaque element identifier, unique within a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Allocate a new identifier from the process-wide generator
    pub fn generate() -> Self {
        Self(id_generator::global().new_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Insertion-ordered attribute map
///
/// Keys are unique; setting an existing key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Set a value, returning the previous one if the key existed
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of string attributes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Attributes, A::Error> {
                let mut attributes = Attributes::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    attributes.insert(key, value);
                }
                Ok(attributes)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// A single tagged node of the template tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    /// Always freshly generated, callers never supply identifiers
    #[serde(skip_deserializing, default = "ElementId::generate")]
    id: ElementId,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeRef>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: ElementId::generate(),
            tag: tag.into(),
            attributes: Attributes::new(),
            content: None,
            children: Vec::new(),
        }
    }

    /// The minimal document: `mjml > mj-body`
    pub fn default_document() -> Self {
        ElementNode::new(tags::MJML).with_child(ElementNode::new(tags::BODY))
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<NodeRef>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: Vec<NodeRef>) -> Self {
        self.children = children;
        self
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// True if `id` is this node or any of its descendants
    pub fn contains(&self, id: &ElementId) -> bool {
        self.id == *id || self.children.iter().any(|child| child.contains(id))
    }

    /// Find a strict descendant by id
    pub fn find_descendant(&self, id: &ElementId) -> Option<&NodeRef> {
        find_node(&self.children, id)
    }

    /// Ids of this node and every descendant, depth-first
    pub fn descendant_ids(&self) -> Vec<ElementId> {
        let mut ids = Vec::new();
        collect_ids(self, &mut ids);
        ids
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Equality ignoring ids
    pub fn structurally_eq(&self, other: &ElementNode) -> bool {
        self.tag == other.tag
            && self.attributes == other.attributes
            && self.content == other.content
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.structurally_eq(b))
    }
}

fn collect_ids(node: &ElementNode, ids: &mut Vec<ElementId>) {
    ids.push(node.id.clone());
    for child in &node.children {
        collect_ids(child, ids);
    }
}

/// Depth-first search of a forest
pub fn find_node<'a>(forest: &'a [NodeRef], id: &ElementId) -> Option<&'a NodeRef> {
    for node in forest {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Locate the parent of `id` and its index among the parent's children.
/// Top-level nodes have no parent.
pub fn find_parent<'a>(forest: &'a [NodeRef], id: &ElementId) -> Option<(&'a NodeRef, usize)> {
    for node in forest {
        if let Some(index) = node.children.iter().position(|c| c.id() == id) {
            return Some((node, index));
        }
        if let Some(found) = find_parent(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Child-index path from the forest to `id`
pub fn path_to(forest: &[NodeRef], id: &ElementId) -> Option<Vec<usize>> {
    for (index, node) in forest.iter().enumerate() {
        if node.id() == id {
            return Some(vec![index]);
        }
        if let Some(mut rest) = path_to(&node.children, id) {
            rest.insert(0, index);
            return Some(rest);
        }
    }
    None
}

/// Resolve a child-index path back to a node
pub fn node_at_path<'a>(forest: &'a [NodeRef], path: &[usize]) -> Option<&'a NodeRef> {
    let (first, rest) = path.split_first()?;
    let mut current = forest.get(*first)?;
    for index in rest {
        current = current.children.get(*index)?;
    }
    Some(current)
}

/// The `mj-body` container of a document forest
pub fn find_body(forest: &[NodeRef]) -> Option<&NodeRef> {
    forest
        .iter()
        .filter(|root| root.is(tags::MJML))
        .flat_map(|root| root.children.iter())
        .find(|child| child.is(tags::BODY))
}

/// Structural equality of two forests, ignoring ids
pub fn forests_structurally_eq(a: &[NodeRef], b: &[NodeRef]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structurally_eq(y))
}
