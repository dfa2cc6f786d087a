//! Copy/paste slot and identity-refreshing clones

use std::sync::Arc;
use stencil_parser::{ElementNode, NodeRef};

/// Deep copy of `node` in which every node, descendants included, gets a
/// fresh id. Tag, attributes, content and child order are preserved.
pub fn clone_with_fresh_ids(node: &ElementNode) -> ElementNode {
    let mut copy = ElementNode::new(node.tag.clone())
        .with_attributes(node.attributes.clone())
        .with_children(
            node.children
                .iter()
                .map(|child| Arc::new(clone_with_fresh_ids(child)))
                .collect(),
        );
    copy.content = node.content.clone();
    copy
}

/// Single-slot clipboard holding a node by value
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<NodeRef>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot of `node`. Later edits to the document do not reach
    /// the stored copy since attached nodes are never mutated.
    pub fn copy(&mut self, node: NodeRef) {
        self.slot = Some(node);
    }

    /// A fresh clone of the stored node, so repeated pastes never share ids
    pub fn paste(&self) -> Option<NodeRef> {
        self.slot
            .as_ref()
            .map(|node| Arc::new(clone_with_fresh_ids(node)))
    }

    pub fn peek(&self) -> Option<&NodeRef> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use stencil_parser::tags;

    fn section() -> ElementNode {
        ElementNode::new(tags::SECTION)
            .with_attribute("background-color", "#fff")
            .with_child(
                ElementNode::new(tags::COLUMN)
                    .with_child(ElementNode::new(tags::TEXT).with_content("Hello"))
                    .with_child(ElementNode::new(tags::IMAGE).with_attribute("src", "a.png")),
            )
    }

    #[test]
    fn test_clone_refreshes_every_id() {
        let original = section();
        let copy = clone_with_fresh_ids(&original);

        assert!(copy.structurally_eq(&original));
        assert_ne!(copy.id(), original.id());

        let original_ids: HashSet<_> = original.descendant_ids().into_iter().collect();
        let copy_ids = copy.descendant_ids();
        assert_eq!(copy_ids.len(), original_ids.len());
        assert!(copy_ids.iter().all(|id| !original_ids.contains(id)));

        let unique: HashSet<_> = copy_ids.iter().collect();
        assert_eq!(unique.len(), copy_ids.len());
    }

    #[test]
    fn test_paste_twice_gives_distinct_ids() {
        let mut clipboard = Clipboard::new();
        assert!(clipboard.paste().is_none());

        clipboard.copy(Arc::new(section()));
        let first = clipboard.paste().unwrap();
        let second = clipboard.paste().unwrap();

        assert!(first.structurally_eq(&second));
        assert_ne!(first.id(), second.id());
        assert_ne!(first.id(), clipboard.peek().unwrap().id());
    }

    #[test]
    fn test_clear() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(Arc::new(section()));
        assert!(!clipboard.is_empty());
        clipboard.clear();
        assert!(clipboard.is_empty());
    }
}
