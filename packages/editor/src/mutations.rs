//! # Tree Edits
//!
//! Path-copying edits on a forest of shared nodes. Each function returns a
//! new forest in which only the nodes on the path from the root to the edit
//! are rebuilt; every other subtree is shared with the input. Attached nodes
//! are never mutated.
//!
//! All functions return `None` when the target id is not in the forest.

use std::sync::Arc;
use stencil_parser::{ElementId, ElementNode, NodeRef};

/// Replace the node `id` by whatever `f` returns (zero or more nodes)
fn splice<F>(forest: &[NodeRef], id: &ElementId, f: &mut Option<F>) -> Option<Vec<NodeRef>>
where
    F: FnOnce(&NodeRef) -> Vec<NodeRef>,
{
    for (index, node) in forest.iter().enumerate() {
        if node.id() == id {
            let f = f.take()?;
            let mut out = Vec::with_capacity(forest.len());
            out.extend(forest[..index].iter().cloned());
            out.extend(f(node));
            out.extend(forest[index + 1..].iter().cloned());
            return Some(out);
        }

        if let Some(children) = splice(&node.children, id, f) {
            let mut out = forest.to_vec();
            out[index] = Arc::new((**node).clone().with_children(children));
            return Some(out);
        }
    }
    None
}

/// Rebuild the node `id` with `edit`
pub fn replace_node<F>(forest: &[NodeRef], id: &ElementId, edit: F) -> Option<Vec<NodeRef>>
where
    F: FnOnce(&ElementNode) -> ElementNode,
{
    splice(forest, id, &mut Some(|node: &NodeRef| vec![Arc::new(edit(node))]))
}

/// Detach `id` with its subtree, returning the new forest and the detached node
pub fn remove_node(forest: &[NodeRef], id: &ElementId) -> Option<(Vec<NodeRef>, NodeRef)> {
    let mut removed = None;
    let next = splice(
        forest,
        id,
        &mut Some(|node: &NodeRef| {
            removed = Some(node.clone());
            Vec::new()
        }),
    )?;
    removed.map(|node| (next, node))
}

/// Insert `child` under `parent_id`; `index` is clamped to the child count
pub fn insert_child(
    forest: &[NodeRef],
    parent_id: &ElementId,
    index: usize,
    child: NodeRef,
) -> Option<Vec<NodeRef>> {
    replace_node(forest, parent_id, |parent| {
        let mut children = parent.children.clone();
        let index = index.min(children.len());
        children.insert(index, child);
        parent.clone().with_children(children)
    })
}
