//! # Placement Resolver
//!
//! Decides where a dropped, pasted or moved node may legally go.
//!
//! Checks run in a fixed order:
//!
//! 1. the target parent must exist
//! 2. the target must not be the node itself or one of its descendants
//! 3. the node's tag must be allowed under the parent's tag, and a singleton
//!    tag may not appear twice under one parent
//! 4. for new nodes only, when (3) fails and scaffolding is enabled, the
//!    shortest chain of scaffold containers leading from the parent tag to
//!    the node tag is synthesized around the node
//! 5. the index is clamped to `[0, child_count]`

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stencil_parser::ast::{find_node, find_parent};
use stencil_parser::{ElementId, ElementNode, NodeRef, RuleTable};
use thiserror::Error;

use crate::mutations::remove_node;

/// A concrete insertion point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub parent_id: ElementId,
    pub index: usize,
}

impl Placement {
    pub fn new(parent_id: ElementId, index: usize) -> Self {
        Self { parent_id, index }
    }

    /// After the parent's last child
    pub fn append(parent_id: ElementId) -> Self {
        Self::new(parent_id, usize::MAX)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("Target parent {0} does not exist")]
    ParentNotFound(ElementId),

    #[error("Node {0} does not exist")]
    NodeNotFound(ElementId),

    #[error("Cannot place {node_id} inside itself or its descendant {parent_id}")]
    CycleDetected {
        node_id: ElementId,
        parent_id: ElementId,
    },

    #[error("<{child_tag}> is not allowed inside <{parent_tag}>")]
    NotAllowed { parent_tag: String, child_tag: String },

    #[error("<{parent_tag}> already has a <{tag}>")]
    SingletonTaken { parent_tag: String, tag: String },
}

/// Outcome of a successful insert resolution
#[derive(Debug, Clone)]
pub struct ResolvedPlacement {
    /// Clamped insertion point
    pub placement: Placement,
    /// The node to insert: either the requested node or the outermost
    /// synthesized container wrapping it
    pub node: NodeRef,
    /// Synthesized container tags, outermost first
    pub scaffolded: Vec<&'static str>,
}

/// Outcome of a successful move resolution
#[derive(Debug, Clone)]
pub struct ResolvedMove {
    pub placement: Placement,
    /// The detached node, ids unchanged
    pub node: NodeRef,
    /// The forest with the node removed; `placement` refers to this forest
    pub remaining: Vec<NodeRef>,
}

#[derive(Debug, Clone, Copy)]
pub struct PlacementResolver {
    rules: &'static RuleTable,
    scaffolding: bool,
}

impl PlacementResolver {
    pub fn new(rules: &'static RuleTable) -> Self {
        Self {
            rules,
            scaffolding: true,
        }
    }

    pub fn with_scaffolding(mut self, scaffolding: bool) -> Self {
        self.scaffolding = scaffolding;
        self
    }

    pub fn scaffolding(&self) -> bool {
        self.scaffolding
    }

    /// Resolve where a new node goes
    pub fn resolve_insert(
        &self,
        forest: &[NodeRef],
        node: NodeRef,
        requested: Placement,
    ) -> Result<ResolvedPlacement, PlacementError> {
        let parent = find_node(forest, &requested.parent_id)
            .ok_or_else(|| PlacementError::ParentNotFound(requested.parent_id.clone()))?;
        check_cycle(&node, &requested.parent_id)?;

        let placement = clamp(&requested, parent);
        match self.check_tag(parent, &node.tag) {
            Ok(()) => Ok(ResolvedPlacement {
                placement,
                node,
                scaffolded: Vec::new(),
            }),
            Err(PlacementError::NotAllowed { .. }) if self.scaffolding => {
                let Some(chain) = self.scaffold_chain(&parent.tag, &node.tag) else {
                    return Err(not_allowed(parent, &node.tag));
                };
                tracing::debug!(parent = %parent.tag, child = %node.tag, ?chain, "scaffolding placement");

                let wrapped = chain.iter().rev().fold(node, |inner, tag| {
                    Arc::new(self.rules.instantiate(tag).with_child(inner))
                });
                Ok(ResolvedPlacement {
                    placement,
                    node: wrapped,
                    scaffolded: chain,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Resolve a relocation of an existing node. The cycle check runs on the
    /// tree as it is; the legality checks run on the tree with the node
    /// detached. Moves never scaffold.
    pub fn resolve_move(
        &self,
        forest: &[NodeRef],
        node_id: &ElementId,
        requested: Placement,
    ) -> Result<ResolvedMove, PlacementError> {
        let node = find_node(forest, node_id)
            .ok_or_else(|| PlacementError::NodeNotFound(node_id.clone()))?;
        if find_node(forest, &requested.parent_id).is_none() {
            return Err(PlacementError::ParentNotFound(requested.parent_id));
        }
        check_cycle(node, &requested.parent_id)?;

        let (remaining, node) =
            remove_node(forest, node_id).ok_or_else(|| PlacementError::NodeNotFound(node_id.clone()))?;
        let parent = find_node(&remaining, &requested.parent_id)
            .ok_or_else(|| PlacementError::ParentNotFound(requested.parent_id.clone()))?;
        self.check_tag(parent, &node.tag)?;

        let placement = clamp(&requested, parent);
        Ok(ResolvedMove {
            placement,
            node,
            remaining,
        })
    }

    fn check_tag(&self, parent: &ElementNode, tag: &str) -> Result<(), PlacementError> {
        if !self.rules.can_contain(&parent.tag, tag) {
            return Err(not_allowed(parent, tag));
        }
        if self.rules.is_singleton(tag) && parent.children.iter().any(|child| child.is(tag)) {
            return Err(PlacementError::SingletonTaken {
                parent_tag: parent.tag.clone(),
                tag: tag.to_string(),
            });
        }
        Ok(())
    }

    /// Shortest chain of scaffold tags `[s1, .., sk]` with
    /// `parent > s1 > .. > sk > tag` all allowed
    fn scaffold_chain(&self, parent: &str, tag: &str) -> Option<Vec<&'static str>> {
        let mut queue: VecDeque<Vec<&'static str>> = VecDeque::new();
        let mut visited = HashSet::new();

        for candidate in self.scaffold_children(parent) {
            if visited.insert(candidate) {
                queue.push_back(vec![candidate]);
            }
        }

        while let Some(chain) = queue.pop_front() {
            let last = chain[chain.len() - 1];
            if self.rules.can_contain(last, tag) {
                return Some(chain);
            }
            for candidate in self.scaffold_children(last) {
                if visited.insert(candidate) {
                    let mut next = chain.clone();
                    next.push(candidate);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn scaffold_children<'a>(&'a self, parent: &str) -> impl Iterator<Item = &'static str> + 'a {
        self.rules
            .allowed_children(parent)
            .iter()
            .copied()
            .filter(|tag| self.rules.spec(tag).map(|spec| spec.scaffold).unwrap_or(false))
    }
}

/// Reject placing `node` under `parent_id` when the parent is the node or
/// lies inside it
pub fn check_cycle(node: &ElementNode, parent_id: &ElementId) -> Result<(), PlacementError> {
    if node.contains(parent_id) {
        return Err(PlacementError::CycleDetected {
            node_id: node.id().clone(),
            parent_id: parent_id.clone(),
        });
    }
    Ok(())
}

/// Where a node sits among its siblings, used to anchor pastes and duplicates
pub fn sibling_position(forest: &[NodeRef], id: &ElementId) -> Option<Placement> {
    find_parent(forest, id).map(|(parent, index)| Placement::new(parent.id().clone(), index))
}

fn clamp(requested: &Placement, parent: &ElementNode) -> Placement {
    Placement::new(
        requested.parent_id.clone(),
        requested.index.min(parent.children.len()),
    )
}

fn not_allowed(parent: &ElementNode, tag: &str) -> PlacementError {
    PlacementError::NotAllowed {
        parent_tag: parent.tag.clone(),
        child_tag: tag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_parser::tags;

    struct Fixture {
        forest: Vec<NodeRef>,
        body: ElementId,
        section: ElementId,
        column: ElementId,
    }

    fn fixture() -> Fixture {
        let column = ElementNode::new(tags::COLUMN).with_child(ElementNode::new(tags::TEXT));
        let section = ElementNode::new(tags::SECTION).with_child(column);
        let column_id = section.children[0].id().clone();
        let section_id = section.id().clone();
        let body = ElementNode::new(tags::BODY).with_child(section);
        let body_id = body.id().clone();

        Fixture {
            forest: vec![Arc::new(ElementNode::new(tags::MJML).with_child(body))],
            body: body_id,
            section: section_id,
            column: column_id,
        }
    }

    fn resolver() -> PlacementResolver {
        PlacementResolver::new(RuleTable::standard())
    }

    #[test]
    fn test_legal_insert_clamps_index() {
        let fx = fixture();
        let text = Arc::new(ElementNode::new(tags::TEXT));
        let resolved = resolver()
            .resolve_insert(&fx.forest, text.clone(), Placement::new(fx.column.clone(), 42))
            .unwrap();

        assert_eq!(resolved.placement, Placement::new(fx.column, 1));
        assert!(Arc::ptr_eq(&resolved.node, &text));
        assert!(resolved.scaffolded.is_empty());
    }

    #[test]
    fn test_missing_parent() {
        let fx = fixture();
        let err = resolver()
            .resolve_insert(
                &fx.forest,
                Arc::new(ElementNode::new(tags::TEXT)),
                Placement::append(ElementId::from("ghost")),
            )
            .unwrap_err();
        assert_eq!(err, PlacementError::ParentNotFound(ElementId::from("ghost")));
    }

    #[test]
    fn test_text_under_body_is_scaffolded() {
        let fx = fixture();
        let text = Arc::new(ElementNode::new(tags::TEXT).with_content("Hi"));
        let resolved = resolver()
            .resolve_insert(&fx.forest, text.clone(), Placement::new(fx.body.clone(), 0))
            .unwrap();

        assert_eq!(resolved.scaffolded, vec![tags::SECTION, tags::COLUMN]);
        assert!(resolved.node.is(tags::SECTION));
        assert_eq!(resolved.node.attributes.get("padding"), Some("20px 0"));

        let column = &resolved.node.children[0];
        assert!(column.is(tags::COLUMN));
        assert!(Arc::ptr_eq(&column.children[0], &text));
    }

    #[test]
    fn test_column_under_body_needs_one_section() {
        let fx = fixture();
        let resolved = resolver()
            .resolve_insert(
                &fx.forest,
                Arc::new(ElementNode::new(tags::COLUMN)),
                Placement::append(fx.body),
            )
            .unwrap();
        assert_eq!(resolved.scaffolded, vec![tags::SECTION]);
    }

    #[test]
    fn test_scaffolding_disabled_rejects() {
        let fx = fixture();
        let err = resolver()
            .with_scaffolding(false)
            .resolve_insert(
                &fx.forest,
                Arc::new(ElementNode::new(tags::TEXT)),
                Placement::append(fx.body),
            )
            .unwrap_err();
        assert_eq!(
            err,
            PlacementError::NotAllowed {
                parent_tag: "mj-body".to_string(),
                child_tag: "mj-text".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_tag_cannot_be_scaffolded() {
        let fx = fixture();
        let err = resolver()
            .resolve_insert(
                &fx.forest,
                Arc::new(ElementNode::new("mj-marquee")),
                Placement::append(fx.body),
            )
            .unwrap_err();
        assert!(matches!(err, PlacementError::NotAllowed { .. }));
    }

    #[test]
    fn test_second_body_is_rejected() {
        let fx = fixture();
        let root = fx.forest[0].id().clone();
        let err = resolver()
            .resolve_insert(
                &fx.forest,
                Arc::new(ElementNode::new(tags::BODY)),
                Placement::append(root),
            )
            .unwrap_err();
        assert!(matches!(err, PlacementError::SingletonTaken { .. }));
    }

    #[test]
    fn test_move_into_descendant_is_cycle() {
        let fx = fixture();
        let err = resolver()
            .resolve_move(&fx.forest, &fx.section, Placement::new(fx.column.clone(), 0))
            .unwrap_err();
        assert_eq!(
            err,
            PlacementError::CycleDetected {
                node_id: fx.section.clone(),
                parent_id: fx.column,
            }
        );

        let err = resolver()
            .resolve_move(&fx.forest, &fx.section, Placement::new(fx.section.clone(), 0))
            .unwrap_err();
        assert!(matches!(err, PlacementError::CycleDetected { .. }));
    }

    #[test]
    fn test_move_checks_post_removal_tree() {
        let fx = fixture();
        let resolved = resolver()
            .resolve_move(&fx.forest, &fx.section, Placement::new(fx.body.clone(), 5))
            .unwrap();

        // The section was the body's only child, so the clamped index is 0
        assert_eq!(resolved.placement, Placement::new(fx.body, 0));
        assert_eq!(resolved.node.id(), &fx.section);
        assert!(find_node(&resolved.remaining, &fx.section).is_none());
    }

    #[test]
    fn test_move_never_scaffolds() {
        let fx = fixture();
        let text_id = find_node(&fx.forest, &fx.column).unwrap().children[0].id().clone();
        let err = resolver()
            .resolve_move(&fx.forest, &text_id, Placement::append(fx.body))
            .unwrap_err();
        assert!(matches!(err, PlacementError::NotAllowed { .. }));
    }

    #[test]
    fn test_sibling_position() {
        let fx = fixture();
        assert_eq!(
            sibling_position(&fx.forest, &fx.section),
            Some(Placement::new(fx.body, 0))
        );
        assert_eq!(sibling_position(&fx.forest, fx.forest[0].id()), None);
    }
}
