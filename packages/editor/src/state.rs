//! # Edit History State Machine
//!
//! The reducer owning the authoritative tree. Every command is a pure
//! transition `(state, command) -> state`:
//!
//! ```text
//! HistoryState ──reduce(cmd)──▶ Ok(HistoryState')   committed
//!              └──────────────▶ Err(EditorError)    no-op, keep the old state
//! ```
//!
//! Mutating commands push the previous `present` onto `history` and clear
//! `future`. Snapshots share every untouched subtree with their neighbours.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stencil_common::{check_document, check_ids, for_each_node, structure_violations, IntegrityError};
use stencil_parser::ast::{find_body, find_node};
use stencil_parser::tokenizer::is_attribute_name;
use stencil_parser::{tags, Attributes, ElementId, ElementNode, NodeRef, RuleTable};

use crate::errors::EditorError;
use crate::mutations::{insert_child, remove_node, replace_node};
use crate::placement::{Placement, PlacementResolver};
use crate::undo_stack::UndoStack;

/// Default cap on both the undo and the redo stack
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// The editor's full state record
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryState {
    pub present: Vec<NodeRef>,
    pub history: UndoStack<Vec<NodeRef>>,
    pub future: UndoStack<Vec<NodeRef>>,
    pub selection: Option<ElementId>,
}

impl HistoryState {
    pub fn new(present: Vec<NodeRef>, history_limit: usize) -> Self {
        Self {
            present,
            history: UndoStack::with_max_levels(history_limit),
            future: UndoStack::with_max_levels(history_limit),
            selection: None,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn find(&self, id: &ElementId) -> Option<&NodeRef> {
        find_node(&self.present, id)
    }

    pub fn body(&self) -> Option<&NodeRef> {
        find_body(&self.present)
    }

    pub fn selected(&self) -> Option<&NodeRef> {
        self.selection.as_ref().and_then(|id| self.find(id))
    }

    /// Same stacks, new present, with `previous` pushed onto history
    fn committed(&self, present: Vec<NodeRef>, selection: Option<ElementId>) -> Self {
        let mut history = self.history.clone();
        history.push(self.present.clone());
        let mut future = self.future.clone();
        future.clear();

        Self {
            present,
            history,
            future,
            selection,
        }
    }
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::new(
            vec![Arc::new(ElementNode::default_document())],
            DEFAULT_HISTORY_LIMIT,
        )
    }
}

/// Commands accepted by [`Reducer::reduce`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Insert a new node; defaults to the end of `mj-body`
    Add {
        node: ElementNode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<ElementId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    /// Replace a node's attributes and/or content
    Update {
        id: ElementId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<Attributes>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    Move {
        id: ElementId,
        new_parent_id: ElementId,
        new_index: usize,
    },
    Delete {
        id: ElementId,
    },
    Select {
        #[serde(default)]
        id: Option<ElementId>,
    },
    Undo,
    Redo,
    /// Replace the tree and drop all history
    Load {
        nodes: Vec<ElementNode>,
    },
    /// Reset to the default skeleton, undoably
    Clear,
    /// Replace the tree as one undoable step
    Replace {
        nodes: Vec<ElementNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        select_id: Option<ElementId>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Update { .. } => "update",
            Command::Move { .. } => "move",
            Command::Delete { .. } => "delete",
            Command::Select { .. } => "select",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Load { .. } => "load",
            Command::Clear => "clear",
            Command::Replace { .. } => "replace",
        }
    }

    /// Commands that push onto history and clear the redo stack
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Add { .. }
                | Command::Update { .. }
                | Command::Move { .. }
                | Command::Delete { .. }
                | Command::Clear
                | Command::Replace { .. }
        )
    }
}

/// Pure transition function over [`HistoryState`]
#[derive(Debug, Clone, Copy)]
pub struct Reducer {
    rules: &'static RuleTable,
    resolver: PlacementResolver,
    history_limit: usize,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new(RuleTable::standard())
    }
}

impl Reducer {
    pub fn new(rules: &'static RuleTable) -> Self {
        Self {
            rules,
            resolver: PlacementResolver::new(rules),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_scaffolding(mut self, scaffolding: bool) -> Self {
        self.resolver = self.resolver.with_scaffolding(scaffolding);
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn rules(&self) -> &'static RuleTable {
        self.rules
    }

    pub fn resolver(&self) -> &PlacementResolver {
        &self.resolver
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// A fresh state holding `nodes` with empty stacks sized to this reducer
    pub fn initial_state(&self, nodes: Vec<NodeRef>) -> HistoryState {
        HistoryState::new(nodes, self.history_limit)
    }

    pub fn reduce(&self, state: &HistoryState, command: Command) -> Result<HistoryState, EditorError> {
        tracing::debug!(command = command.name(), "reduce");

        let result = match command {
            Command::Add {
                node,
                parent_id,
                index,
            } => self.add(state, Arc::new(node), parent_id, index),
            Command::Update {
                id,
                attributes,
                content,
            } => self.update(state, id, attributes, content),
            Command::Move {
                id,
                new_parent_id,
                new_index,
            } => self.move_node(state, id, Placement::new(new_parent_id, new_index)),
            Command::Delete { id } => self.delete(state, id),
            Command::Select { id } => self.select(state, id),
            Command::Undo => Ok(self.undo(state)),
            Command::Redo => Ok(self.redo(state)),
            Command::Load { nodes } => self.load(state, nodes.into_iter().map(Arc::new).collect()),
            Command::Clear => Ok(state.committed(vec![Arc::new(ElementNode::default_document())], None)),
            Command::Replace { nodes, select_id } => {
                self.replace(state, nodes.into_iter().map(Arc::new).collect(), select_id)
            }
        };

        if let Err(err) = &result {
            if err.is_notice() {
                tracing::warn!(%err, "command rejected");
            } else {
                tracing::debug!(%err, "command failed");
            }
        }
        result
    }

    /// Insert an already-built node, e.g. a pasted or duplicated clone
    pub fn add_node(
        &self,
        state: &HistoryState,
        node: NodeRef,
        placement: Placement,
    ) -> Result<HistoryState, EditorError> {
        self.add(state, node, Some(placement.parent_id), Some(placement.index))
    }

    fn add(
        &self,
        state: &HistoryState,
        node: NodeRef,
        parent_id: Option<ElementId>,
        index: Option<usize>,
    ) -> Result<HistoryState, EditorError> {
        let parent_id = match parent_id {
            Some(id) => id,
            None => state
                .body()
                .map(|body| body.id().clone())
                .ok_or(IntegrityError::MissingBody)?,
        };
        let requested = Placement::new(parent_id, index.unwrap_or(usize::MAX));
        let node_id = node.id().clone();
        let node = prepare(node)?;

        let resolved = self.resolver.resolve_insert(&state.present, node, requested)?;
        // The resolver only places the subtree root
        if let Some(violation) = structure_violations(std::slice::from_ref(&resolved.node), self.rules)
            .into_iter()
            .next()
        {
            return Err(violation.into());
        }
        let next = insert_child(
            &state.present,
            &resolved.placement.parent_id,
            resolved.placement.index,
            resolved.node,
        )
        .ok_or_else(|| EditorError::NodeNotFound(resolved.placement.parent_id.clone()))?;
        check_ids(&next)?;

        Ok(state.committed(next, Some(node_id)))
    }

    fn update(
        &self,
        state: &HistoryState,
        id: ElementId,
        attributes: Option<Attributes>,
        content: Option<String>,
    ) -> Result<HistoryState, EditorError> {
        if let Some(attributes) = &attributes {
            check_attribute_names(attributes)?;
        }
        let next = replace_node(&state.present, &id, |node| {
            let mut node = node.clone();
            if let Some(attributes) = attributes {
                node.attributes = attributes;
            }
            if let Some(content) = content {
                node.content = non_blank(Some(content));
            }
            node
        })
        .ok_or(EditorError::NodeNotFound(id))?;

        Ok(state.committed(next, state.selection.clone()))
    }

    fn move_node(
        &self,
        state: &HistoryState,
        id: ElementId,
        requested: Placement,
    ) -> Result<HistoryState, EditorError> {
        let node = state.find(&id).ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        self.guard("move", node)?;

        let resolved = self.resolver.resolve_move(&state.present, &id, requested)?;
        let next = insert_child(
            &resolved.remaining,
            &resolved.placement.parent_id,
            resolved.placement.index,
            resolved.node,
        )
        .ok_or_else(|| EditorError::NodeNotFound(resolved.placement.parent_id.clone()))?;
        check_ids(&next)?;

        Ok(state.committed(next, Some(id)))
    }

    fn delete(&self, state: &HistoryState, id: ElementId) -> Result<HistoryState, EditorError> {
        let node = state.find(&id).ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        self.guard("delete", node)?;

        let (next, removed) = remove_node(&state.present, &id).ok_or(EditorError::NodeNotFound(id))?;
        let selection = state
            .selection
            .clone()
            .filter(|selected| !removed.contains(selected));

        Ok(state.committed(next, selection))
    }

    fn select(&self, state: &HistoryState, id: Option<ElementId>) -> Result<HistoryState, EditorError> {
        if let Some(id) = &id {
            if state.find(id).is_none() {
                return Err(EditorError::NodeNotFound(id.clone()));
            }
        }
        Ok(HistoryState {
            selection: id,
            ..state.clone()
        })
    }

    fn undo(&self, state: &HistoryState) -> HistoryState {
        let mut next = state.clone();
        if let Some(previous) = next.history.pop() {
            next.future.push(std::mem::replace(&mut next.present, previous));
            next.selection = None;
        }
        next
    }

    fn redo(&self, state: &HistoryState) -> HistoryState {
        let mut next = state.clone();
        if let Some(following) = next.future.pop() {
            next.history.push(std::mem::replace(&mut next.present, following));
            next.selection = None;
        }
        next
    }

    fn load(&self, state: &HistoryState, nodes: Vec<NodeRef>) -> Result<HistoryState, EditorError> {
        let nodes = nodes.into_iter().map(prepare).collect::<Result<Vec<_>, _>>()?;
        check_ids(&nodes)?;
        tracing::info!(roots = nodes.len(), "document loaded");

        let mut next = HistoryState::new(nodes, state.history.max_levels());
        next.future = UndoStack::with_max_levels(state.future.max_levels());
        Ok(next)
    }

    fn replace(
        &self,
        state: &HistoryState,
        nodes: Vec<NodeRef>,
        select_id: Option<ElementId>,
    ) -> Result<HistoryState, EditorError> {
        let nodes = nodes.into_iter().map(prepare).collect::<Result<Vec<_>, _>>()?;
        check_document(&nodes, self.rules)?;
        if let Some(id) = &select_id {
            if find_node(&nodes, id).is_none() {
                return Err(EditorError::NodeNotFound(id.clone()));
            }
        }
        Ok(state.committed(nodes, select_id))
    }

    /// The root and the body stay put
    fn guard(&self, action: &'static str, node: &ElementNode) -> Result<(), EditorError> {
        if node.is(tags::MJML) || node.is(tags::BODY) {
            return Err(EditorError::Protected {
                action,
                tag: node.tag.clone(),
            });
        }
        Ok(())
    }
}

/// Validate attribute names and drop blank content across a subtree about
/// to enter the document, so that exported markup reads back unchanged
fn prepare(node: NodeRef) -> Result<NodeRef, EditorError> {
    let mut invalid = None;
    for_each_node(std::slice::from_ref(&node), |element, _| {
        if invalid.is_none() {
            invalid = first_invalid_name(&element.attributes).map(str::to_string);
        }
    });
    if let Some(key) = invalid {
        return Err(EditorError::InvalidAttribute { key });
    }
    Ok(drop_blank_content(node))
}

fn check_attribute_names(attributes: &Attributes) -> Result<(), EditorError> {
    match first_invalid_name(attributes) {
        Some(key) => Err(EditorError::InvalidAttribute { key: key.to_string() }),
        None => Ok(()),
    }
}

fn first_invalid_name(attributes: &Attributes) -> Option<&str> {
    attributes.iter().map(|(key, _)| key).find(|key| !is_attribute_name(key))
}

/// The parser reads whitespace-only text as no content
fn non_blank(content: Option<String>) -> Option<String> {
    content.filter(|text| !text.trim().is_empty())
}

/// Copies only the nodes that change
fn drop_blank_content(node: NodeRef) -> NodeRef {
    let blank = node.content.as_deref().is_some_and(|text| text.trim().is_empty());
    let children: Vec<NodeRef> = node.children.iter().cloned().map(drop_blank_content).collect();
    let children_changed = children
        .iter()
        .zip(&node.children)
        .any(|(new, old)| !Arc::ptr_eq(new, old));

    if !blank && !children_changed {
        return node;
    }
    let mut copy = ElementNode::clone(&node);
    if blank {
        copy.content = None;
    }
    copy.children = children;
    Arc::new(copy)
}
