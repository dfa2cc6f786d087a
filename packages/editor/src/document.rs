//! # Document Handle
//!
//! A `Document` is one open template: its history state, the reducer that
//! drives it, a clipboard and a version counter.
//!
//! ## Lifecycle
//!
//! ```text
//! Import → Parse → Load → Edit (commands, keyboard actions) → Export / Save
//!   ↓        ↓       ↓              ↓                            ↓
//! Markup   Nodes  HistoryState  HistoryState'               Markup / SavePayload
//! ```
//!
//! Every operation is all-or-nothing: on `Err` the state is untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stencil_parser::id_generator::get_document_id;
use stencil_parser::{parse_or_default, tags, ElementId, ElementNode, NodeRef, ParseError, Serializer};
use thiserror::Error;

use crate::clipboard::{clone_with_fresh_ids, Clipboard};
use crate::errors::EditorError;
use crate::placement::{sibling_position, Placement};
use crate::state::{Command, HistoryState, Reducer};

/// Reasons imported markup is rejected before parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    #[error("Markup has no <{tag}> element")]
    Missing { tag: &'static str },

    #[error("<{tag}> is opened {opened} time(s) but closed {closed} time(s)")]
    Unbalanced {
        tag: &'static str,
        opened: usize,
        closed: usize,
    },
}

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Set when the markup was malformed and the default skeleton was loaded
    pub warning: Option<ParseError>,
    pub node_count: usize,
}

/// What the persistence collaborator receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub document_id: String,
    pub name: String,
    pub markup: String,
    pub saved_at: DateTime<Utc>,
    pub version: u64,
}

/// Host-level editing actions, typically bound to keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorAction {
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    Delete,
    Duplicate,
}

/// Editable template document
#[derive(Debug)]
pub struct Document {
    pub name: String,

    /// Increments on every committed operation
    pub version: u64,

    state: HistoryState,
    reducer: Reducer,
    clipboard: Clipboard,
    indent: String,
}

impl Document {
    /// An empty `mjml > mj-body` document
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_reducer(name, Reducer::default())
    }

    pub fn with_reducer(name: impl Into<String>, reducer: Reducer) -> Self {
        let state = reducer.initial_state(vec![Arc::new(ElementNode::default_document())]);
        Self {
            name: name.into(),
            version: 0,
            state,
            reducer,
            clipboard: Clipboard::new(),
            indent: "  ".to_string(),
        }
    }

    /// Indentation used by [`Document::export_markup`]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn present(&self) -> &[NodeRef] {
        &self.state.present
    }

    pub fn selection(&self) -> Option<&ElementId> {
        self.state.selection.as_ref()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn reducer(&self) -> &Reducer {
        &self.reducer
    }

    /// Apply a command; on error the document is unchanged
    pub fn dispatch(&mut self, command: Command) -> Result<(), EditorError> {
        let next = self.reducer.reduce(&self.state, command)?;
        self.commit(next);
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), EditorError> {
        self.dispatch(Command::Undo)
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        self.dispatch(Command::Redo)
    }

    pub fn select(&mut self, id: Option<ElementId>) -> Result<(), EditorError> {
        self.dispatch(Command::Select { id })
    }

    pub fn perform(&mut self, action: EditorAction) -> Result<(), EditorError> {
        tracing::debug!(?action, "perform");
        match action {
            EditorAction::Undo => self.undo(),
            EditorAction::Redo => self.redo(),
            EditorAction::Copy => self.copy(),
            EditorAction::Cut => self.cut(),
            EditorAction::Paste => self.paste(),
            EditorAction::Delete => {
                let id = self.selected_id()?;
                self.dispatch(Command::Delete { id })
            }
            EditorAction::Duplicate => {
                let id = self.selected_id()?;
                self.duplicate(&id)
            }
        }
    }

    /// Store the selected node in the clipboard
    pub fn copy(&mut self) -> Result<(), EditorError> {
        let node = self.selected_node()?;
        self.clipboard.copy(node);
        Ok(())
    }

    /// Copy the selected node and delete it as one action
    pub fn cut(&mut self) -> Result<(), EditorError> {
        let node = self.selected_node()?;
        let next = self.reducer.reduce(
            &self.state,
            Command::Delete {
                id: node.id().clone(),
            },
        )?;
        self.clipboard.copy(node);
        self.commit(next);
        Ok(())
    }

    /// Insert a fresh clone of the clipboard node. Targets are tried in
    /// order: inside the selection, right after the selection, the end of
    /// `mj-body`.
    pub fn paste(&mut self) -> Result<(), EditorError> {
        let node = self.clipboard.paste().ok_or(EditorError::EmptyClipboard)?;

        let mut candidates = Vec::new();
        if let Some(selected) = &self.state.selection {
            candidates.push(Placement::append(selected.clone()));
            if let Some(position) = sibling_position(&self.state.present, selected) {
                candidates.push(Placement::new(position.parent_id, position.index + 1));
            }
        }
        if let Some(body) = self.state.body() {
            candidates.push(Placement::append(body.id().clone()));
        }

        let mut last_error = EditorError::NothingSelected;
        for placement in candidates {
            match self.reducer.add_node(&self.state, node.clone(), placement) {
                Ok(next) => {
                    self.commit(next);
                    return Ok(());
                }
                Err(err @ EditorError::PlacementRejected(_)) => last_error = err,
                Err(err) => return Err(err),
            }
        }
        Err(last_error)
    }

    /// Place a fresh clone of `id` right after it among its siblings
    pub fn duplicate(&mut self, id: &ElementId) -> Result<(), EditorError> {
        let node = self
            .state
            .find(id)
            .ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;
        if node.is(tags::MJML) || node.is(tags::BODY) {
            return Err(EditorError::Protected {
                action: "duplicate",
                tag: node.tag.clone(),
            });
        }
        let position =
            sibling_position(&self.state.present, id).ok_or_else(|| EditorError::NodeNotFound(id.clone()))?;

        let copy = Arc::new(clone_with_fresh_ids(node));
        let next = self.reducer.add_node(
            &self.state,
            copy,
            Placement::new(position.parent_id, position.index + 1),
        )?;
        self.commit(next);
        Ok(())
    }

    /// Serialized markup of the present tree
    pub fn export_markup(&self) -> String {
        Serializer::with_indent(&self.indent)
            .with_rules(self.reducer.rules())
            .serialize(&self.state.present)
    }

    /// Replace the document with imported markup. History is dropped.
    /// Malformed markup that passes validation loads the default skeleton
    /// and reports the parse error as a warning.
    pub fn import_markup(&mut self, markup: &str) -> Result<ImportReport, EditorError> {
        validate_markup(markup)?;

        let parsed = parse_or_default(markup);
        let node_count = parsed.nodes.iter().map(|node| node.node_count()).sum();
        self.dispatch(Command::Load { nodes: parsed.nodes })?;
        tracing::info!(name = %self.name, node_count, fallback = parsed.warning.is_some(), "imported markup");

        Ok(ImportReport {
            warning: parsed.warning,
            node_count,
        })
    }

    pub fn save_payload(&self) -> SavePayload {
        SavePayload {
            document_id: get_document_id(&self.name),
            name: self.name.clone(),
            markup: self.export_markup(),
            saved_at: Utc::now(),
            version: self.version,
        }
    }

    fn commit(&mut self, next: HistoryState) {
        self.state = next;
        self.version += 1;
    }

    fn selected_id(&self) -> Result<ElementId, EditorError> {
        self.state.selection.clone().ok_or(EditorError::NothingSelected)
    }

    fn selected_node(&self) -> Result<NodeRef, EditorError> {
        let id = self.selected_id()?;
        self.state
            .find(&id)
            .cloned()
            .ok_or(EditorError::NodeNotFound(id))
    }
}

/// Minimal pre-parse check: `mjml` and `mj-body` must be present and their
/// open and close tags balanced
pub fn validate_markup(markup: &str) -> Result<(), ImportError> {
    for tag in [tags::MJML, tags::BODY] {
        let (opened, closed) = count_tags(markup, tag);
        if opened == 0 {
            return Err(ImportError::Missing { tag });
        }
        if opened != closed {
            return Err(ImportError::Unbalanced { tag, opened, closed });
        }
    }
    Ok(())
}

/// Open and close tag counts for `tag`; a self-closing tag counts as both
fn count_tags(markup: &str, tag: &str) -> (usize, usize) {
    let mut opened = 0;
    let mut closed = 0;
    let mut rest = markup;

    while let Some(start) = rest.find('<') {
        rest = &rest[start + 1..];
        let (closing, name_start) = match rest.strip_prefix('/') {
            Some(after) => (true, after),
            None => (false, rest),
        };
        let Some(after_name) = name_start.strip_prefix(tag) else {
            continue;
        };
        match after_name.chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => {}
            _ => continue,
        }

        if closing {
            closed += 1;
        } else {
            opened += 1;
            let end = after_name.find('>').unwrap_or(after_name.len());
            if after_name[..end].ends_with('/') {
                closed += 1;
            }
        }
    }
    (opened, closed)
}
