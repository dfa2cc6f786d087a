//! Error types for the editor
//!
//! Every error is recovered at the command boundary: a failed command leaves
//! the document exactly as it was.

use crate::document::ImportError;
use crate::pipeline::CompileError;
use crate::placement::PlacementError;
use stencil_common::IntegrityError;
use stencil_parser::{ElementId, ParseError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Placement rejected: {0}")]
    PlacementRejected(#[from] PlacementError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Import rejected: {0}")]
    Import(#[from] ImportError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Integrity violation: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Node not found: {0}")]
    NodeNotFound(ElementId),

    #[error("Cannot {action} <{tag}>")]
    Protected { action: &'static str, tag: String },

    #[error("Attribute name {key:?} cannot be written as markup")]
    InvalidAttribute { key: String },

    #[error("Clipboard is empty")]
    EmptyClipboard,

    #[error("Nothing is selected")]
    NothingSelected,
}

impl EditorError {
    /// Errors the host should show as a non-blocking notice rather than a failure
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            EditorError::PlacementRejected(_)
                | EditorError::Protected { .. }
                | EditorError::InvalidAttribute { .. }
                | EditorError::EmptyClipboard
                | EditorError::NothingSelected
        )
    }
}
