//! # Stencil Editor
//!
//! Document editing engine for email templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup ⇄ element tree, rule table   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: command reducer + history           │
//! │  - Placement resolution and scaffolding     │
//! │  - Path-copying tree edits                  │
//! │  - Bounded undo/redo                        │
//! │  - Clipboard, import/export, save payloads  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ pipeline: external render compiler boundary │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: markup and previews are derived views
//! 2. **Pure transitions**: `(state, command) -> state`, no I/O in the reducer
//! 3. **Structural sharing**: snapshots share every subtree an edit did not touch
//! 4. **Fail closed**: a rejected command leaves the state exactly as it was
//!
//! ## Usage
//!
//! ```rust
//! use stencil_editor::{Command, Document};
//! use stencil_parser::{tags, ElementNode};
//!
//! let mut doc = Document::new("welcome");
//!
//! // A text dropped straight onto the body gets a section and column
//! doc.dispatch(Command::Add {
//!     node: ElementNode::new(tags::TEXT).with_content("Hello"),
//!     parent_id: None,
//!     index: None,
//! })?;
//!
//! assert!(doc.export_markup().contains("<mj-column"));
//!
//! doc.undo()?;
//! assert!(doc.state().body().unwrap().children.is_empty());
//! # Ok::<(), stencil_editor::EditorError>(())
//! ```

mod clipboard;
mod document;
mod errors;
pub mod mutations;
mod pipeline;
mod placement;
mod state;
mod undo_stack;

pub use clipboard::{clone_with_fresh_ids, Clipboard};
pub use document::{validate_markup, Document, EditorAction, ImportError, ImportReport, SavePayload};
pub use errors::EditorError;
pub use pipeline::{CompileError, CompileOutput, CompileTicket, Pipeline, PipelineResult, Preview, RenderCompiler};
pub use placement::{
    check_cycle, sibling_position, Placement, PlacementError, PlacementResolver, ResolvedMove,
    ResolvedPlacement,
};
pub use state::{Command, HistoryState, Reducer, DEFAULT_HISTORY_LIMIT};
pub use undo_stack::UndoStack;

// Re-export common types for convenience
pub use stencil_parser::{ElementId, ElementNode, NodeRef};
