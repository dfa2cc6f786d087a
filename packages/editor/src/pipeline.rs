//! # Render Pipeline
//!
//! Boundary between the document and the external markup compiler.
//!
//! The compiler may finish out of order relative to edits. Each compile
//! request gets a ticket carrying a monotonically increasing generation;
//! a result is applied only when it is newer than the last applied one
//! (last-write-wins). A failed compile keeps the previous preview and
//! records the error next to it. Compilation never touches the tree.
//!
//! ```text
//! begin() ──▶ CompileTicket{gen}  ──(compiler, any thread)──▶  complete(ticket, result)
//!                                                                   │
//!                                         gen <= applied ──▶ Stale  │
//!                                         Ok(output)     ──▶ Applied, preview replaced
//!                                         Err(e)         ──▶ Failed, preview kept
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The external markup to render-form compiler
pub trait RenderCompiler {
    fn compile(&self, markup: &str) -> Result<CompileOutput, CompileError>;
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompileOutput {
    pub html: String,
    /// Non-fatal messages reported by the compiler
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Compiler reported errors: {0}")]
    Failed(String),

    #[error("Compiler unavailable: {0}")]
    Unavailable(String),
}

/// A pending compile request
#[derive(Debug, Clone, PartialEq)]
pub struct CompileTicket {
    pub generation: u64,
    /// Snapshot of the markup at request time
    pub markup: String,
}

/// The last successfully rendered output
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub generation: u64,
    pub output: CompileOutput,
}

/// What `complete` did with a result
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineResult {
    Applied,
    Failed(CompileError),
    /// A newer result was already applied; this one was discarded
    Stale,
}

/// Last-write-wins tracker for compiled previews
#[derive(Debug, Default)]
pub struct Pipeline {
    issued: u64,
    applied: u64,
    preview: Option<Preview>,
    last_error: Option<CompileError>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for the current markup
    pub fn begin(&mut self, markup: impl Into<String>) -> CompileTicket {
        self.issued += 1;
        CompileTicket {
            generation: self.issued,
            markup: markup.into(),
        }
    }

    /// Offer a compile result for `ticket`
    pub fn complete(
        &mut self,
        ticket: &CompileTicket,
        result: Result<CompileOutput, CompileError>,
    ) -> PipelineResult {
        if ticket.generation <= self.applied {
            tracing::debug!(
                generation = ticket.generation,
                applied = self.applied,
                "discarding stale compile result"
            );
            return PipelineResult::Stale;
        }
        self.applied = ticket.generation;

        match result {
            Ok(output) => {
                for warning in &output.warnings {
                    tracing::warn!(generation = ticket.generation, %warning, "compiler warning");
                }
                self.preview = Some(Preview {
                    generation: ticket.generation,
                    output,
                });
                self.last_error = None;
                PipelineResult::Applied
            }
            Err(err) => {
                tracing::warn!(generation = ticket.generation, %err, "compile failed, keeping previous preview");
                self.last_error = Some(err.clone());
                PipelineResult::Failed(err)
            }
        }
    }

    /// Compile synchronously: begin, compile, complete
    pub fn compile_now<C: RenderCompiler + ?Sized>(
        &mut self,
        compiler: &C,
        markup: impl Into<String>,
    ) -> PipelineResult {
        let ticket = self.begin(markup);
        let result = compiler.compile(&ticket.markup);
        self.complete(&ticket, result)
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn last_error(&self) -> Option<&CompileError> {
        self.last_error.as_ref()
    }

    /// True when the newest issued ticket has been resolved
    pub fn is_current(&self) -> bool {
        self.applied == self.issued
    }
}
