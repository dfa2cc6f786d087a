//! Replay a JSON editing script against a template.
//!
//! Nodes are addressed by child-index paths from the root, e.g. `[0, 1, 0]`
//! is the first child of the second child of the root. Paths are resolved
//! against the document as it is when the step runs.
//!
//! ```json
//! [
//!   { "op": "add", "tag": "mj-text", "content": "Hello", "parent": [0, 0] },
//!   { "op": "update", "path": [0, 0, 0, 0, 0], "attributes": { "color": "#333" } },
//!   { "op": "select", "path": [0, 0, 0] },
//!   { "op": "duplicate" },
//!   { "op": "undo" }
//! ]
//! ```

use super::open_document;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use stencil_editor::{Command, Document, EditorAction, EditorError, ElementId, ElementNode};
use stencil_parser::ast::node_at_path;
use stencil_parser::Attributes;
use thiserror::Error;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Template file to edit
    pub input: PathBuf,

    /// JSON file holding the list of steps
    #[arg(short, long)]
    pub script: PathBuf,

    /// Where to write the result (prints to stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop at the first rejected step instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add {
        tag: String,
        #[serde(default)]
        attributes: Option<Attributes>,
        #[serde(default)]
        content: Option<String>,
        /// Defaults to the end of `mj-body`
        #[serde(default)]
        parent: Option<Vec<usize>>,
        #[serde(default)]
        index: Option<usize>,
    },
    Update {
        path: Vec<usize>,
        #[serde(default)]
        attributes: Option<Attributes>,
        #[serde(default)]
        content: Option<String>,
    },
    Move {
        path: Vec<usize>,
        parent: Vec<usize>,
        index: usize,
    },
    Delete {
        #[serde(default)]
        path: Option<Vec<usize>>,
    },
    Select {
        #[serde(default)]
        path: Option<Vec<usize>>,
    },
    Duplicate {
        #[serde(default)]
        path: Option<Vec<usize>>,
    },
    Copy,
    Cut,
    Paste,
    Undo,
    Redo,
    Clear,
}

pub fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut doc = open_document(&args.input, &config)?;

    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read {}", args.script.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid script {}", args.script.display()))?;

    let summary = run_script(&mut doc, steps, args.strict)?;
    let markup = doc.export_markup();

    match &args.output {
        Some(path) => {
            fs::write(path, &markup)?;
            eprintln!(
                "{} Applied {} step(s), skipped {} → {}",
                "✓".green(),
                summary.applied,
                summary.skipped,
                path.display()
            );
        }
        None => print!("{}", markup),
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSummary {
    pub applied: usize,
    pub skipped: usize,
}

/// Run every step; rejected steps are reported and skipped unless `strict`
pub fn run_script(doc: &mut Document, steps: Vec<Step>, strict: bool) -> Result<ScriptSummary> {
    let mut summary = ScriptSummary::default();

    for (number, step) in steps.into_iter().enumerate() {
        match apply_step(doc, step) {
            Ok(()) => summary.applied += 1,
            Err(err) if !strict && is_recoverable(&err) => {
                eprintln!("{} step {}: {}", "⚠️".yellow(), number + 1, err);
                summary.skipped += 1;
            }
            Err(err) => return Err(anyhow!("step {}: {}", number + 1, err)),
        }
    }
    Ok(summary)
}

fn is_recoverable(err: &StepError) -> bool {
    match err {
        StepError::Editor(err) => {
            err.is_notice() || matches!(err, EditorError::NodeNotFound(_) | EditorError::Integrity(_))
        }
        StepError::NoNodeAt(_) => true,
    }
}

#[derive(Error, Debug)]
enum StepError {
    #[error("no element at path {0:?}")]
    NoNodeAt(Vec<usize>),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

fn resolve(doc: &Document, path: &[usize]) -> Result<ElementId, StepError> {
    node_at_path(doc.present(), path)
        .map(|node| node.id().clone())
        .ok_or_else(|| StepError::NoNodeAt(path.to_vec()))
}

/// Select the node at `path` when given, so keyboard actions act on it
fn select_path(doc: &mut Document, path: Option<Vec<usize>>) -> Result<(), StepError> {
    if let Some(path) = path {
        let id = resolve(doc, &path)?;
        doc.select(Some(id))?;
    }
    Ok(())
}

fn apply_step(doc: &mut Document, step: Step) -> Result<(), StepError> {
    tracing::debug!(?step, "applying step");

    match step {
        Step::Add {
            tag,
            attributes,
            content,
            parent,
            index,
        } => {
            let mut node = ElementNode::new(tag).with_attributes(attributes.unwrap_or_default());
            node.content = content;
            let parent_id = parent.map(|path| resolve(doc, &path)).transpose()?;
            doc.dispatch(Command::Add {
                node,
                parent_id,
                index,
            })?;
        }
        Step::Update {
            path,
            attributes,
            content,
        } => {
            let id = resolve(doc, &path)?;
            doc.dispatch(Command::Update {
                id,
                attributes,
                content,
            })?;
        }
        Step::Move {
            path,
            parent,
            index,
        } => {
            let id = resolve(doc, &path)?;
            let new_parent_id = resolve(doc, &parent)?;
            doc.dispatch(Command::Move {
                id,
                new_parent_id,
                new_index: index,
            })?;
        }
        Step::Delete { path } => {
            select_path(doc, path)?;
            doc.perform(EditorAction::Delete)?;
        }
        Step::Select { path } => {
            let id = path.map(|path| resolve(doc, &path)).transpose()?;
            doc.select(id)?;
        }
        Step::Duplicate { path } => {
            select_path(doc, path)?;
            doc.perform(EditorAction::Duplicate)?;
        }
        Step::Copy => doc.perform(EditorAction::Copy)?,
        Step::Cut => doc.perform(EditorAction::Cut)?,
        Step::Paste => doc.perform(EditorAction::Paste)?,
        Step::Undo => doc.perform(EditorAction::Undo)?,
        Step::Redo => doc.perform(EditorAction::Redo)?,
        Step::Clear => doc.dispatch(Command::Clear)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(json: &str) -> Vec<Step> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_compose_script() {
        let mut doc = Document::new("t");
        let summary = run_script(
            &mut doc,
            steps(
                r#"[
                    { "op": "add", "tag": "mj-text", "content": "Hello" },
                    { "op": "update", "path": [0, 0, 0, 0, 0], "attributes": { "color": "red" } },
                    { "op": "select", "path": [0, 0, 0] },
                    { "op": "duplicate" }
                ]"#,
            ),
            true,
        )
        .unwrap();

        assert_eq!(summary, ScriptSummary { applied: 4, skipped: 0 });
        let markup = doc.export_markup();
        assert_eq!(markup.matches("<mj-text color=\"red\">Hello</mj-text>").count(), 2);
    }

    #[test]
    fn test_rejected_steps_are_skipped() {
        let mut doc = Document::new("t");
        let summary = run_script(
            &mut doc,
            steps(
                r#"[
                    { "op": "delete", "path": [0, 0] },
                    { "op": "move", "path": [9, 9], "parent": [0], "index": 0 },
                    { "op": "paste" },
                    { "op": "add", "tag": "mj-section" }
                ]"#,
            ),
            false,
        )
        .unwrap();

        assert_eq!(summary, ScriptSummary { applied: 1, skipped: 3 });
    }

    #[test]
    fn test_strict_stops_at_first_rejection() {
        let mut doc = Document::new("t");
        let result = run_script(
            &mut doc,
            steps(r#"[{ "op": "delete", "path": [0, 0] }, { "op": "add", "tag": "mj-section" }]"#),
            true,
        );
        assert!(result.is_err());
        assert!(doc.state().body().unwrap().children.is_empty());
    }

    #[test]
    fn test_cut_paste_and_undo() {
        let mut doc = Document::new("t");
        run_script(
            &mut doc,
            steps(
                r#"[
                    { "op": "add", "tag": "mj-section", "attributes": { "name": "a" } },
                    { "op": "add", "tag": "mj-section", "attributes": { "name": "b" } },
                    { "op": "select", "path": [0, 0, 0] },
                    { "op": "cut" },
                    { "op": "select", "path": [0, 0, 0] },
                    { "op": "paste" }
                ]"#,
            ),
            true,
        )
        .unwrap();

        let body = doc.state().body().unwrap();
        let names: Vec<_> = body
            .children
            .iter()
            .map(|section| section.attributes.get("name").unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["b", "a"]);

        run_script(&mut doc, steps(r#"[{ "op": "undo" }, { "op": "undo" }]"#), true).unwrap();
        assert_eq!(doc.state().body().unwrap().children.len(), 2);
    }

    #[test]
    fn test_step_errors_read_as_messages() {
        let mut doc = Document::new("t");
        let err = run_script(&mut doc, steps(r#"[{ "op": "select", "path": [4, 2] }]"#), true).unwrap_err();
        assert_eq!(err.to_string(), "step 1: no element at path [4, 2]");

        let err = run_script(&mut doc, steps(r#"[{ "op": "paste" }]"#), true).unwrap_err();
        assert_eq!(err.to_string(), format!("step 1: {}", EditorError::EmptyClipboard));
    }

    #[test]
    fn test_scaffolded_add_and_invalid_attribute() {
        let mut doc = Document::new("t");
        let summary = run_script(
            &mut doc,
            steps(
                r#"[
                    { "op": "add", "tag": "mj-section" },
                    { "op": "add", "tag": "mj-text", "parent": [0, 0, 0], "index": 0 },
                    { "op": "add", "tag": "mj-section", "attributes": { "2x": "1" } }
                ]"#,
            ),
            false,
        )
        .unwrap();

        assert_eq!(summary.applied, 2);
        assert_eq!(summary.skipped, 1);
        let section = node_at_path(doc.present(), &[0, 0, 0]).unwrap();
        assert!(section.children[0].is("mj-column"));
        assert!(section.children[0].children[0].is("mj-text"));
        assert!(!doc.export_markup().contains("2x"));
    }
}
