//! # Stencil Parser
//!
//! The element tree, the structural rule table and the markup codec for
//! email templates.
//!
//! ```text
//! markup text ──parse──▶ Vec<ElementNode> ──serialize──▶ markup text
//!                              │
//!                         RuleTable (allowed children, void/ending tags)
//! ```

pub mod ast;
pub mod error;
pub mod id_generator;
pub mod parser;
pub mod rules;
pub mod serializer;
pub mod tokenizer;

#[cfg(test)]
mod tests_serializer;

pub use ast::{Attributes, ElementId, ElementNode, NodeRef};
pub use error::{format_error, ParseError, ParseResult};
pub use parser::{parse, parse_or_default, Parsed, Parser};
pub use rules::{tags, RuleTable, TagKind, TagSpec};
pub use serializer::{serialize, Serializer};
