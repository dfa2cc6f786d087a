mod a11y;
mod content_children;
mod single_body;
mod structure;
mod unique_ids;

pub use a11y::A11yRule;
pub use content_children::ContentWithChildrenRule;
pub use single_body::SingleBodyRule;
pub use structure::StructureRule;
pub use unique_ids::UniqueIdsRule;

use crate::diagnostic::Diagnostic;
use stencil_parser::{ElementNode, NodeRef, RuleTable};

/// Shared inputs for every rule
#[derive(Debug, Clone, Copy)]
pub struct LintContext {
    pub rules: &'static RuleTable,
}

/// Trait for implementing lint rules
pub trait LintRule {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Check the document as a whole
    fn check_document(&self, _ctx: &LintContext, _forest: &[NodeRef]) -> Vec<Diagnostic> {
        Vec::new()
    }

    /// Check a single element; `parent` is `None` for roots
    fn check_element(
        &self,
        _ctx: &LintContext,
        _element: &ElementNode,
        _parent: Option<&ElementNode>,
    ) -> Vec<Diagnostic> {
        Vec::new()
    }
}

/// Registry of all available lint rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn LintRule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(SingleBodyRule),
                Box::new(StructureRule),
                Box::new(UniqueIdsRule),
                Box::new(ContentWithChildrenRule),
                Box::new(A11yRule),
            ],
        }
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        &self.rules
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a custom rule to the registry
    pub fn add_rule(&mut self, rule: Box<dyn LintRule>) {
        self.rules.push(rule);
    }

    /// Drop every rule whose name is listed
    pub fn without(mut self, names: &[&str]) -> Self {
        self.rules.retain(|rule| !names.contains(&rule.name()));
        self
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}
