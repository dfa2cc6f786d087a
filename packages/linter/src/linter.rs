use crate::diagnostic::Diagnostic;
use crate::rules::{LintContext, RuleRegistry};
use stencil_common::for_each_node;
use stencil_parser::{NodeRef, RuleTable};

/// Options for configuring the linter
#[derive(Debug)]
pub struct LintOptions {
    /// Custom rule registry (uses default if None)
    pub registry: Option<RuleRegistry>,

    /// Structural rules to check against
    pub rules: &'static RuleTable,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            registry: None,
            rules: RuleTable::standard(),
        }
    }
}

/// Lint a template and return diagnostics, most severe first
pub fn lint_document(forest: &[NodeRef], options: LintOptions) -> Vec<Diagnostic> {
    let registry = options.registry.unwrap_or_default();
    let ctx = LintContext {
        rules: options.rules,
    };
    let mut diagnostics = Vec::new();

    for rule in registry.rules() {
        diagnostics.extend(rule.check_document(&ctx, forest));
    }

    for_each_node(forest, |element, parent| {
        for rule in registry.rules() {
            diagnostics.extend(rule.check_element(&ctx, element, parent));
        }
    });

    // Stable, so document order is kept within a level
    diagnostics.sort_by_key(|diagnostic| diagnostic.level);
    diagnostics
}
