mod diagnostic;
mod linter;
mod rules;

pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use linter::{lint_document, LintOptions};
pub use rules::{
    A11yRule, ContentWithChildrenRule, LintContext, LintRule, RuleRegistry, SingleBodyRule,
    StructureRule, UniqueIdsRule,
};
