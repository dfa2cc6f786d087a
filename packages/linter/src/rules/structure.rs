use super::{LintContext, LintRule};
use crate::diagnostic::Diagnostic;
use stencil_parser::ElementNode;

/// Every element must be a known tag placed under a parent that allows it
pub struct StructureRule;

impl LintRule for StructureRule {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn description(&self) -> &'static str {
        "Elements must be known tags placed where the tag table allows them"
    }

    fn check_element(
        &self,
        ctx: &LintContext,
        element: &ElementNode,
        parent: Option<&ElementNode>,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if !ctx.rules.is_known(&element.tag) {
            diagnostics.push(
                Diagnostic::warning(self.name(), format!("Unknown tag <{}>", element.tag))
                    .at(element),
            );
        }

        if let Some(parent) = parent {
            if ctx.rules.is_known(&parent.tag) && !ctx.rules.can_contain(&parent.tag, &element.tag) {
                let allowed = ctx.rules.allowed_children(&parent.tag);
                let mut diagnostic = Diagnostic::error(
                    self.name(),
                    format!("<{}> is not allowed inside <{}>", element.tag, parent.tag),
                )
                .at(element);
                if !allowed.is_empty() {
                    diagnostic = diagnostic
                        .with_suggestion(format!("<{}> may contain: {}", parent.tag, allowed.join(", ")));
                }
                diagnostics.push(diagnostic);
            }
        }

        diagnostics
    }
}
