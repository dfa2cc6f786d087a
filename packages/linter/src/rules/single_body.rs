use super::{LintContext, LintRule};
use crate::diagnostic::Diagnostic;
use stencil_parser::{tags, NodeRef};

/// A template is a single `mjml` root holding exactly one `mj-body` and at
/// most one `mj-head`
pub struct SingleBodyRule;

impl LintRule for SingleBodyRule {
    fn name(&self) -> &'static str {
        "single-body"
    }

    fn description(&self) -> &'static str {
        "Templates need one <mjml> root with exactly one <mj-body>"
    }

    fn check_document(&self, _ctx: &LintContext, forest: &[NodeRef]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if forest.len() != 1 {
            diagnostics.push(Diagnostic::error(
                self.name(),
                format!("Expected one root element, found {}", forest.len()),
            ));
        }

        let Some(root) = forest.iter().find(|node| node.is(tags::MJML)) else {
            diagnostics.push(
                Diagnostic::error(self.name(), "Template has no <mjml> root")
                    .with_suggestion("Wrap the template in <mjml><mj-body>...</mj-body></mjml>"),
            );
            return diagnostics;
        };

        for tag in [tags::BODY, tags::HEAD] {
            let count = root.children.iter().filter(|child| child.is(tag)).count();
            if tag == tags::BODY && count == 0 {
                diagnostics.push(Diagnostic::error(self.name(), "Template has no <mj-body>").at(root));
            } else if count > 1 {
                diagnostics.push(
                    Diagnostic::error(self.name(), format!("<{}> appears {} times", tag, count)).at(root),
                );
            }
        }

        diagnostics
    }
}
