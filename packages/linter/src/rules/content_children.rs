use super::{LintContext, LintRule};
use crate::diagnostic::Diagnostic;
use stencil_parser::ElementNode;

/// Content on an element that also has children is never written out
pub struct ContentWithChildrenRule;

impl LintRule for ContentWithChildrenRule {
    fn name(&self) -> &'static str {
        "content-with-children"
    }

    fn description(&self) -> &'static str {
        "Elements should not carry both content and children"
    }

    fn check_element(
        &self,
        _ctx: &LintContext,
        element: &ElementNode,
        _parent: Option<&ElementNode>,
    ) -> Vec<Diagnostic> {
        let has_content = element
            .content
            .as_deref()
            .map(|content| !content.trim().is_empty())
            .unwrap_or(false);

        if has_content && !element.children.is_empty() {
            return vec![Diagnostic::warning(
                self.name(),
                format!("<{}> has content and children; the content is dropped on export", element.tag),
            )
            .at(element)
            .with_suggestion("Move the content into a child element")];
        }
        Vec::new()
    }
}
