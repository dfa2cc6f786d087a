use super::{LintContext, LintRule};
use crate::diagnostic::Diagnostic;
use stencil_parser::{tags, ElementNode};

/// Accessibility lint rules
pub struct A11yRule;

impl LintRule for A11yRule {
    fn name(&self) -> &'static str {
        "a11y"
    }

    fn description(&self) -> &'static str {
        "Images need alternative text; buttons and links need a visible label"
    }

    fn check_element(
        &self,
        _ctx: &LintContext,
        element: &ElementNode,
        _parent: Option<&ElementNode>,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        match element.tag.as_str() {
            tags::IMAGE => {
                // An explicit empty alt marks the image as decorative
                if !has_attribute(element, "alt") && !has_attribute(element, "title") {
                    diagnostics.push(
                        Diagnostic::warning(
                            "a11y-image-alt",
                            "Images must have alternative text for screen readers",
                        )
                        .at(element)
                        .with_suggestion(
                            "Add an 'alt' attribute describing the image, or alt=\"\" if it is decorative",
                        ),
                    );
                }
            }
            tags::BUTTON => {
                if !has_text_content(element) && !has_label(element) {
                    diagnostics.push(
                        Diagnostic::warning("a11y-button-text", "Buttons must have accessible text content")
                            .at(element)
                            .with_suggestion("Add text inside the button, or a 'title' attribute"),
                    );
                }
            }
            tags::NAVBAR_LINK | tags::SOCIAL_ELEMENT => {
                if !has_text_content(element) && !has_label(element) {
                    diagnostics.push(
                        Diagnostic::info("a11y-link-text", "Links should have accessible text content")
                            .at(element)
                            .with_suggestion("Add link text, or a 'title' attribute"),
                    );
                }
            }
            _ => {}
        }

        diagnostics
    }
}

fn has_attribute(element: &ElementNode, name: &str) -> bool {
    element.attributes.contains_key(name)
}

fn has_label(element: &ElementNode) -> bool {
    ["title", "aria-label"].iter().any(|name| {
        element
            .attributes
            .get(name)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    })
}

/// Content with something other than whitespace and markup
fn has_text_content(element: &ElementNode) -> bool {
    let Some(content) = element.content.as_deref() else {
        return false;
    };

    let mut in_tag = false;
    for ch in content.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag && !c.is_whitespace() => return true,
            _ => {}
        }
    }
    false
}
