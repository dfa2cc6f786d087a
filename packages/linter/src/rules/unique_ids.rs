use super::{LintContext, LintRule};
use crate::diagnostic::Diagnostic;
use stencil_common::duplicate_ids;
use stencil_parser::NodeRef;

/// No element id may occur twice
pub struct UniqueIdsRule;

impl LintRule for UniqueIdsRule {
    fn name(&self) -> &'static str {
        "unique-ids"
    }

    fn description(&self) -> &'static str {
        "Element ids must be unique across the document"
    }

    fn check_document(&self, _ctx: &LintContext, forest: &[NodeRef]) -> Vec<Diagnostic> {
        duplicate_ids(forest)
            .into_iter()
            .map(|id| {
                let mut diagnostic =
                    Diagnostic::error(self.name(), format!("Element id {} is used more than once", id));
                diagnostic.node_id = Some(id);
                diagnostic
            })
            .collect()
    }
}
