//! Whole-tree invariant checks shared by the editor and the linter

use crate::error::IntegrityError;
use crate::result::CommonResult;
use crate::visitor::for_each_node;
use std::collections::HashSet;
use stencil_parser::ast::{find_body, NodeRef};
use stencil_parser::{tags, ElementId, RuleTable};

/// Ids that occur more than once, in document order of their second use
pub fn duplicate_ids(forest: &[NodeRef]) -> Vec<ElementId> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for_each_node(forest, |node, _| {
        if !seen.insert(node.id().clone()) {
            duplicates.push(node.id().clone());
        }
    });
    duplicates
}

/// Every parent/child pair the rule table does not allow, plus repeated
/// singleton children
pub fn structure_violations(forest: &[NodeRef], rules: &RuleTable) -> Vec<IntegrityError> {
    let mut violations = Vec::new();
    for_each_node(forest, |node, parent| {
        if let Some(parent) = parent {
            if !rules.can_contain(&parent.tag, &node.tag) {
                violations.push(IntegrityError::IllegalChild {
                    parent_tag: parent.tag.clone(),
                    child_tag: node.tag.clone(),
                    child_id: node.id().clone(),
                });
            }
        }

        let mut singletons = HashSet::new();
        for child in &node.children {
            if rules.is_singleton(&child.tag) && !singletons.insert(child.tag.as_str()) {
                violations.push(IntegrityError::RepeatedSingleton {
                    parent_tag: node.tag.clone(),
                    tag: child.tag.clone(),
                });
            }
        }
    });
    violations
}

/// Id uniqueness only
pub fn check_ids(forest: &[NodeRef]) -> CommonResult<()> {
    match duplicate_ids(forest).into_iter().next() {
        Some(id) => Err(IntegrityError::DuplicateId(id)),
        None => Ok(()),
    }
}

/// One `mjml` root holding a `mj-body`
pub fn check_shape(forest: &[NodeRef]) -> CommonResult<()> {
    if forest.len() != 1 {
        return Err(IntegrityError::RootCount(forest.len()));
    }
    if !forest[0].is(tags::MJML) || find_body(forest).is_none() {
        return Err(IntegrityError::MissingBody);
    }
    Ok(())
}

/// Full invariant check: shape, id uniqueness and rule conformance
pub fn check_document(forest: &[NodeRef], rules: &RuleTable) -> CommonResult<()> {
    check_shape(forest)?;
    check_ids(forest)?;
    match structure_violations(forest, rules).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}
