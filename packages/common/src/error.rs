use serde::{Deserialize, Serialize};
use stencil_parser::ElementId;
use thiserror::Error;

/// A broken document invariant
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntegrityError {
    #[error("Duplicate element id: {0}")]
    DuplicateId(ElementId),

    #[error("<{child_tag}> ({child_id}) is not allowed inside <{parent_tag}>")]
    IllegalChild {
        parent_tag: String,
        child_tag: String,
        child_id: ElementId,
    },

    #[error("<{tag}> appears more than once inside <{parent_tag}>")]
    RepeatedSingleton { parent_tag: String, tag: String },

    #[error("Document has no <mj-body>")]
    MissingBody,

    #[error("Document must have exactly one root element, found {0}")]
    RootCount(usize),
}
