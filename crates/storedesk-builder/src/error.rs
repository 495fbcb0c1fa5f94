//! Builder error types.

use crate::node::NodeId;
use thiserror::Error;

/// Why the editor refused an operation.
///
/// A refused operation leaves the tree as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditRefusal {
    /// The root node cannot be removed or moved.
    #[error("The root node cannot be {0}")]
    RootProtected(&'static str),

    /// Inserting would create a second node with this id.
    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    /// The target node cannot hold children.
    #[error("Node {id} of type '{kind}' is not a container")]
    NotAContainer { id: NodeId, kind: String },

    /// A child index was out of range.
    #[error("Index out of range: from {from}, to {to}, {len} children")]
    IndexOutOfRange { from: usize, to: usize, len: usize },

    /// The destination lies inside the node being moved.
    #[error("Cannot move {0} into its own subtree")]
    MoveIntoSelf(NodeId),
}

/// Errors loading or validating page trees.
#[derive(Error, Debug)]
pub enum BuilderError {
    /// The document is not a valid node tree.
    #[error("Invalid page JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two nodes share an id.
    #[error("Duplicate node id in page: {0}")]
    DuplicateId(NodeId),

    /// The top node is not a page root.
    #[error("Page root must have id '{expected}', found '{found}'")]
    InvalidRoot { expected: String, found: String },
}
