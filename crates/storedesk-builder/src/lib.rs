//! Page builder engine for StoreDesk.
//!
//! A storefront page is a tree of widget [`Node`]s. This crate edits that
//! tree in memory: finding, updating, inserting, deleting and reordering
//! nodes, plus a selection-aware [`EditorState`] reducer that the page
//! editor UI drives. Rendering and drag gestures live in the host.
//!
//! # Example
//!
//! ```rust
//! use storedesk_builder::prelude::*;
//!
//! let page = Node::root().child(Node::with_id("h1", "heading"));
//!
//! let page = tree::insert_child(page, "root", Node::with_id("t1", "text")).into_tree();
//! let page = tree::delete_by_id(page, "h1").into_tree();
//! assert_eq!(page.children.len(), 1);
//!
//! // The root survives any delete.
//! let edit = tree::delete_by_id(page, ROOT_ID);
//! assert!(edit.outcome.refusal().is_some());
//! ```

pub mod editor;
pub mod error;
pub mod node;
pub mod registry;
pub mod tree;

pub use editor::{EditorAction, EditorState, EditorTransition};
pub use error::{BuilderError, EditRefusal};
pub use node::{Node, NodeId, Props, ROOT_ID, ROOT_TYPE};
pub use registry::{WidgetRegistry, WidgetSpec};
pub use tree::{EditOutcome, Found, TreeEdit};

/// Parse a page tree from JSON and check it is a well-formed page.
pub fn parse_page(json: &str) -> Result<Node, BuilderError> {
    let tree: Node = serde_json::from_str(json)?;
    tree::validate(&tree)?;
    Ok(tree)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::editor::{EditorAction, EditorState, EditorTransition};
    pub use crate::error::{BuilderError, EditRefusal};
    pub use crate::node::{Node, NodeId, Props, ROOT_ID};
    pub use crate::registry::{WidgetRegistry, WidgetSpec};
    pub use crate::tree::{self, EditOutcome, TreeEdit};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        let page = parse_page(r#"{"id":"root","type":"root","children":[{"id":"h1","type":"heading"}]}"#)
            .unwrap();
        assert_eq!(page.children[0].id, "h1");
    }

    #[test]
    fn test_parse_page_rejects_duplicates() {
        let json = r#"{"id":"root","type":"root","children":[{"id":"a","type":"text"},{"id":"a","type":"text"}]}"#;
        assert!(matches!(parse_page(json), Err(BuilderError::DuplicateId(_))));
        assert!(matches!(parse_page("{"), Err(BuilderError::Json(_))));
    }
}
