//! Page document nodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Id of the root node of every page.
pub const ROOT_ID: &str = "root";

/// Node type of the root node.
pub const ROOT_TYPE: &str = "root";

/// Widget properties, keyed by property name.
pub type Props = Map<String, Value>;

/// Identifier of a node, unique within its tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved root id.
    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    /// Generate a fresh widget id.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 9] = rand::thread_rng().gen();
        Self(format!("w_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One widget in a page tree.
///
/// The serialized shape `{id, type, props, children}` is the contract with
/// page storage. Empty `props` and `children` are omitted on write and
/// default on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node of `kind` with a freshly generated id.
    pub fn new(kind: impl Into<String>) -> Self {
        Self::with_id(NodeId::generate(), kind)
    }

    /// Create a node with an explicit id.
    pub fn with_id(id: impl Into<NodeId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// An empty page root.
    pub fn root() -> Self {
        Self::with_id(NodeId::root(), ROOT_TYPE)
    }

    /// Set a property.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Append a child.
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Get a property.
    pub fn get_prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Deep copy with a fresh id on this node and every descendant.
    pub fn with_fresh_ids(&self) -> Self {
        Self {
            id: NodeId::generate(),
            kind: self.kind.clone(),
            props: self.props.clone(),
            children: self.children.iter().map(Node::with_fresh_ids).collect(),
        }
    }

    pub(crate) fn placeholder() -> Self {
        Self {
            id: NodeId::new(String::new()),
            kind: String::new(),
            props: Props::new(),
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let tree = Node::root().child(Node::with_id("h1", "heading").prop("text", "Hello"));
        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "root",
                "type": "root",
                "children": [
                    {"id": "h1", "type": "heading", "props": {"text": "Hello"}}
                ]
            })
        );
        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("w_"));
    }

    #[test]
    fn test_fresh_ids_cover_subtree() {
        let section = Node::with_id("s1", "section").child(Node::with_id("t1", "text"));
        let copy = section.with_fresh_ids();
        assert_ne!(copy.id, section.id);
        assert_ne!(copy.children[0].id, section.children[0].id);
        assert_eq!(copy.children[0].kind, "text");
    }
}
