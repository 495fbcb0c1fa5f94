//! Widget palette.
//!
//! Knows which node types may hold children and what properties a freshly
//! dropped widget starts with.

use std::collections::BTreeMap;

use serde_json::json;

use crate::node::{Node, Props, ROOT_TYPE};

/// Description of one widget type.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    /// Node type discriminator.
    pub kind: String,
    /// Human-readable name for the palette.
    pub label: String,
    /// Whether nodes of this type hold children.
    pub container: bool,
    /// Properties a new node starts with.
    pub default_props: Props,
}

impl WidgetSpec {
    /// A leaf widget.
    pub fn leaf(kind: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            label: label.into(),
            container: false,
            default_props: Props::new(),
        }
    }

    /// A widget that holds children.
    pub fn container(kind: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            container: true,
            ..Self::leaf(kind, label)
        }
    }

    /// Add a default property.
    pub fn with_default(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.default_props.insert(key.into(), value);
        self
    }
}

/// Registry of widget types, keyed by node type.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetRegistry {
    widgets: BTreeMap<String, WidgetSpec>,
}

impl WidgetRegistry {
    /// A registry with no widgets besides the page root.
    pub fn empty() -> Self {
        let mut registry = Self {
            widgets: BTreeMap::new(),
        };
        registry.register(WidgetSpec::container(ROOT_TYPE, "Page"));
        registry
    }

    /// Register or replace a widget type.
    pub fn register(&mut self, spec: WidgetSpec) {
        self.widgets.insert(spec.kind.clone(), spec);
    }

    /// Look up a widget type.
    pub fn get(&self, kind: &str) -> Option<&WidgetSpec> {
        self.widgets.get(kind)
    }

    /// Whether nodes of `kind` may hold children. Unknown types may not.
    pub fn is_container(&self, kind: &str) -> bool {
        self.widgets.get(kind).map(|w| w.container).unwrap_or(false)
    }

    /// A new node of `kind` with a fresh id and the default properties.
    pub fn instantiate(&self, kind: &str) -> Option<Node> {
        let spec = self.widgets.get(kind)?;
        let mut node = Node::new(spec.kind.clone());
        node.props = spec.default_props.clone();
        Some(node)
    }

    /// Registered widget types, sorted by type.
    pub fn widgets(&self) -> impl Iterator<Item = &WidgetSpec> {
        self.widgets.values()
    }
}

impl Default for WidgetRegistry {
    /// The storefront palette.
    fn default() -> Self {
        let mut registry = Self::empty();
        for spec in [
            WidgetSpec::container("section", "Section").with_default("padding", json!(16)),
            WidgetSpec::container("container", "Container").with_default("maxWidth", json!(1200)),
            WidgetSpec::container("row", "Row").with_default("gap", json!(8)),
            WidgetSpec::container("column", "Column").with_default("span", json!(1)),
            WidgetSpec::leaf("heading", "Heading")
                .with_default("text", json!("Heading"))
                .with_default("level", json!(2)),
            WidgetSpec::leaf("text", "Text").with_default("text", json!("")),
            WidgetSpec::leaf("button", "Button")
                .with_default("label", json!("Shop now"))
                .with_default("href", json!("/")),
            WidgetSpec::leaf("image", "Image")
                .with_default("src", json!(""))
                .with_default("alt", json!("")),
            WidgetSpec::leaf("product-grid", "Product grid").with_default("columns", json!(4)),
            WidgetSpec::leaf("spacer", "Spacer").with_default("height", json!(24)),
        ] {
            registry.register(spec);
        }
        registry
    }
}
