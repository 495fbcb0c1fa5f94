//! Editor session state and its reducer.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::EditRefusal;
use crate::node::{Node, NodeId};
use crate::registry::WidgetRegistry;
use crate::tree::{self, EditOutcome, TreeEdit};

/// An action the page editor UI dispatches.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Select a node; an unknown id clears the selection.
    Select(NodeId),
    /// Clear the selection.
    Deselect,
    /// Merge one property into a node.
    SetProperty {
        id: NodeId,
        key: String,
        value: Value,
    },
    /// Append a node to a container.
    InsertChild { parent_id: NodeId, node: Node },
    /// Drop a node onto a target: into it if it is a container, otherwise
    /// into the target's parent.
    DropInto { target_id: NodeId, node: Node },
    /// Remove a node and its subtree.
    Delete(NodeId),
    /// Move a child within one container.
    Reorder {
        parent_id: NodeId,
        from: usize,
        to: usize,
    },
    /// Move a node into another container.
    Move { id: NodeId, new_parent_id: NodeId },
    /// Copy a node with fresh ids, right after the original.
    Duplicate(NodeId),
    /// Replace the whole tree, e.g. after loading a page.
    Load(Node),
}

impl EditorAction {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            EditorAction::Select(_) => "select",
            EditorAction::Deselect => "deselect",
            EditorAction::SetProperty { .. } => "set_property",
            EditorAction::InsertChild { .. } => "insert_child",
            EditorAction::DropInto { .. } => "drop_into",
            EditorAction::Delete(_) => "delete",
            EditorAction::Reorder { .. } => "reorder",
            EditorAction::Move { .. } => "move",
            EditorAction::Duplicate(_) => "duplicate",
            EditorAction::Load(_) => "load",
        }
    }
}

/// Result of applying an editor action.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct EditorTransition {
    pub state: EditorState,
    pub outcome: EditOutcome,
}

impl EditorTransition {
    /// Drop the outcome and keep the state.
    pub fn into_state(self) -> EditorState {
        self.state
    }
}

/// One editing session: the page tree and what is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    tree: Node,
    selected_id: Option<NodeId>,
    registry: WidgetRegistry,
}

impl EditorState {
    /// Start editing `tree` with the default widget palette.
    pub fn new(tree: Node) -> Self {
        Self::with_registry(tree, WidgetRegistry::default())
    }

    /// Start editing `tree` with a custom palette.
    pub fn with_registry(tree: Node, registry: WidgetRegistry) -> Self {
        Self {
            tree,
            selected_id: None,
            registry,
        }
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    /// Give up the session and keep the tree.
    pub fn into_tree(self) -> Node {
        self.tree
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// The selected id, if it still names a node.
    pub fn selected_id(&self) -> Option<&NodeId> {
        self.selected_id
            .as_ref()
            .filter(|id| tree::contains(&self.tree, id.as_str()))
    }

    /// The selected node, if it still exists.
    pub fn selected(&self) -> Option<&Node> {
        self.selected_id
            .as_ref()
            .and_then(|id| tree::find_by_id(&self.tree, id.as_str()))
    }

    /// Apply one action and return the next state.
    pub fn apply(self, action: EditorAction) -> EditorTransition {
        let name = action.name();
        let transition = match action {
            EditorAction::Select(id) => self.select(id),
            EditorAction::Deselect => {
                let outcome = if self.selected_id.is_some() {
                    EditOutcome::Applied
                } else {
                    EditOutcome::Unchanged
                };
                let mut state = self;
                state.selected_id = None;
                EditorTransition { state, outcome }
            }
            EditorAction::SetProperty { id, key, value } => {
                self.edit_tree(|tree| tree::set_property(tree, id.as_str(), key, value))
            }
            EditorAction::InsertChild { parent_id, node } => self.insert_child(&parent_id, node),
            EditorAction::DropInto { target_id, node } => self.drop_into(&target_id, node),
            EditorAction::Delete(id) => self.delete(&id),
            EditorAction::Reorder {
                parent_id,
                from,
                to,
            } => self.edit_tree(|tree| tree::reorder(tree, parent_id.as_str(), from, to)),
            EditorAction::Move { id, new_parent_id } => self.move_node(&id, &new_parent_id),
            EditorAction::Duplicate(id) => self.duplicate(&id),
            EditorAction::Load(tree) => {
                let mut state = self;
                state.tree = tree;
                state.selected_id = None;
                EditorTransition {
                    state,
                    outcome: EditOutcome::Applied,
                }
            }
        };

        match &transition.outcome {
            EditOutcome::Refused(refusal) => warn!(action = name, %refusal, "editor action refused"),
            outcome => debug!(action = name, ?outcome, "editor transition"),
        }
        transition
    }

    fn select(mut self, id: NodeId) -> EditorTransition {
        let before = self.selected_id.take();
        if tree::contains(&self.tree, id.as_str()) {
            self.selected_id = Some(id);
        }
        let outcome = if before == self.selected_id {
            EditOutcome::Unchanged
        } else {
            EditOutcome::Applied
        };
        EditorTransition {
            state: self,
            outcome,
        }
    }

    fn edit_tree<F>(mut self, edit: F) -> EditorTransition
    where
        F: FnOnce(Node) -> TreeEdit,
    {
        let tree = std::mem::replace(&mut self.tree, Node::placeholder());
        let TreeEdit { tree, outcome } = edit(tree);
        self.tree = tree;
        EditorTransition {
            state: self,
            outcome,
        }
    }

    fn refuse(self, refusal: EditRefusal) -> EditorTransition {
        EditorTransition {
            state: self,
            outcome: EditOutcome::Refused(refusal),
        }
    }

    fn unchanged(self) -> EditorTransition {
        EditorTransition {
            state: self,
            outcome: EditOutcome::Unchanged,
        }
    }

    /// `Ok(())` if `id` is a container, `Err(refusal)` if it is a leaf,
    /// `None` if it does not exist.
    fn check_container(&self, id: &str) -> Option<Result<(), EditRefusal>> {
        let node = tree::find_by_id(&self.tree, id)?;
        if self.registry.is_container(&node.kind) {
            Some(Ok(()))
        } else {
            Some(Err(EditRefusal::NotAContainer {
                id: node.id.clone(),
                kind: node.kind.clone(),
            }))
        }
    }

    fn insert_child(self, parent_id: &NodeId, node: Node) -> EditorTransition {
        match self.check_container(parent_id.as_str()) {
            None => self.unchanged(),
            Some(Err(refusal)) => self.refuse(refusal),
            Some(Ok(())) => self.edit_tree(|tree| tree::insert_child(tree, parent_id.as_str(), node)),
        }
    }

    fn drop_into(self, target_id: &NodeId, node: Node) -> EditorTransition {
        let Some(found) = tree::find_with_parent(&self.tree, target_id.as_str()) else {
            return self.unchanged();
        };
        let parent_id = if self.registry.is_container(&found.node.kind) {
            found.node.id.clone()
        } else {
            match found.parent {
                Some(parent) => parent.id.clone(),
                None => {
                    let refusal = EditRefusal::NotAContainer {
                        id: found.node.id.clone(),
                        kind: found.node.kind.clone(),
                    };
                    return self.refuse(refusal);
                }
            }
        };
        self.insert_child(&parent_id, node)
    }

    fn delete(mut self, id: &NodeId) -> EditorTransition {
        let clears_selection = match (&self.selected_id, tree::find_by_id(&self.tree, id.as_str())) {
            (Some(selected), Some(doomed)) => {
                self.tree.id != *id && tree::contains(doomed, selected.as_str())
            }
            _ => false,
        };
        if clears_selection {
            self.selected_id = None;
        }
        self.edit_tree(|tree| tree::delete_by_id(tree, id.as_str()))
    }

    fn move_node(self, id: &NodeId, new_parent_id: &NodeId) -> EditorTransition {
        match self.check_container(new_parent_id.as_str()) {
            None => self.unchanged(),
            Some(Err(refusal)) => self.refuse(refusal),
            Some(Ok(())) => self.edit_tree(|tree| {
                tree::move_node(tree, id.as_str(), new_parent_id.as_str())
            }),
        }
    }

    fn duplicate(self, id: &NodeId) -> EditorTransition {
        let Some(found) = tree::find_with_parent(&self.tree, id.as_str()) else {
            return self.unchanged();
        };
        let Some(parent) = found.parent else {
            return self.refuse(EditRefusal::RootProtected("duplicated"));
        };
        let copy = found.node.with_fresh_ids();
        let copy_id = copy.id.clone();
        let parent_id = parent.id.clone();
        let index = found.index + 1;

        let mut transition =
            self.edit_tree(|tree| tree::insert_at(tree, parent_id.as_str(), index, copy));
        if transition.outcome.is_applied() {
            transition.state.selected_id = Some(copy_id);
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Node {
        Node::root()
            .child(
                Node::with_id("s1", "section")
                    .child(Node::with_id("h1", "heading"))
                    .child(Node::with_id("t1", "text")),
            )
            .child(Node::with_id("b1", "button"))
    }

    fn editor() -> EditorState {
        EditorState::new(page())
    }

    fn child_ids(node: &Node) -> Vec<String> {
        node.children.iter().map(|c| c.id.to_string()).collect()
    }

    #[test]
    fn test_select_and_deselect() {
        let t = editor().apply(EditorAction::Select(NodeId::new("h1")));
        assert!(t.outcome.is_applied());
        assert_eq!(t.state.selected().unwrap().kind, "heading");

        let t = t.state.apply(EditorAction::Deselect);
        assert!(t.outcome.is_applied());
        assert!(t.state.selected().is_none());
    }

    #[test]
    fn test_select_unknown_deselects() {
        let state = editor()
            .apply(EditorAction::Select(NodeId::new("h1")))
            .into_state()
            .apply(EditorAction::Select(NodeId::new("ghost")))
            .into_state();
        assert!(state.selected_id().is_none());
    }

    #[test]
    fn test_select_root_allowed() {
        let state = editor().apply(EditorAction::Select(NodeId::root())).into_state();
        assert_eq!(state.selected_id(), Some(&NodeId::root()));
    }

    #[test]
    fn test_set_property() {
        let state = editor()
            .apply(EditorAction::SetProperty {
                id: NodeId::new("h1"),
                key: "text".to_string(),
                value: json!("Welcome"),
            })
            .into_state();
        let h1 = tree::find_by_id(state.tree(), "h1").unwrap();
        assert_eq!(h1.get_prop("text"), Some(&json!("Welcome")));
    }

    #[test]
    fn test_insert_into_leaf_refused() {
        let t = editor().apply(EditorAction::InsertChild {
            parent_id: NodeId::new("h1"),
            node: Node::with_id("x", "text"),
        });
        assert!(matches!(
            t.outcome,
            EditOutcome::Refused(EditRefusal::NotAContainer { .. })
        ));
        assert_eq!(t.state.tree(), &page());
    }

    #[test]
    fn test_drop_on_leaf_goes_to_parent() {
        let state = editor()
            .apply(EditorAction::DropInto {
                target_id: NodeId::new("h1"),
                node: Node::with_id("x", "text"),
            })
            .into_state();
        let s1 = tree::find_by_id(state.tree(), "s1").unwrap();
        assert_eq!(child_ids(s1), vec!["h1", "t1", "x"]);
    }

    #[test]
    fn test_drop_on_container_goes_inside() {
        let state = editor()
            .apply(EditorAction::DropInto {
                target_id: NodeId::new("s1"),
                node: Node::with_id("x", "text"),
            })
            .into_state();
        let s1 = tree::find_by_id(state.tree(), "s1").unwrap();
        assert_eq!(s1.children.len(), 3);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let state = editor()
            .apply(EditorAction::Select(NodeId::new("t1")))
            .into_state()
            .apply(EditorAction::Delete(NodeId::new("s1")))
            .into_state();
        assert!(state.selected_id().is_none());
        assert!(tree::find_by_id(state.tree(), "t1").is_none());
    }

    #[test]
    fn test_delete_keeps_unrelated_selection() {
        let state = editor()
            .apply(EditorAction::Select(NodeId::new("b1")))
            .into_state()
            .apply(EditorAction::Delete(NodeId::new("s1")))
            .into_state();
        assert_eq!(state.selected_id(), Some(&NodeId::new("b1")));
    }

    #[test]
    fn test_delete_root_refused() {
        let t = editor()
            .apply(EditorAction::Select(NodeId::root()))
            .into_state()
            .apply(EditorAction::Delete(NodeId::root()));
        assert!(matches!(
            t.outcome,
            EditOutcome::Refused(EditRefusal::RootProtected(_))
        ));
        assert_eq!(t.state.selected_id(), Some(&NodeId::root()));
    }

    #[test]
    fn test_move_to_leaf_refused() {
        let t = editor().apply(EditorAction::Move {
            id: NodeId::new("b1"),
            new_parent_id: NodeId::new("h1"),
        });
        assert!(matches!(
            t.outcome,
            EditOutcome::Refused(EditRefusal::NotAContainer { .. })
        ));
    }

    #[test]
    fn test_move_into_section() {
        let state = editor()
            .apply(EditorAction::Move {
                id: NodeId::new("b1"),
                new_parent_id: NodeId::new("s1"),
            })
            .into_state();
        assert_eq!(child_ids(state.tree()), vec!["s1"]);
    }

    #[test]
    fn test_duplicate_selects_copy() {
        let t = editor().apply(EditorAction::Duplicate(NodeId::new("s1")));
        assert!(t.outcome.is_applied());
        let tree = t.state.tree();
        assert_eq!(tree.children.len(), 3);
        let copy = &tree.children[1];
        assert_eq!(copy.kind, "section");
        assert_ne!(copy.id, "s1");
        assert_eq!(copy.children.len(), 2);
        assert_eq!(t.state.selected_id(), Some(&copy.id));
        assert!(tree::validate(tree).is_ok());
    }

    #[test]
    fn test_duplicate_root_refused() {
        let t = editor().apply(EditorAction::Duplicate(NodeId::root()));
        assert!(matches!(
            t.outcome,
            EditOutcome::Refused(EditRefusal::RootProtected(_))
        ));
    }

    #[test]
    fn test_load_resets_selection() {
        let state = editor()
            .apply(EditorAction::Select(NodeId::new("h1")))
            .into_state()
            .apply(EditorAction::Load(Node::root()))
            .into_state();
        assert!(state.selected_id().is_none());
        assert!(state.tree().children.is_empty());
    }

    #[test]
    fn test_stale_selection_reads_as_none() {
        let mut state = editor()
            .apply(EditorAction::Select(NodeId::new("t1")))
            .into_state();
        // A host replacing the tree through a raw tree edit leaves the id behind.
        state.tree = tree::delete_by_id(state.tree, "t1").into_tree();
        assert!(state.selected().is_none());
        assert!(state.selected_id().is_none());
    }
}
