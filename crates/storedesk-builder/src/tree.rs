//! Operations over a page tree.
//!
//! Every mutating operation consumes the tree and returns a [`TreeEdit`]
//! holding the next tree and an [`EditOutcome`]. Ids that resolve to
//! nothing give [`EditOutcome::Unchanged`] and the tree back untouched.
//!
//! Searches are depth-first, a parent before its children, children in
//! order. Child order only changes through [`reorder`].

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{BuilderError, EditRefusal};
use crate::node::{Node, NodeId, Props, ROOT_ID};

/// What an edit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The tree changed.
    Applied,
    /// Nothing matched; the tree is the input tree.
    Unchanged,
    /// The edit was refused; the tree is the input tree.
    Refused(EditRefusal),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }

    pub fn refusal(&self) -> Option<&EditRefusal> {
        match self {
            EditOutcome::Refused(r) => Some(r),
            _ => None,
        }
    }
}

/// Result of a tree operation.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct TreeEdit {
    pub tree: Node,
    pub outcome: EditOutcome,
}

impl TreeEdit {
    fn applied(tree: Node) -> Self {
        Self {
            tree,
            outcome: EditOutcome::Applied,
        }
    }

    fn unchanged(tree: Node) -> Self {
        Self {
            tree,
            outcome: EditOutcome::Unchanged,
        }
    }

    fn refused(tree: Node, refusal: EditRefusal) -> Self {
        Self {
            tree,
            outcome: EditOutcome::Refused(refusal),
        }
    }

    /// Drop the outcome and keep the tree.
    pub fn into_tree(self) -> Node {
        self.tree
    }
}

/// A node together with where it sits.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Found<'a> {
    pub node: &'a Node,
    /// Immediate parent; `None` for the root.
    pub parent: Option<&'a Node>,
    /// Position among the parent's children; 0 for the root.
    pub index: usize,
}

/// Find a node by id.
pub fn find_by_id<'a>(tree: &'a Node, id: &str) -> Option<&'a Node> {
    if tree.id.as_str() == id {
        return Some(tree);
    }
    tree.children.iter().find_map(|child| find_by_id(child, id))
}

/// Find a node and its parent.
pub fn find_with_parent<'a>(tree: &'a Node, id: &str) -> Option<Found<'a>> {
    if tree.id.as_str() == id {
        return Some(Found {
            node: tree,
            parent: None,
            index: 0,
        });
    }
    find_in_children(tree, id)
}

fn find_in_children<'a>(parent: &'a Node, id: &str) -> Option<Found<'a>> {
    for (index, child) in parent.children.iter().enumerate() {
        if child.id.as_str() == id {
            return Some(Found {
                node: child,
                parent: Some(parent),
                index,
            });
        }
        if let Some(found) = find_in_children(child, id) {
            return Some(found);
        }
    }
    None
}

fn find_mut<'a>(tree: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    if tree.id.as_str() == id {
        return Some(tree);
    }
    tree.children.iter_mut().find_map(|child| find_mut(child, id))
}

/// Whether `id` names `node` or one of its descendants.
pub fn contains(node: &Node, id: &str) -> bool {
    find_by_id(node, id).is_some()
}

/// Replace the node `id` with `updater(node)`.
///
/// Refused if the result reuses an id found elsewhere in the tree, or
/// renames the root.
pub fn update_by_id<F>(mut tree: Node, id: &str, updater: F) -> TreeEdit
where
    F: FnOnce(Node) -> Node,
{
    if !contains(&tree, id) {
        return TreeEdit::unchanged(tree);
    }
    let is_root = tree.id.as_str() == id;
    let others = ids_outside(&tree, id);

    let Some(slot) = find_mut(&mut tree, id) else {
        return TreeEdit::unchanged(tree);
    };
    let original = std::mem::replace(slot, Node::placeholder());
    let updated = updater(original.clone());

    let refusal = if is_root && updated.id != original.id {
        Some(EditRefusal::RootProtected("renamed"))
    } else {
        first_conflict(&updated, &others).map(EditRefusal::DuplicateId)
    };

    match refusal {
        Some(refusal) => {
            *slot = original;
            TreeEdit::refused(tree, refusal)
        }
        None => {
            *slot = updated;
            TreeEdit::applied(tree)
        }
    }
}

/// Merge one property into a node's props; other keys are kept.
pub fn set_property(
    tree: Node,
    id: &str,
    key: impl Into<String>,
    value: serde_json::Value,
) -> TreeEdit {
    let key = key.into();
    update_by_id(tree, id, move |mut node| {
        node.props.insert(key, value);
        node
    })
}

/// Merge several properties into a node's props.
pub fn merge_props(tree: Node, id: &str, props: Props) -> TreeEdit {
    update_by_id(tree, id, move |mut node| {
        node.props.extend(props);
        node
    })
}

/// Remove a node and its subtree. The root is never removed.
pub fn delete_by_id(mut tree: Node, id: &str) -> TreeEdit {
    if tree.id.as_str() == id {
        return TreeEdit::refused(tree, EditRefusal::RootProtected("deleted"));
    }
    match remove_descendant(&mut tree, id) {
        Some(_) => TreeEdit::applied(tree),
        None => TreeEdit::unchanged(tree),
    }
}

fn remove_descendant(parent: &mut Node, id: &str) -> Option<Node> {
    if let Some(index) = parent.children.iter().position(|c| c.id.as_str() == id) {
        return Some(parent.children.remove(index));
    }
    parent
        .children
        .iter_mut()
        .find_map(|child| remove_descendant(child, id))
}

/// Append `node` to the children of `parent_id`.
///
/// This does not look at node types; container rules are applied by the
/// editor.
pub fn insert_child(tree: Node, parent_id: &str, node: Node) -> TreeEdit {
    insert_at(tree, parent_id, usize::MAX, node)
}

/// Insert `node` at `index` among the children of `parent_id`.
///
/// An index past the end appends.
pub fn insert_at(mut tree: Node, parent_id: &str, index: usize, node: Node) -> TreeEdit {
    if !contains(&tree, parent_id) {
        return TreeEdit::unchanged(tree);
    }
    let existing: HashSet<String> = ids(&tree).into_iter().map(|id| id.to_string()).collect();
    if let Some(dup) = first_conflict(&node, &existing) {
        return TreeEdit::refused(tree, EditRefusal::DuplicateId(dup));
    }

    let Some(parent) = find_mut(&mut tree, parent_id) else {
        return TreeEdit::unchanged(tree);
    };
    let index = index.min(parent.children.len());
    parent.children.insert(index, node);
    TreeEdit::applied(tree)
}

/// Move the child at `from` to position `to` among the children of
/// `parent_id`.
pub fn reorder(mut tree: Node, parent_id: &str, from: usize, to: usize) -> TreeEdit {
    let Some(parent) = find_mut(&mut tree, parent_id) else {
        return TreeEdit::unchanged(tree);
    };
    let len = parent.children.len();
    if from >= len || to >= len {
        return TreeEdit::refused(tree, EditRefusal::IndexOutOfRange { from, to, len });
    }
    if from == to {
        return TreeEdit::unchanged(tree);
    }
    let child = parent.children.remove(from);
    parent.children.insert(to, child);
    TreeEdit::applied(tree)
}

/// Move a node under a different parent, appending it there.
///
/// Equivalent to delete then insert. Refused for the root and for
/// destinations inside the moved subtree.
pub fn move_node(mut tree: Node, id: &str, new_parent_id: &str) -> TreeEdit {
    if tree.id.as_str() == id {
        return TreeEdit::refused(tree, EditRefusal::RootProtected("moved"));
    }
    let Some(node) = find_by_id(&tree, id) else {
        return TreeEdit::unchanged(tree);
    };
    if contains(node, new_parent_id) {
        let refusal = EditRefusal::MoveIntoSelf(node.id.clone());
        return TreeEdit::refused(tree, refusal);
    }
    if !contains(&tree, new_parent_id) {
        return TreeEdit::unchanged(tree);
    }

    let Some(node) = remove_descendant(&mut tree, id) else {
        return TreeEdit::unchanged(tree);
    };
    match find_mut(&mut tree, new_parent_id) {
        Some(parent) => parent.children.push(node),
        None => return TreeEdit::unchanged(tree),
    }
    TreeEdit::applied(tree)
}

/// All ids, depth-first, parent before children.
pub fn ids(tree: &Node) -> Vec<&NodeId> {
    let mut out = Vec::new();
    collect_ids(tree, &mut out);
    out
}

fn collect_ids<'a>(node: &'a Node, out: &mut Vec<&'a NodeId>) {
    out.push(&node.id);
    for child in &node.children {
        collect_ids(child, out);
    }
}

/// Ids of every node not inside the subtree rooted at `id`.
fn ids_outside(tree: &Node, id: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        if node.id.as_str() == id {
            continue;
        }
        out.insert(node.id.to_string());
        stack.extend(node.children.iter());
    }
    out
}

/// First id in `node`'s subtree that is in `taken` or repeats within it.
fn first_conflict(node: &Node, taken: &HashSet<String>) -> Option<NodeId> {
    let mut seen = HashSet::new();
    ids(node)
        .into_iter()
        .find(|id| taken.contains(id.as_str()) || !seen.insert(id.as_str()))
        .cloned()
}

/// Number of nodes, root included.
pub fn node_count(tree: &Node) -> usize {
    1 + tree.children.iter().map(node_count).sum::<usize>()
}

/// Length of the longest root-to-leaf path, counted in nodes.
pub fn depth(tree: &Node) -> usize {
    1 + tree.children.iter().map(depth).max().unwrap_or(0)
}

/// Check that a loaded tree is a page: root id reserved, ids unique.
pub fn validate(tree: &Node) -> Result<(), BuilderError> {
    if tree.id.as_str() != ROOT_ID {
        return Err(BuilderError::InvalidRoot {
            expected: ROOT_ID.to_string(),
            found: tree.id.to_string(),
        });
    }
    match first_conflict(tree, &HashSet::new()) {
        Some(dup) => Err(BuilderError::DuplicateId(dup)),
        None => Ok(()),
    }
}
