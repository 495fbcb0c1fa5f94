//! Page tree scenarios and invariants.

use std::collections::HashSet;

use proptest::prelude::*;
use storedesk_builder::prelude::*;

fn child_ids(node: &Node) -> Vec<String> {
    node.children.iter().map(|c| c.id.to_string()).collect()
}

fn assert_unique(tree: &Node) -> Result<(), TestCaseError> {
    let ids = tree::ids(tree);
    let unique: HashSet<_> = ids.iter().collect();
    prop_assert_eq!(unique.len(), ids.len());
    Ok(())
}

#[test]
fn insert_then_delete_then_delete_root() {
    let page = Node::root().child(Node::with_id("h1", "heading"));

    let page = tree::insert_child(page, "root", Node::with_id("t1", "text")).into_tree();
    assert_eq!(child_ids(&page), vec!["h1", "t1"]);

    let page = tree::delete_by_id(page, "h1").into_tree();
    assert_eq!(child_ids(&page), vec!["t1"]);

    let before = page.clone();
    let page = tree::delete_by_id(page, "root").into_tree();
    assert_eq!(page, before);
}

#[test]
fn reorder_moves_first_to_third() {
    let page = ["a", "b", "c", "d"]
        .into_iter()
        .fold(Node::root(), |page, id| page.child(Node::with_id(id, "text")));
    let page = tree::reorder(page, "root", 0, 2).into_tree();
    assert_eq!(child_ids(&page), vec!["b", "c", "a", "d"]);
}

#[test]
fn editor_session_builds_a_page() {
    let registry = WidgetRegistry::default();
    let section = registry.instantiate("section").unwrap();
    let section_id = section.id.clone();
    let heading = registry.instantiate("heading").unwrap();
    let heading_id = heading.id.clone();
    let button = registry.instantiate("button").unwrap();

    let state = EditorState::new(Node::root())
        .apply(EditorAction::InsertChild {
            parent_id: NodeId::root(),
            node: section,
        })
        .into_state()
        .apply(EditorAction::DropInto {
            target_id: section_id.clone(),
            node: heading,
        })
        .into_state()
        // Dropped on the heading, so it lands beside it.
        .apply(EditorAction::DropInto {
            target_id: heading_id.clone(),
            node: button,
        })
        .into_state()
        .apply(EditorAction::Select(heading_id.clone()))
        .into_state()
        .apply(EditorAction::SetProperty {
            id: heading_id.clone(),
            key: "text".to_string(),
            value: serde_json::json!("Summer sale"),
        })
        .into_state();

    let section = tree::find_by_id(state.tree(), section_id.as_str()).unwrap();
    assert_eq!(section.children.len(), 2);
    assert_eq!(section.children[0].kind, "heading");
    assert_eq!(section.children[1].kind, "button");

    let selected = state.selected().unwrap();
    assert_eq!(selected.get_prop("text"), Some(&serde_json::json!("Summer sale")));
    assert_eq!(selected.get_prop("level"), Some(&serde_json::json!(2)));

    let json = serde_json::to_string(state.tree()).unwrap();
    let reloaded = storedesk_builder::parse_page(&json).unwrap();
    assert_eq!(&reloaded, state.tree());
}

#[derive(Debug, Clone)]
enum Op {
    Insert { parent: usize, id: u8 },
    Update { target: usize, id: u8 },
    Reorder { parent: usize, from: usize, to: usize },
    Delete { target: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..16usize, 0..24u8).prop_map(|(parent, id)| Op::Insert { parent, id }),
        (0..16usize, 0..24u8).prop_map(|(target, id)| Op::Update { target, id }),
        (0..16usize, 0..4usize, 0..4usize).prop_map(|(parent, from, to)| Op::Reorder {
            parent,
            from,
            to
        }),
        (0..16usize).prop_map(|target| Op::Delete { target }),
    ]
}

/// Pick an existing id by position, wrapping around.
fn pick(tree: &Node, index: usize) -> String {
    let ids = tree::ids(tree);
    ids[index % ids.len()].to_string()
}

fn run(tree: Node, op: &Op) -> Node {
    match op {
        Op::Insert { parent, id } => {
            let parent = pick(&tree, *parent);
            tree::insert_child(tree, &parent, Node::with_id(format!("n{}", id), "section"))
                .into_tree()
        }
        Op::Update { target, id } => {
            let target = pick(&tree, *target);
            let new_id = NodeId::new(format!("n{}", id));
            tree::update_by_id(tree, &target, move |mut node| {
                node.id = new_id;
                node
            })
            .into_tree()
        }
        Op::Reorder { parent, from, to } => {
            let parent = pick(&tree, *parent);
            tree::reorder(tree, &parent, *from, *to).into_tree()
        }
        Op::Delete { target } => {
            let target = pick(&tree, *target);
            tree::delete_by_id(tree, &target).into_tree()
        }
    }
}

proptest! {
    #[test]
    fn ids_stay_unique(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let mut page = Node::root();
        for op in &ops {
            page = run(page, op);
            assert_unique(&page)?;
        }
    }

    #[test]
    fn root_survives_every_delete(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut page = Node::root();
        for op in &ops {
            page = run(page, op);
        }
        let page = tree::delete_by_id(page, ROOT_ID).into_tree();
        prop_assert_eq!(page.id.as_str(), ROOT_ID);
    }

    #[test]
    fn reorder_is_a_permutation(
        len in 1..8usize,
        from in 0..8usize,
        to in 0..8usize,
    ) {
        let page = (0..len).fold(Node::root(), |page, i| {
            page.child(Node::with_id(format!("c{}", i), "text"))
        });
        let before: HashSet<_> = child_ids(&page).into_iter().collect();
        let page = tree::reorder(page, "root", from, to).into_tree();
        let after: HashSet<_> = child_ids(&page).into_iter().collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(page.children.len(), len);
    }
}
