//! Manage stored page trees.
//!
//! `page apply` reads a JSON array of operations:
//!
//! ```json
//! [
//!   {"op": "insert", "parent": "root", "type": "section", "id": "hero"},
//!   {"op": "drop", "target": "hero", "type": "heading", "props": {"text": "Summer sale"}},
//!   {"op": "set", "id": "hero", "key": "background", "value": "#fff"},
//!   {"op": "reorder", "parent": "root", "from": 0, "to": 1},
//!   {"op": "move", "id": "hero", "parent": "footer"},
//!   {"op": "duplicate", "id": "hero"},
//!   {"op": "delete", "id": "hero"}
//! ]
//! ```

use std::fs;

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storedesk_builder::prelude::*;
use storedesk_store::{Document, DocumentStore};

use super::{PageArgs, PageCommand};
use crate::context::Context;
use crate::output::{format_timestamp, status_badge};

/// Run the page command.
pub fn run(args: PageArgs, ctx: &Context) -> Result<()> {
    match args.command {
        PageCommand::Init { page } => init_page(&page, ctx),
        PageCommand::Show { page } => show_page(&page, ctx),
        PageCommand::List => list_pages(ctx),
        PageCommand::Apply { page, ops, dry_run } => apply_ops_file(&page, &ops, dry_run, ctx),
        PageCommand::Delete { page, yes } => delete_page(&page, yes, ctx),
        PageCommand::Widgets => list_widgets(ctx),
    }
}

/// One scripted editor operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PageOp {
    /// Append a new widget to a container.
    Insert {
        parent: NodeId,
        #[serde(flatten)]
        widget: NewWidget,
    },
    /// Drop a new widget onto a node.
    Drop {
        target: NodeId,
        #[serde(flatten)]
        widget: NewWidget,
    },
    Set { id: NodeId, key: String, value: Value },
    Delete { id: NodeId },
    Reorder { parent: NodeId, from: usize, to: usize },
    Move { id: NodeId, parent: NodeId },
    Duplicate { id: NodeId },
}

/// A widget to create from the palette.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWidget {
    #[serde(rename = "type")]
    pub kind: String,
    /// Explicit id; generated when absent.
    #[serde(default)]
    pub id: Option<NodeId>,
    /// Properties layered over the widget defaults.
    #[serde(default)]
    pub props: Props,
}

impl NewWidget {
    fn build(&self, registry: &WidgetRegistry) -> Result<Node> {
        let Some(mut node) = registry.instantiate(&self.kind) else {
            bail!("Unknown widget type: {}", self.kind);
        };
        if let Some(id) = &self.id {
            node.id = id.clone();
        }
        node.props
            .extend(self.props.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(node)
    }
}

impl PageOp {
    fn into_action(self, registry: &WidgetRegistry) -> Result<EditorAction> {
        Ok(match self {
            PageOp::Insert { parent, widget } => EditorAction::InsertChild {
                parent_id: parent,
                node: widget.build(registry)?,
            },
            PageOp::Drop { target, widget } => EditorAction::DropInto {
                target_id: target,
                node: widget.build(registry)?,
            },
            PageOp::Set { id, key, value } => EditorAction::SetProperty { id, key, value },
            PageOp::Delete { id } => EditorAction::Delete(id),
            PageOp::Reorder { parent, from, to } => EditorAction::Reorder {
                parent_id: parent,
                from,
                to,
            },
            PageOp::Move { id, parent } => EditorAction::Move {
                id,
                new_parent_id: parent,
            },
            PageOp::Duplicate { id } => EditorAction::Duplicate(id),
        })
    }
}

/// What one operation did.
#[derive(Debug, Clone, Serialize)]
pub struct OpReport {
    pub op: usize,
    pub action: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Run `ops` through an editor session over `tree`.
///
/// Refused and unmatched operations are reported and skipped; an unknown
/// widget type or an invalid starting tree aborts.
pub fn apply_ops(tree: Node, ops: Vec<PageOp>) -> Result<(Node, Vec<OpReport>)> {
    tree::validate(&tree).context("Page tree is invalid")?;
    let mut state = EditorState::new(tree);
    let mut reports = Vec::with_capacity(ops.len());

    for (index, op) in ops.into_iter().enumerate() {
        let action = op
            .into_action(state.registry())
            .with_context(|| format!("operation {}", index + 1))?;
        let name = action.name();
        let transition = state.apply(action);

        let (status, detail) = match &transition.outcome {
            EditOutcome::Applied => ("applied", None),
            EditOutcome::Unchanged => ("unchanged", None),
            EditOutcome::Refused(refusal) => ("refused", Some(refusal.to_string())),
        };
        reports.push(OpReport {
            op: index + 1,
            action: name,
            status,
            detail,
        });
        state = transition.into_state();
    }

    Ok((state.into_tree(), reports))
}

/// Load a stored page and check its root and id uniqueness.
pub fn load_page(pages: &DocumentStore<Node>, page: &str) -> Result<Document<Node>> {
    let doc = pages.require(page)?;
    tree::validate(&doc.data).with_context(|| format!("Stored page {} is invalid", page))?;
    Ok(doc)
}

fn init_page(page: &str, ctx: &Context) -> Result<()> {
    let pages = ctx.pages()?;
    let doc = pages
        .create(page, Node::root())
        .with_context(|| format!("Failed to create page {}", page))?;

    if ctx.output.is_json() {
        ctx.output.json(&doc);
        return Ok(());
    }
    ctx.output.success(&format!("Created page {}", page));
    Ok(())
}

fn show_page(page: &str, ctx: &Context) -> Result<()> {
    let doc = load_page(&ctx.pages()?, page)?;

    if ctx.output.is_json() {
        ctx.output.json(&doc);
        return Ok(());
    }

    ctx.output.header(&format!("Page {}", page));
    ctx.output.kv("version", &doc.version.to_string());
    ctx.output.kv("updated", &format_timestamp(doc.updated_at));
    ctx.output.kv("nodes", &tree::node_count(&doc.data).to_string());
    ctx.output.kv("depth", &tree::depth(&doc.data).to_string());
    println!();
    ctx.output.tree(&doc.data);
    Ok(())
}

fn list_pages(ctx: &Context) -> Result<()> {
    let pages = ctx.pages()?;
    let mut docs = Vec::new();
    for id in pages.list()? {
        match pages.load(&id) {
            Ok(Some(doc)) => docs.push(doc),
            Ok(None) => {}
            Err(e) => ctx.output.warn(&format!("Skipping {}: {}", id, e)),
        }
    }

    if ctx.output.is_json() {
        let summary: Vec<_> = docs
            .iter()
            .map(|doc| {
                serde_json::json!({
                    "id": doc.id,
                    "version": doc.version,
                    "updated_at": doc.updated_at,
                    "nodes": tree::node_count(&doc.data),
                })
            })
            .collect();
        ctx.output.json(&summary);
        return Ok(());
    }

    if docs.is_empty() {
        ctx.output.info("No pages yet. Create one with `storedesk page init <page>`.");
        return Ok(());
    }

    ctx.output.header("Pages");
    ctx.output
        .table_row(&["PAGE", "VERSION", "NODES", "UPDATED"], &[20, 8, 6, 16]);
    for doc in &docs {
        let version = doc.version.to_string();
        let nodes = tree::node_count(&doc.data).to_string();
        let updated = format_timestamp(doc.updated_at);
        ctx.output.table_row(
            &[doc.id.as_str(), version.as_str(), nodes.as_str(), updated.as_str()],
            &[20, 8, 6, 16],
        );
    }
    Ok(())
}

fn apply_ops_file(page: &str, ops_path: &str, dry_run: bool, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(ops_path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read operations: {}", path.display()))?;
    let ops: Vec<PageOp> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse operations: {}", path.display()))?;

    let pages = ctx.pages()?;
    let doc = load_page(&pages, page)?;
    ctx.output
        .debug(&format!("Applying {} operation(s) to {} v{}", ops.len(), page, doc.version));

    let (tree, reports) = apply_ops(doc.data, ops)?;

    let saved = if dry_run {
        None
    } else {
        Some(
            pages
                .save(page, tree.clone(), doc.version)
                .with_context(|| format!("Failed to save page {}", page))?,
        )
    };

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "page": page,
            "version": saved.as_ref().map(|d| d.version),
            "operations": reports,
            "tree": tree,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Applying to {}", page));
    for report in &reports {
        let mut line = format!(
            "{:>3}. {:<12} {}",
            report.op,
            report.action,
            status_badge(report.status)
        );
        if let Some(detail) = &report.detail {
            line.push_str(&format!(" ({})", detail));
        }
        ctx.output.list_item(&line);
    }
    println!();
    ctx.output.tree(&tree);

    match saved {
        Some(doc) => ctx
            .output
            .success(&format!("Saved {} as version {}", page, doc.version)),
        None => ctx.output.info("Dry run - page not saved"),
    }
    Ok(())
}

fn delete_page(page: &str, yes: bool, ctx: &Context) -> Result<()> {
    let pages = ctx.pages()?;
    if pages.load(page)?.is_none() {
        bail!("Page not found: {}", page);
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete page {}?", page))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Delete cancelled");
            return Ok(());
        }
    }

    pages.delete(page)?;
    ctx.output.success(&format!("Deleted page {}", page));
    Ok(())
}

fn list_widgets(ctx: &Context) -> Result<()> {
    let registry = WidgetRegistry::default();

    if ctx.output.is_json() {
        let widgets: Vec<_> = registry
            .widgets()
            .map(|w| {
                serde_json::json!({
                    "type": w.kind,
                    "label": w.label,
                    "container": w.container,
                    "defaults": w.default_props,
                })
            })
            .collect();
        ctx.output.json(&widgets);
        return Ok(());
    }

    ctx.output.header("Widgets");
    for widget in registry.widgets() {
        let role = if widget.container { "container" } else { "leaf" };
        ctx.output
            .table_row(&[widget.kind.as_str(), widget.label.as_str(), role], &[14, 16, 9]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(json: &str) -> Vec<PageOp> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_apply_builds_a_page() {
        let (tree, reports) = apply_ops(
            Node::root(),
            ops(r#"[
                {"op": "insert", "parent": "root", "type": "section", "id": "hero"},
                {"op": "drop", "target": "hero", "type": "heading", "id": "h1", "props": {"text": "Summer sale"}},
                {"op": "drop", "target": "h1", "type": "button", "id": "cta"},
                {"op": "set", "id": "cta", "key": "label", "value": "Shop"}
            ]"#),
        )
        .unwrap();

        assert!(reports.iter().all(|r| r.status == "applied"));
        let hero = tree::find_by_id(&tree, "hero").unwrap();
        let kids: Vec<_> = hero.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(kids, vec!["h1", "cta"]);

        let heading = tree::find_by_id(&tree, "h1").unwrap();
        assert_eq!(heading.get_prop("text"), Some(&serde_json::json!("Summer sale")));
        assert_eq!(heading.get_prop("level"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_refusals_are_reported() {
        let (tree, reports) = apply_ops(
            Node::root(),
            ops(r#"[
                {"op": "insert", "parent": "root", "type": "text", "id": "t1"},
                {"op": "insert", "parent": "t1", "type": "text", "id": "t2"},
                {"op": "delete", "id": "root"},
                {"op": "delete", "id": "ghost"}
            ]"#),
        )
        .unwrap();

        let statuses: Vec<_> = reports.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec!["applied", "refused", "refused", "unchanged"]);
        assert_eq!(tree::node_count(&tree), 2);
    }

    #[test]
    fn test_invalid_tree_is_not_edited() {
        let duplicated = Node::root()
            .child(Node::with_id("a", "text"))
            .child(Node::with_id("a", "text"));
        let err = apply_ops(
            duplicated,
            ops(r#"[{"op": "set", "id": "a", "key": "x", "value": 1}]"#),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate node id in page: a"));

        let misrooted = Node::with_id("home", "root");
        assert!(apply_ops(misrooted, Vec::new()).is_err());
    }

    #[test]
    fn test_stored_page_with_duplicate_ids_is_refused() {
        let pages: DocumentStore<Node> =
            DocumentStore::new(storedesk_store::Store::open_memory(), "page");
        pages.create("home", Node::root().child(Node::with_id("a", "text"))).unwrap();
        pages
            .create(
                "broken",
                Node::root()
                    .child(Node::with_id("a", "text"))
                    .child(Node::with_id("a", "button")),
            )
            .unwrap();

        assert_eq!(load_page(&pages, "home").unwrap().version, 1);
        let err = load_page(&pages, "broken").unwrap_err();
        assert!(format!("{:#}", err).contains("Stored page broken is invalid"));
    }

    #[test]
    fn test_unknown_widget_aborts() {
        let err = apply_ops(
            Node::root(),
            ops(r#"[{"op": "insert", "parent": "root", "type": "carousel"}]"#),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("carousel"));
    }
}
