//! Replay scripted register sessions.
//!
//! A session file is a JSON object:
//!
//! ```json
//! {
//!   "catalog": [{"id": "p1", "name": "Mug", "unit_price": {"amount_cents": 999, "currency": "USD"}, "available_stock": 3}],
//!   "steps": [
//!     {"action": "add", "product_id": "p1"},
//!     {"action": "view", "view": "paying"},
//!     {"action": "checkout", "payment": {"method": "cash", "tendered": 20.0}},
//!     {"action": "new_sale"}
//!   ]
//! }
//! ```

use std::fs;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use storedesk_commerce::prelude::*;
use tracing::warn;

use super::{PosArgs, PosCommand};
use crate::context::Context;
use crate::output::status_badge;

/// Run the pos command.
pub fn run(args: PosArgs, ctx: &Context) -> Result<()> {
    match args.command {
        PosCommand::Run { session, catalog } => run_session(&session, catalog.as_deref(), ctx),
    }
}

/// A scripted register session.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub catalog: Vec<CatalogProduct>,
    pub steps: Vec<Step>,
}

/// One scripted step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Add { product_id: ProductId },
    Update { product_id: ProductId, quantity: i64 },
    Remove { product_id: ProductId },
    Clear,
    View { view: PosView },
    /// Change catalog stock, then re-read it into the cart.
    Stock { product_id: ProductId, available: i64 },
    Checkout { payment: PaymentStep },
    NewSale,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Add { .. } => "add",
            Step::Update { .. } => "update",
            Step::Remove { .. } => "remove",
            Step::Clear => "clear",
            Step::View { .. } => "view",
            Step::Stock { .. } => "stock",
            Step::Checkout { .. } => "checkout",
            Step::NewSale => "new_sale",
        }
    }
}

/// How a scripted checkout is paid.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentStep {
    /// Cash, with the tendered amount in major units.
    Cash { tendered: f64 },
    Card,
    Other { label: String },
}

impl PaymentStep {
    fn to_payment(&self, currency: Currency) -> Payment {
        match self {
            PaymentStep::Cash { tendered } => Payment::cash(Money::from_decimal(*tendered, currency)),
            PaymentStep::Card => Payment::card(),
            PaymentStep::Other { label } => Payment::other(label.clone()),
        }
    }
}

/// What one step did.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Result of replaying a whole session.
#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub steps: Vec<StepReport>,
    pub cart: CartState,
    pub totals: CartTotals,
    pub orders_placed: usize,
}

/// Replay `session` against a fresh cart.
///
/// Rejected actions and failed checkouts are reported and the replay
/// continues; an unknown product id aborts it.
pub fn replay(
    session: &Session,
    mut catalog: InMemoryCatalog,
    currency: Currency,
    service: &mut SequentialOrderService,
) -> Result<Replay> {
    let mut cart = CartState::new(currency);
    let mut reports = Vec::with_capacity(session.steps.len());

    for (index, step) in session.steps.iter().enumerate() {
        let number = index + 1;
        let mut note = None;
        let transition = match step {
            Step::Add { product_id } => {
                let product = catalog
                    .require(product_id)
                    .with_context(|| format!("step {}", number))?;
                cart.apply(CartAction::AddItem(product))
            }
            Step::Update {
                product_id,
                quantity,
            } => cart.apply(CartAction::UpdateQuantity {
                product_id: product_id.clone(),
                quantity: *quantity,
            }),
            Step::Remove { product_id } => cart.apply(CartAction::RemoveItem(product_id.clone())),
            Step::Clear => cart.apply(CartAction::ClearCart),
            Step::View { view } => {
                let from = cart.view();
                if !from.can_transition_to(*view) {
                    warn!(step = number, from = from.as_str(), to = view.as_str(), "unusual view change");
                    note = Some(format!("unusual flow: {} -> {}", from.as_str(), view.as_str()));
                }
                cart.apply(CartAction::SetView(*view))
            }
            Step::Stock {
                product_id,
                available,
            } => {
                if !catalog.set_stock(product_id, *available) {
                    anyhow::bail!("step {}: product not found: {}", number, product_id);
                }
                cart.refresh_stock(&catalog)
            }
            Step::NewSale => cart.apply(CartAction::StartNewSale),
            Step::Checkout { payment } => {
                let payment = payment.to_payment(currency);
                let (next, report) = match checkout(&cart, &payment, service) {
                    Ok(next) => {
                        let detail = next
                            .last_completed_sale()
                            .map(|sale| format!("order #{}", sale.order_number()));
                        (next, ("applied", detail))
                    }
                    Err(e) => (cart, ("rejected", Some(e.to_string()))),
                };
                cart = next;
                reports.push(StepReport {
                    step: number,
                    action: step.name(),
                    status: report.0,
                    detail: report.1,
                });
                continue;
            }
        };

        let (status, detail) = match &transition.outcome {
            Outcome::Applied => ("applied", note),
            Outcome::Unchanged => ("unchanged", None),
            Outcome::Rejected(rejection) => ("rejected", Some(rejection.to_string())),
        };
        reports.push(StepReport {
            step: number,
            action: step.name(),
            status,
            detail,
        });
        cart = transition.into_state();
    }

    let totals = cart.totals()?;
    Ok(Replay {
        steps: reports,
        cart,
        totals,
        orders_placed: service.placed().len(),
    })
}

fn run_session(session_path: &str, catalog_path: Option<&str>, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(session_path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read session: {}", path.display()))?;
    let session: Session = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session: {}", path.display()))?;

    let catalog = match catalog_path {
        Some(catalog_path) => {
            let path = ctx.resolve_path(catalog_path);
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
            InMemoryCatalog::from_json(&json)
                .with_context(|| format!("Failed to parse catalog: {}", path.display()))?
        }
        None => session.catalog.iter().cloned().collect(),
    };
    ctx.output
        .debug(&format!("{} products, {} steps", catalog.len(), session.steps.len()));

    let currency = ctx.config.currency()?;
    let mut service = SequentialOrderService::new(ctx.config.pos.register.clone(), 1001);
    let result = replay(&session, catalog, currency, &mut service)?;

    if ctx.output.is_json() {
        ctx.output.json(&result);
        return Ok(());
    }

    ctx.output.header(&format!("Session on {}", ctx.config.pos.register));
    for report in &result.steps {
        let mut line = format!(
            "{:>3}. {:<9} {}",
            report.step,
            report.action,
            status_badge(report.status)
        );
        if let Some(detail) = &report.detail {
            line.push_str(&format!(" ({})", detail));
        }
        ctx.output.list_item(&line);
    }

    ctx.output.header("Cart");
    ctx.output.kv("view", result.cart.view().display_name());
    for line in result.cart.lines() {
        let total = line
            .line_total()
            .map(|m| m.display())
            .unwrap_or_else(|| "overflow".to_string());
        let quantity = format!("x{}", line.quantity);
        ctx.output.table_row(
            &[line.product_id.as_str(), line.name.as_str(), quantity.as_str(), total.as_str()],
            &[10, 24, 5, 12],
        );
    }
    ctx.output.kv("items", &result.totals.item_count.to_string());
    ctx.output.kv("subtotal", &result.totals.subtotal.display());
    ctx.output.kv("total", &result.totals.total.display());

    if let Some(sale) = result.cart.last_completed_sale() {
        ctx.output.header("Last sale");
        ctx.output.kv("order", &format!("#{} ({})", sale.order_number(), sale.order_id()));
        ctx.output.kv("paid", &format!("{} by {}", sale.total_amount().display(), sale.payment_type().as_str()));
        if let Some(tendered) = sale.amount_tendered() {
            ctx.output.kv("tendered", &tendered.display());
        }
        if let Some(change) = sale.change_due() {
            ctx.output.kv("change", &change.display());
        }
    }

    ctx.output
        .success(&format!("{} order(s) placed", result.orders_placed));
    Ok(())
}
