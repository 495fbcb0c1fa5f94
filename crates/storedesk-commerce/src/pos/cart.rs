//! Register cart state and its reducer.
//!
//! A [`CartState`] is only changed through [`CartState::apply`], which
//! consumes the current state and returns the next one together with an
//! [`Outcome`]. Rejected and no-op actions hand back the input state
//! unchanged, so a host that ignores the outcome still sees the
//! "nothing happened" contract.

use crate::catalog::{Catalog, CatalogProduct, ProductStatus};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use crate::pos::{CartTotals, PosView, SaleSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One product in the active sale.
///
/// Invariant: `1 <= quantity <= available_stock`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    /// Product being sold. Unique within a cart.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Price per unit at the time the line was created.
    pub unit_price: Money,
    /// Units in the cart.
    pub quantity: i64,
    /// Units the catalog reported as sellable.
    pub available_stock: i64,
}

impl CartLine {
    fn from_product(product: &CatalogProduct) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            quantity: 1,
            available_stock: product.available_stock,
        }
    }

    /// `unit_price * quantity`, or None on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// An action the register UI dispatches against the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add one unit of a product.
    AddItem(CatalogProduct),
    /// Set a line's quantity; zero or less removes the line.
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    /// Drop a line.
    RemoveItem(ProductId),
    /// Empty the line set, leaving view and last sale alone.
    ClearCart,
    /// Switch screens.
    SetView(PosView),
    /// Remember the sale that just completed.
    RecordSale(SaleSnapshot),
    /// Clear the cart and last sale and go back to product selection.
    StartNewSale,
}

impl CartAction {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            CartAction::AddItem(_) => "add_item",
            CartAction::UpdateQuantity { .. } => "update_quantity",
            CartAction::RemoveItem(_) => "remove_item",
            CartAction::ClearCart => "clear_cart",
            CartAction::SetView(_) => "set_view",
            CartAction::RecordSale(_) => "record_sale",
            CartAction::StartNewSale => "start_new_sale",
        }
    }
}

/// Why an action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CartRejection {
    /// The catalog does not offer the product for sale.
    NotSellable {
        product_id: ProductId,
        status: ProductStatus,
    },
    /// The requested quantity exceeds available stock.
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },
    /// The product is priced in another currency than the cart.
    CurrencyMismatch { expected: Currency, got: Currency },
    /// The line total would overflow.
    Overflow { product_id: ProductId },
}

impl std::fmt::Display for CartRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartRejection::NotSellable { product_id, status } => {
                write!(f, "{} is {} and cannot be sold", product_id, status.as_str())
            }
            CartRejection::OutOfStock {
                product_id,
                requested,
                available,
            } => write!(
                f,
                "not enough stock for {}: requested {}, available {}",
                product_id, requested, available
            ),
            CartRejection::CurrencyMismatch { expected, got } => {
                write!(f, "currency mismatch: cart is {}, product is {}", expected, got)
            }
            CartRejection::Overflow { product_id } => {
                write!(f, "line total overflow for {}", product_id)
            }
        }
    }
}

/// What a transition did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The state changed as requested.
    Applied,
    /// The action referred to a line that does not exist.
    Unchanged,
    /// The action was refused; the state is the input state.
    Rejected(CartRejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&CartRejection> {
        match self {
            Outcome::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Result of applying an action: the next state and what happened.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Transition {
    pub state: CartState,
    pub outcome: Outcome,
}

impl Transition {
    fn applied(state: CartState) -> Self {
        Self {
            state,
            outcome: Outcome::Applied,
        }
    }

    fn unchanged(state: CartState) -> Self {
        Self {
            state,
            outcome: Outcome::Unchanged,
        }
    }

    fn rejected(state: CartState, rejection: CartRejection) -> Self {
        warn!(%rejection, "cart action rejected");
        Self {
            state,
            outcome: Outcome::Rejected(rejection),
        }
    }

    /// Drop the outcome and keep the state.
    pub fn into_state(self) -> CartState {
        self.state
    }
}

/// Transaction state of one register.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartState {
    currency: Currency,
    lines: Vec<CartLine>,
    view: PosView,
    last_completed_sale: Option<SaleSnapshot>,
}

impl CartState {
    /// Create an empty cart pricing in `currency`.
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            lines: Vec::new(),
            view: PosView::Selecting,
            last_completed_sale: None,
        }
    }

    /// Apply one action and return the next state.
    pub fn apply(self, action: CartAction) -> Transition {
        let name = action.name();
        let transition = match action {
            CartAction::AddItem(product) => self.add_item(&product),
            CartAction::UpdateQuantity {
                product_id,
                quantity,
            } => self.update_quantity(&product_id, quantity),
            CartAction::RemoveItem(product_id) => self.remove_item(&product_id),
            CartAction::ClearCart => {
                let mut state = self;
                state.lines.clear();
                Transition::applied(state)
            }
            CartAction::SetView(view) => {
                let mut state = self;
                state.view = view;
                Transition::applied(state)
            }
            CartAction::RecordSale(snapshot) => {
                let mut state = self;
                state.last_completed_sale = Some(snapshot);
                Transition::applied(state)
            }
            CartAction::StartNewSale => {
                let mut state = self;
                state.lines.clear();
                state.last_completed_sale = None;
                state.view = PosView::Selecting;
                Transition::applied(state)
            }
        };
        debug!(action = name, outcome = ?transition.outcome, "cart transition");
        transition
    }

    fn add_item(mut self, product: &CatalogProduct) -> Transition {
        if !product.is_sellable() {
            let rejection = CartRejection::NotSellable {
                product_id: product.id.clone(),
                status: product.status,
            };
            return Transition::rejected(self, rejection);
        }
        if product.unit_price.currency != self.currency {
            let rejection = CartRejection::CurrencyMismatch {
                expected: self.currency,
                got: product.unit_price.currency,
            };
            return Transition::rejected(self, rejection);
        }

        let Some(index) = self.position(&product.id) else {
            if product.available_stock <= 0 {
                let rejection = CartRejection::OutOfStock {
                    product_id: product.id.clone(),
                    requested: 1,
                    available: product.available_stock,
                };
                return Transition::rejected(self, rejection);
            }
            self.lines.push(CartLine::from_product(product));
            return Transition::applied(self);
        };

        let line = &self.lines[index];
        let requested = match line.quantity.checked_add(1) {
            Some(q) => q,
            None => {
                let rejection = CartRejection::Overflow {
                    product_id: product.id.clone(),
                };
                return Transition::rejected(self, rejection);
            }
        };
        if requested > product.available_stock {
            let rejection = CartRejection::OutOfStock {
                product_id: product.id.clone(),
                requested,
                available: product.available_stock,
            };
            return Transition::rejected(self, rejection);
        }
        if line.unit_price.try_multiply(requested).is_none() {
            let rejection = CartRejection::Overflow {
                product_id: product.id.clone(),
            };
            return Transition::rejected(self, rejection);
        }

        let line = &mut self.lines[index];
        line.quantity = requested;
        line.available_stock = product.available_stock;
        Transition::applied(self)
    }

    fn update_quantity(mut self, product_id: &ProductId, quantity: i64) -> Transition {
        let Some(index) = self.position(product_id) else {
            return Transition::unchanged(self);
        };

        if quantity <= 0 {
            self.lines.remove(index);
            return Transition::applied(self);
        }

        let line = &self.lines[index];
        if quantity > line.available_stock {
            let rejection = CartRejection::OutOfStock {
                product_id: product_id.clone(),
                requested: quantity,
                available: line.available_stock,
            };
            return Transition::rejected(self, rejection);
        }
        if line.unit_price.try_multiply(quantity).is_none() {
            let rejection = CartRejection::Overflow {
                product_id: product_id.clone(),
            };
            return Transition::rejected(self, rejection);
        }

        self.lines[index].quantity = quantity;
        Transition::applied(self)
    }

    fn remove_item(mut self, product_id: &ProductId) -> Transition {
        match self.position(product_id) {
            Some(index) => {
                self.lines.remove(index);
                Transition::applied(self)
            }
            None => Transition::unchanged(self),
        }
    }

    /// Re-read every line's stock from the catalog.
    ///
    /// Quantities above the new stock are lowered to it. Lines whose product
    /// is gone, sold out or no longer sellable are dropped.
    pub fn refresh_stock(mut self, catalog: &impl Catalog) -> Transition {
        let before = self.lines.clone();
        self.lines.retain_mut(|line| match catalog.product(&line.product_id) {
            Some(product) if product.is_sellable() && product.available_stock > 0 => {
                line.available_stock = product.available_stock;
                line.quantity = line.quantity.min(product.available_stock);
                true
            }
            _ => false,
        });

        if self.lines == before {
            Transition::unchanged(self)
        } else {
            debug!(
                lines_before = before.len(),
                lines_after = self.lines.len(),
                "cart stock refreshed"
            );
            Transition::applied(self)
        }
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|l| &l.product_id == product_id)
    }

    /// Lines in the order they were added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get a line by product.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    pub fn view(&self) -> PosView {
        self.view
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn last_completed_sale(&self) -> Option<&SaleSnapshot> {
        self.last_completed_sale.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> Result<i64, CommerceError> {
        self.lines
            .iter()
            .try_fold(0_i64, |acc, l| acc.checked_add(l.quantity))
            .ok_or(CommerceError::Overflow)
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        let line_totals = self
            .lines
            .iter()
            .map(|l| l.line_total().ok_or(CommerceError::Overflow))
            .collect::<Result<Vec<_>, _>>()?;
        Money::try_sum(line_totals.iter(), self.currency).ok_or(CommerceError::Overflow)
    }

    /// Amount due. The register applies no tax, shipping or discount.
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.subtotal()
    }

    /// All derived amounts at once.
    pub fn totals(&self) -> Result<CartTotals, CommerceError> {
        let subtotal = self.subtotal()?;
        Ok(CartTotals {
            subtotal,
            total: subtotal,
            item_count: self.item_count()?,
            line_count: self.lines.len(),
        })
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new(Currency::USD)
    }
}
