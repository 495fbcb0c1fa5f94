//! Completing a sale against the order service.
//!
//! Order creation happens in the hosted store backend. [`OrderService`] is
//! the seam to it; [`checkout`] drives one sale through it and feeds the
//! result back into the cart as a [`SaleSnapshot`].

use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId};
use crate::money::Money;
use crate::pos::{CartAction, CartState, Payment, PosView, SaleSnapshot};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A line of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequestLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

/// What the register sends to the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub lines: Vec<OrderRequestLine>,
    pub total_amount: Money,
    pub payment: Payment,
}

/// The order service's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order_number: String,
}

/// Creates orders in the store backend.
pub trait OrderService {
    fn create_order(&mut self, request: &OrderRequest) -> Result<PlacedOrder, CommerceError>;
}

/// Order service that numbers orders sequentially and keeps every request.
///
/// Used for offline replays and tests.
#[derive(Debug, Clone)]
pub struct SequentialOrderService {
    prefix: String,
    next_number: u64,
    placed: Vec<OrderRequest>,
}

impl SequentialOrderService {
    /// Start numbering at `first_number`; ids are `<prefix>-<number>`.
    pub fn new(prefix: impl Into<String>, first_number: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next_number: first_number,
            placed: Vec::new(),
        }
    }

    /// Requests accepted so far.
    pub fn placed(&self) -> &[OrderRequest] {
        &self.placed
    }
}

impl Default for SequentialOrderService {
    fn default() -> Self {
        Self::new("ord", 1001)
    }
}

impl OrderService for SequentialOrderService {
    fn create_order(&mut self, request: &OrderRequest) -> Result<PlacedOrder, CommerceError> {
        let number = self.next_number;
        self.next_number += 1;
        self.placed.push(request.clone());
        Ok(PlacedOrder {
            order_id: OrderId::new(format!("{}-{}", self.prefix, number)),
            order_number: number.to_string(),
        })
    }
}

/// Complete the sale in `cart`.
///
/// Refuses an empty cart and cash that does not cover the total before the
/// service is called. On success the returned state has the sale recorded
/// and shows the receipt; the lines stay until the next sale starts.
pub fn checkout<S>(
    cart: &CartState,
    payment: &Payment,
    service: &mut S,
) -> Result<CartState, CommerceError>
where
    S: OrderService + ?Sized,
{
    if cart.is_empty() {
        return Err(CommerceError::EmptyCart);
    }

    let total_amount = cart.total()?;
    payment.change_for(&total_amount)?;

    let request = OrderRequest {
        lines: cart
            .lines()
            .iter()
            .map(|line| OrderRequestLine {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect(),
        total_amount,
        payment: payment.clone(),
    };

    let placed = service.create_order(&request)?;
    let snapshot = SaleSnapshot::new(
        placed.order_id,
        placed.order_number,
        total_amount,
        payment,
        cart.lines(),
    )?;

    info!(
        order_number = snapshot.order_number(),
        total = %snapshot.total_amount(),
        payment = snapshot.payment_type().as_str(),
        "sale completed"
    );

    let state = cart
        .clone()
        .apply(CartAction::RecordSale(snapshot))
        .into_state()
        .apply(CartAction::SetView(PosView::Receipt))
        .into_state();
    Ok(state)
}
