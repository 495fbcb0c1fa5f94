//! Point-of-sale engine.
//!
//! Contains the register cart reducer, screens, sale snapshots and the
//! checkout seam to the order service.

mod cart;
mod checkout;
mod sale;
mod totals;
mod view;

pub use cart::{CartAction, CartLine, CartRejection, CartState, Outcome, Transition};
pub use checkout::{
    checkout, OrderRequest, OrderRequestLine, OrderService, PlacedOrder, SequentialOrderService,
};
pub use sale::{Payment, PaymentType, ReceiptLine, SaleSnapshot};
pub use totals::CartTotals;
pub use view::PosView;
