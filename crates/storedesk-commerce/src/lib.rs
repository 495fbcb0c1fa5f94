//! Point-of-sale engine and commerce types for StoreDesk.
//!
//! - **Catalog**: product lookup with price and sellable stock
//! - **POS**: the register cart reducer, screens, sale snapshots, checkout
//!
//! # Example
//!
//! ```rust
//! use storedesk_commerce::prelude::*;
//!
//! let mug = CatalogProduct::new("p1", "Mug", Money::from_decimal(9.99, Currency::USD), 3);
//!
//! let mut cart = CartState::new(Currency::USD);
//! for _ in 0..3 {
//!     cart = cart.apply(CartAction::AddItem(mug.clone())).into_state();
//! }
//! assert_eq!(cart.subtotal().unwrap().display(), "$29.97");
//!
//! // A fourth unit exceeds stock and is refused.
//! let t = cart.apply(CartAction::AddItem(mug));
//! assert!(t.outcome.is_rejected());
//! assert_eq!(t.state.item_count().unwrap(), 3);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod catalog;
pub mod pos;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Catalog, CatalogProduct, InMemoryCatalog, ProductStatus};

    // POS
    pub use crate::pos::{
        checkout, CartAction, CartLine, CartRejection, CartState, CartTotals, OrderService,
        Outcome, Payment, PaymentType, PosView, SaleSnapshot, SequentialOrderService, Transition,
    };
}
