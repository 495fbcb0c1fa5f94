//! Derived cart amounts.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Amounts derived from the current lines. Never stored on the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of line totals.
    pub subtotal: Money,
    /// Amount due; equal to the subtotal at the register.
    pub total: Money,
    /// Units across all lines.
    pub item_count: i64,
    /// Number of distinct products.
    pub line_count: usize,
}
