//! Register screens.

use serde::{Deserialize, Serialize};

/// The screen the register is showing.
///
/// ```text
/// selecting ⇄ paying → receipt → (start new sale) → selecting
/// ```
///
/// The cart engine accepts any transition; [`PosView::can_transition_to`]
/// describes the flow a host normally follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PosView {
    /// Picking products into the cart.
    #[default]
    Selecting,
    /// Taking payment.
    Paying,
    /// Showing the receipt of the last sale.
    Receipt,
}

impl PosView {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosView::Selecting => "selecting",
            PosView::Paying => "paying",
            PosView::Receipt => "receipt",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PosView::Selecting => "Products",
            PosView::Paying => "Payment",
            PosView::Receipt => "Receipt",
        }
    }

    /// Whether the conventional register flow moves from `self` to `next`.
    pub fn can_transition_to(&self, next: PosView) -> bool {
        matches!(
            (self, next),
            (PosView::Selecting, PosView::Paying)
                | (PosView::Paying, PosView::Selecting)
                | (PosView::Paying, PosView::Receipt)
                | (PosView::Receipt, PosView::Selecting)
        ) || *self == next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow() {
        assert!(PosView::Selecting.can_transition_to(PosView::Paying));
        assert!(PosView::Paying.can_transition_to(PosView::Selecting));
        assert!(PosView::Paying.can_transition_to(PosView::Receipt));
        assert!(PosView::Receipt.can_transition_to(PosView::Selecting));
        assert!(!PosView::Selecting.can_transition_to(PosView::Receipt));
        assert!(!PosView::Receipt.can_transition_to(PosView::Paying));
    }
}
