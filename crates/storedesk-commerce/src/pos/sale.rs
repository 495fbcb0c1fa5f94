//! Completed sale records.

use crate::ids::{OrderId, ProductId};
use crate::money::Money;
use crate::pos::CartLine;
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// How the customer paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PaymentType {
    /// Cash, with change given back.
    Cash,
    /// Card terminal.
    Card,
    /// Anything else the store records by label (voucher, bank transfer).
    Other { label: String },
}

impl PaymentType {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Card => "card",
            PaymentType::Other { label } => label,
        }
    }
}

/// Payment details captured on the paying screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Method used.
    pub payment_type: PaymentType,
    /// Cash handed over, for cash payments.
    pub amount_tendered: Option<Money>,
}

impl Payment {
    /// A cash payment with the amount handed over.
    pub fn cash(amount_tendered: Money) -> Self {
        Self {
            payment_type: PaymentType::Cash,
            amount_tendered: Some(amount_tendered),
        }
    }

    /// A card payment.
    pub fn card() -> Self {
        Self {
            payment_type: PaymentType::Card,
            amount_tendered: None,
        }
    }

    /// A payment recorded under a custom label.
    pub fn other(label: impl Into<String>) -> Self {
        Self {
            payment_type: PaymentType::Other {
                label: label.into(),
            },
            amount_tendered: None,
        }
    }

    /// Change owed for a total, if this payment gives change.
    ///
    /// Fails when tendered cash does not cover the total.
    pub fn change_for(&self, total: &Money) -> Result<Option<Money>, CommerceError> {
        let Some(tendered) = self.amount_tendered else {
            return Ok(None);
        };
        let change = tendered
            .try_subtract(total)
            .ok_or_else(|| CommerceError::CurrencyMismatch {
                expected: total.currency.code().to_string(),
                got: tendered.currency.code().to_string(),
            })?;
        if change.is_negative() {
            return Err(CommerceError::InsufficientTender {
                total: total.display(),
                tendered: tendered.display(),
            });
        }
        Ok(Some(change))
    }
}

/// One line as printed on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Immutable record of a completed sale, used to render the receipt.
///
/// Fields are private; a snapshot is built once by [`SaleSnapshot::new`]
/// and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSnapshot {
    order_id: OrderId,
    order_number: String,
    total_amount: Money,
    payment_type: PaymentType,
    amount_tendered: Option<Money>,
    change_due: Option<Money>,
    lines: Vec<ReceiptLine>,
}

impl SaleSnapshot {
    /// Build the snapshot of a sale the order service accepted.
    pub fn new(
        order_id: OrderId,
        order_number: impl Into<String>,
        total_amount: Money,
        payment: &Payment,
        lines: &[CartLine],
    ) -> Result<Self, CommerceError> {
        let change_due = payment.change_for(&total_amount)?;
        let lines = lines
            .iter()
            .map(|line| {
                Ok(ReceiptLine {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total().ok_or(CommerceError::Overflow)?,
                })
            })
            .collect::<Result<Vec<_>, CommerceError>>()?;

        Ok(Self {
            order_id,
            order_number: order_number.into(),
            total_amount,
            payment_type: payment.payment_type.clone(),
            amount_tendered: payment.amount_tendered,
            change_due,
            lines,
        })
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn payment_type(&self) -> &PaymentType {
        &self.payment_type
    }

    pub fn amount_tendered(&self) -> Option<Money> {
        self.amount_tendered
    }

    pub fn change_due(&self) -> Option<Money> {
        self.change_due
    }

    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Total units sold.
    pub fn item_count(&self) -> Result<i64, CommerceError> {
        self.lines
            .iter()
            .try_fold(0_i64, |acc, l| acc.checked_add(l.quantity))
            .ok_or(CommerceError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    #[test]
    fn test_cash_change() {
        let payment = Payment::cash(usd(5000));
        assert_eq!(payment.change_for(&usd(2997)).unwrap(), Some(usd(2003)));
        assert_eq!(payment.change_for(&usd(5000)).unwrap(), Some(usd(0)));
    }

    #[test]
    fn test_short_tender() {
        let payment = Payment::cash(usd(1000));
        assert!(matches!(
            payment.change_for(&usd(2997)),
            Err(CommerceError::InsufficientTender { .. })
        ));
    }

    #[test]
    fn test_card_has_no_change() {
        assert_eq!(Payment::card().change_for(&usd(2997)).unwrap(), None);
    }

    #[test]
    fn test_tender_currency_mismatch() {
        let payment = Payment::cash(Money::new(5000, Currency::EUR));
        assert!(matches!(
            payment.change_for(&usd(100)),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_snapshot_copies_lines() {
        let lines = vec![CartLine {
            product_id: ProductId::new("p1"),
            name: "Mug".to_string(),
            unit_price: usd(999),
            quantity: 3,
            available_stock: 3,
        }];
        let snapshot = SaleSnapshot::new(
            OrderId::new("ord-1"),
            "1001",
            usd(2997),
            &Payment::card(),
            &lines,
        )
        .unwrap();

        assert_eq!(snapshot.order_number(), "1001");
        assert_eq!(snapshot.item_count().unwrap(), 3);
        assert_eq!(snapshot.lines()[0].line_total, usd(2997));
        assert_eq!(snapshot.payment_type().as_str(), "card");
    }
}
