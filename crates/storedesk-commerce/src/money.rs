//! Register money: integer minor units tagged with a currency.
//!
//! Prices and totals never pass through floating point once parsed, so a
//! subtotal is the exact sum of its lines. Arithmetic is checked and
//! refuses to mix currencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies a register can price in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    JPY,
}

/// `(currency, ISO code, symbol, minor digits)`
static CURRENCIES: [(Currency, &str, &str, u32); 5] = [
    (Currency::USD, "USD", "$", 2),
    (Currency::EUR, "EUR", "\u{20ac}", 2),
    (Currency::GBP, "GBP", "\u{00a3}", 2),
    (Currency::CAD, "CAD", "CA$", 2),
    (Currency::JPY, "JPY", "\u{00a5}", 0),
];

impl Currency {
    fn entry(&self) -> &'static (Currency, &'static str, &'static str, u32) {
        // Every variant has a row.
        CURRENCIES
            .iter()
            .find(|(c, ..)| c == self)
            .unwrap_or(&CURRENCIES[0])
    }

    /// ISO 4217 code, e.g. `"USD"`.
    pub fn code(&self) -> &'static str {
        self.entry().1
    }

    pub fn symbol(&self) -> &'static str {
        self.entry().2
    }

    /// Digits after the decimal point; 0 for yen.
    pub fn decimal_places(&self) -> u32 {
        self.entry().3
    }

    fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl FromStr for Currency {
    type Err = String;

    /// Parse an ISO code, ignoring case.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        CURRENCIES
            .iter()
            .find(|(_, iso, ..)| iso.eq_ignore_ascii_case(code.trim()))
            .map(|(c, ..)| *c)
            .ok_or_else(|| format!("unknown currency: {}", code))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An amount in minor units (cents for USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    pub amount_cents: i64,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Round a major-unit amount to the nearest minor unit.
    ///
    /// ```
    /// use storedesk_commerce::money::{Money, Currency};
    /// assert_eq!(Money::from_decimal(9.99, Currency::USD).amount_cents, 999);
    /// assert_eq!(Money::from_decimal(500.0, Currency::JPY).amount_cents, 500);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let amount_cents = (amount * currency.minor_per_major() as f64).round() as i64;
        Self::new(amount_cents, currency)
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Symbol and amount, e.g. `"$29.97"` or `"-$0.50"`.
    pub fn display(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{}{}", sign, self.currency.symbol(), self.unsigned_amount())
    }

    /// Amount without symbol, e.g. `"29.97"`.
    pub fn display_amount(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{}", sign, self.unsigned_amount())
    }

    fn unsigned_amount(&self) -> String {
        let minor = self.amount_cents.unsigned_abs();
        let places = self.currency.decimal_places();
        if places == 0 {
            return minor.to_string();
        }
        let per_major = 10_u64.pow(places);
        format!(
            "{}.{:0width$}",
            minor / per_major,
            minor % per_major,
            width = places as usize
        )
    }

    /// `None` on a currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let cents = self.amount_cents.checked_add(other.amount_cents)?;
        Some(Money::new(cents, self.currency))
    }

    /// `None` on a currency mismatch or overflow.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let cents = self.amount_cents.checked_sub(other.amount_cents)?;
        Some(Money::new(cents, self.currency))
    }

    /// Price times quantity; `None` on overflow.
    pub fn try_multiply(&self, quantity: i64) -> Option<Money> {
        let cents = self.amount_cents.checked_mul(quantity)?;
        Some(Money::new(cents, self.currency))
    }

    /// Sum amounts that must all be in `currency`.
    pub fn try_sum<'a>(
        amounts: impl IntoIterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_exact() {
        assert_eq!(Money::new(2997, Currency::USD).display(), "$29.97");
        assert_eq!(Money::new(5, Currency::EUR).display_amount(), "0.05");
        assert_eq!(Money::new(-50, Currency::USD).display(), "-$0.50");
        assert_eq!(Money::new(100, Currency::JPY).display(), "\u{00a5}100");
        assert_eq!(
            Money::new(9_007_199_254_740_993, Currency::USD).display_amount(),
            "90071992547409.93"
        );
    }

    #[test]
    fn test_from_decimal_rounds() {
        assert_eq!(Money::from_decimal(0.1 + 0.2, Currency::USD).amount_cents, 30);
        assert_eq!(Money::from_decimal(19.999, Currency::GBP).amount_cents, 2000);
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::new(1000, Currency::USD);
        let b = Money::new(300, Currency::USD);
        assert_eq!(a.try_add(&b), Some(Money::new(1300, Currency::USD)));
        assert_eq!(b.try_subtract(&a), Some(Money::new(-700, Currency::USD)));
        assert_eq!(a.try_multiply(3), Some(Money::new(3000, Currency::USD)));
        assert_eq!(Money::new(i64::MAX, Currency::USD).try_multiply(2), None);
    }

    #[test]
    fn test_currencies_do_not_mix() {
        let usd = Money::new(1000, Currency::USD);
        let eur = Money::new(1000, Currency::EUR);
        assert_eq!(usd.try_add(&eur), None);
        assert_eq!(Money::try_sum([usd, eur].iter(), Currency::USD), None);
        assert_eq!(Money::try_sum([usd, usd].iter(), Currency::EUR), None);
    }

    #[test]
    fn test_try_sum() {
        let values = [Money::new(999, Currency::USD), Money::new(1, Currency::USD)];
        assert_eq!(
            Money::try_sum(&values, Currency::USD),
            Some(Money::new(1000, Currency::USD))
        );
        assert_eq!(
            Money::try_sum(std::iter::empty(), Currency::USD),
            Some(Money::zero(Currency::USD))
        );
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!("USD".parse::<Currency>(), Ok(Currency::USD));
        assert_eq!(" jpy ".parse::<Currency>(), Ok(Currency::JPY));
        assert!("XYZ".parse::<Currency>().is_err());
        assert_eq!(Currency::CAD.to_string(), "CAD");
    }
}
