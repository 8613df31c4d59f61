//! Money value object for currency amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

use crate::domain::shared::DomainError;

/// A monetary amount.
///
/// Represented as a Decimal for precise financial calculations.
/// Always uses 2 decimal places for display (but internal precision is higher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Money value from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money value from cents (integer).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this amount is positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if this amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    /// Round to 2 decimal places.
    #[must_use]
    pub fn round(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Check that the amount is usable as a line-item or payment amount.
    ///
    /// # Errors
    ///
    /// Returns error if the amount is negative.
    pub fn validate_non_negative(&self, field: &str) -> Result<(), DomainError> {
        if self.is_negative() {
            return Err(DomainError::InvalidValue {
                field: field.to_string(),
                message: "amount cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// ISO 4217 currency code for a payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// United States dollar.
    #[default]
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
            Self::Gbp => write!(f, "GBP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_from_cents() {
        let m = Money::from_cents(1550);
        assert_eq!(m.amount(), dec!(15.50));
    }

    #[test]
    fn money_arithmetic() {
        let a = Money::new(dec!(10.00));
        let b = Money::new(dec!(5.00));

        assert_eq!((a + b).amount(), dec!(15.00));
        assert_eq!((a - b).amount(), dec!(5.00));
        assert_eq!((b * 3).amount(), dec!(15.00));
    }

    #[test]
    fn money_sum() {
        let total: Money = [
            Money::new(dec!(10.00)),
            Money::new(dec!(5.00)),
            Money::new(dec!(0.50)),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.amount(), dec!(15.50));
    }

    #[test]
    fn money_ordering() {
        assert!(Money::new(dec!(10)) > Money::new(dec!(5)));
        assert!(Money::ZERO.is_zero());
    }

    #[test]
    fn money_display_two_decimals() {
        assert_eq!(format!("{}", Money::new(dec!(15.5))), "15.50");
    }

    #[test]
    fn validate_non_negative_rejects_negative() {
        let err = Money::new(dec!(-1)).validate_non_negative("amount");
        assert!(err.is_err());
        assert!(Money::ZERO.validate_non_negative("amount").is_ok());
    }

    #[test]
    fn money_serde_transparent() {
        let m = Money::new(dec!(15.50));
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn currency_serde_uppercase() {
        let json = serde_json::to_string(&Currency::Usd).unwrap();
        assert_eq!(json, "\"USD\"");

        let parsed: Currency = serde_json::from_str("\"EUR\"").unwrap();
        assert_eq!(parsed, Currency::Eur);
    }

    #[test]
    fn currency_display() {
        assert_eq!(format!("{}", Currency::Gbp), "GBP");
    }
}
