//! Currency-tagged decimal amounts.
//!
//! # Design
//! Mixing currencies in arithmetic or ordering is a caller bug, so those
//! operators panic instead of returning an error. Equality never panics: two
//! amounts in different currencies are simply unequal.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use rust_decimal::Decimal;
use serde_json::Value;

/// An immutable amount of money in a given ISO 4217 currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    amount: Decimal,
    currency_code: String,
}

impl Money {
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// Build from an integer number of cents, as the API reports prices.
    pub fn from_cents(cents: i64, currency_code: impl Into<String>) -> Self {
        Self::new(Decimal::new(cents, 2), currency_code)
    }

    /// Decode a cents field. Requires an integer JSON number and a currency.
    pub(crate) fn from_json_cents(value: Option<&Value>, currency_code: Option<&str>) -> Option<Self> {
        let cents = value.and_then(Value::as_i64)?;
        Some(Self::from_cents(cents, currency_code?))
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    fn assert_same_currency(&self, other: &Money, operation: &str) {
        assert!(
            self.currency_code == other.currency_code,
            "cannot {operation} {} and {}",
            self.currency_code,
            other.currency_code
        );
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency_code)
    }
}

impl PartialOrd for Money {
    /// Panics if the currencies differ.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.assert_same_currency(other, "compare");
        self.amount.partial_cmp(&other.amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        self.assert_same_currency(&rhs, "add");
        Money::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        self.assert_same_currency(&rhs, "subtract");
        Money::new(self.amount - rhs.amount, self.currency_code)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, rhs: Decimal) -> Money {
        Money::new(self.amount * rhs, self.currency_code)
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, rhs: Decimal) -> Money {
        Money::new(self.amount / rhs, self.currency_code)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money::new(-self.amount, self.currency_code)
    }
}
