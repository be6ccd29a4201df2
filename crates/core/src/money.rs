use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// A monetary amount with two-decimal precision.
///
/// Statements arrive as JSON numbers and the report is consumed as JSON, so
/// `Money` serializes as a plain number rather than the decimal-string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn to_cents(self) -> i64 {
        (self.0 * Decimal::from(100)).round().to_i64().unwrap_or(0)
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    /// Whole currency units, for thresholds like the 50 000 large-transfer gate.
    pub fn from_units(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    pub fn from_f64(value: f64) -> Self {
        Money(
            Decimal::from_f64(value)
                .unwrap_or(Decimal::ZERO)
                .round_dp(2),
        )
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// |self − other|, used for the transfer amount-tolerance window.
    pub fn abs_diff(self, other: Money) -> Money {
        Money((self.0 - other.0).abs())
    }

    /// True when the amount is an exact multiple of `step` whole units.
    pub fn is_multiple_of_units(self, step: i64) -> bool {
        if step <= 0 {
            return false;
        }
        (self.0 % Decimal::from(step)).is_zero()
    }

    /// self / other × 100 as a float, 0.0 when the denominator is zero.
    pub fn percent_of(self, other: Money) -> f64 {
        if other.0.is_zero() {
            return 0.0;
        }
        (self.0 / other.0 * Decimal::from(100))
            .to_f64()
            .unwrap_or(0.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Money::from_f64(value))
    }
}
