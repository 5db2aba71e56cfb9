//! # Money Module
//!
//! Provides the `Money` type for handling monetary values exactly.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    1000 × 7 / 100 = 70.00000000000001  ❌ WRONG!                        │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    Documents keep full decimal precision (snapshots, display)           │
//! │    Minor units (satang/cents) only appear at the payment boundary       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tabula_core::money::Money;
//!
//! let price = Money::new(Decimal::new(10050, 2)); // 100.50
//! let doubled = price * 2;
//! assert_eq!(doubled.amount(), Decimal::new(20100, 2));
//! assert_eq!(price.to_minor_units(), Some(10050));
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

/// Number of minor units in one major unit.
const MINOR_UNITS_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the single fixed currency.
///
/// ## Design Decisions
/// - **Decimal**: exact arithmetic, no binary rounding artifacts
/// - **Transparent serde**: serializes exactly like the inner `Decimal`
/// - **No implicit rounding**: only `to_minor_units` rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Creates a Money value from a decimal amount in major units.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the amount in major units.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns `rate` percent of this amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tabula_core::money::Money;
    ///
    /// let subtotal = Money::new(Decimal::from(200));
    /// let vat = subtotal.percent_of(Decimal::from(7));
    /// assert_eq!(vat.amount(), Decimal::from(14));
    /// ```
    pub fn percent_of(&self, rate: Decimal) -> Money {
        Money(self.0 * rate / Decimal::ONE_HUNDRED)
    }

    /// Clamps this amount into `[min, max]`.
    ///
    /// `max` wins when `min > max`, so a clamp against a zero ceiling always
    /// yields zero.
    pub fn clamp_between(self, min: Money, max: Money) -> Money {
        if self > max {
            max
        } else if self < min {
            min.min(max)
        } else {
            self
        }
    }

    /// Converts to integer minor units (1/100 of the unit).
    ///
    /// Rounds half away from zero. Returns `None` when the amount does not
    /// fit in an `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tabula_core::money::Money;
    ///
    /// assert_eq!(Money::new(Decimal::new(1005, 3)).to_minor_units(), Some(101));
    /// assert_eq!(Money::new(Decimal::new(1004, 3)).to_minor_units(), Some(100));
    /// ```
    pub fn to_minor_units(&self) -> Option<i64> {
        self.0
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display with two decimals, for logs and debugging only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_arithmetic() {
        let a = Money::new(dec!(10.50));
        let b = Money::new(dec!(0.25));

        assert_eq!((a + b).amount(), dec!(10.75));
        assert_eq!((a - b).amount(), dec!(10.25));
        assert_eq!((a * 3).amount(), dec!(31.50));
    }

    #[test]
    fn test_no_float_drift() {
        let total: Money = [dec!(0.1), dec!(0.2)].into_iter().map(Money::new).sum();
        assert_eq!(total.amount(), dec!(0.3));
    }

    #[test]
    fn test_percent_of_keeps_precision() {
        let amount = Money::new(dec!(99.99));
        assert_eq!(amount.percent_of(dec!(7)).amount(), dec!(6.9993));
    }

    #[test]
    fn test_clamp_between() {
        let ceiling = Money::new(dec!(100));
        assert_eq!(Money::new(dec!(150)).clamp_between(Money::zero(), ceiling), ceiling);
        assert_eq!(
            Money::new(dec!(-5)).clamp_between(Money::zero(), ceiling),
            Money::zero()
        );
        assert_eq!(
            Money::new(dec!(40)).clamp_between(Money::zero(), ceiling).amount(),
            dec!(40)
        );
        assert_eq!(
            Money::new(dec!(40)).clamp_between(Money::zero(), Money::zero()),
            Money::zero()
        );
    }

    #[test]
    fn test_to_minor_units_rounding() {
        assert_eq!(Money::new(dec!(100)).to_minor_units(), Some(10000));
        assert_eq!(Money::new(dec!(19.995)).to_minor_units(), Some(2000));
        assert_eq!(Money::new(dec!(19.994)).to_minor_units(), Some(1999));
        assert_eq!(Money::new(dec!(0.005)).to_minor_units(), Some(1));
    }

    #[test]
    fn test_to_minor_units_overflow() {
        assert_eq!(Money::new(Decimal::MAX).to_minor_units(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(dec!(14)).to_string(), "14.00");
        assert_eq!(Money::new(dec!(6.99)).to_string(), "6.99");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Money::new(dec!(214))).unwrap();
        assert_eq!(json, "\"214\"");
        let back: Money = serde_json::from_str("214.5").unwrap();
        assert_eq!(back.amount(), dec!(214.5));
    }
}
