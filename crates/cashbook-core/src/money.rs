//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Persisted records and the spreadsheet store amounts as plain numbers:  │
//! │    { "amount": 0.1 } + { "amount": 0.2 } = 0.30000000000000004  ❌     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    Amounts enter as numbers, are rounded ONCE to whole paise, and all  │
//! │    arithmetic after that is saturating i64.                             │
//! │    They leave as numbers again only at the serialization boundary.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cashbook_core::money::Money;
//!
//! let amount = Money::from_paise(50_050); // ₹500.50
//! let total = amount + Money::from_rupees(20);
//! assert_eq!(total.paise(), 52_050);
//! assert_eq!(total.to_string(), "₹520.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::MAX_AMOUNT_PAISE;

const PAISE_PER_RUPEE: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: net totals in reports can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Saturating ops**: sums over hand-edited data clamp at the i64
///   bounds instead of panicking
/// - Transaction amounts are never negative; that is enforced by
///   validation, not by this type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ```rust
    /// use cashbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(500).paise(), 50_000);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees.saturating_mul(PAISE_PER_RUPEE))
    }

    /// Converts a floating point rupee amount, rounding to the nearest paisa.
    ///
    /// Returns `None` for NaN, infinities and anything beyond
    /// [`MAX_AMOUNT_PAISE`] in either direction. This is the only place a
    /// float becomes Money.
    ///
    /// ```rust
    /// use cashbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees_f64(12.3456).unwrap().paise(), 1235);
    /// assert!(Money::from_rupees_f64(f64::NAN).is_none());
    /// assert!(Money::from_rupees_f64(1e300).is_none());
    /// ```
    pub fn from_rupees_f64(rupees: f64) -> Option<Self> {
        let paise = (rupees * PAISE_PER_RUPEE as f64).round();
        if !paise.is_finite() || paise.abs() > MAX_AMOUNT_PAISE as f64 {
            return None;
        }
        Some(Money(paise as i64))
    }

    /// Parses operator input such as `"500"`, `"500.5"` or `"1,200.75"`.
    ///
    /// ## Rules
    /// - Optional leading `-`
    /// - Thousands separators (`,`) are ignored
    /// - At most two fractional digits
    ///
    /// ```rust
    /// use cashbook_core::money::Money;
    ///
    /// assert_eq!(Money::parse("1,200.75").unwrap().paise(), 120_075);
    /// assert_eq!(Money::parse("7.5").unwrap().paise(), 750);
    /// assert!(Money::parse("1.234").is_err());
    /// assert!(Money::parse("abc").is_err());
    /// ```
    pub fn parse(input: &str) -> CoreResult<Self> {
        let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
        let invalid = |reason: &str| CoreError::InvalidAmount {
            reason: format!("'{}' {}", input.trim(), reason),
        };

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("is empty"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("is not a number"));
        }
        if fraction.len() > 2 {
            return Err(invalid("has more than two decimal places"));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("is too large"))?
        };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("is not a number"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("is not a number"))?,
        };

        let paise = whole
            .checked_mul(PAISE_PER_RUPEE)
            .and_then(|p| p.checked_add(fraction))
            .ok_or_else(|| invalid("is too large"))?;

        Ok(Money(if negative { -paise } else { paise }))
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / PAISE_PER_RUPEE
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % PAISE_PER_RUPEE).abs()
    }

    /// Returns the amount as a float number of rupees.
    ///
    /// Serialization boundary only: persisted records and the spreadsheet
    /// keep amounts as plain numbers.
    pub fn to_rupees_f64(&self) -> f64 {
        self.0 as f64 / PAISE_PER_RUPEE as f64
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows rupees with two decimals: `₹1200.75`, `-₹5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by a note count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0.saturating_mul(count))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Serde Helper: amounts as rupee numbers
// =============================================================================

/// Serializes `Money` as a plain rupee number (`500.5`) instead of paise.
///
/// ## Usage
/// ```rust,ignore
/// #[serde(with = "crate::money::as_rupees")]
/// pub amount: Money,
/// ```
pub mod as_rupees {
    use super::Money;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_rupees_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Money::from_rupees_f64(raw).ok_or_else(|| de::Error::custom("amount must be a finite number in range"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
