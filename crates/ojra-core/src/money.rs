//! # Money Module
//!
//! Provides the `Money` type for fares, payments and change.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE ROUNDING RULE                                                      │
//! │                                                                         │
//! │  Every fare, payment and aggregate is "rounded to 2 decimals":          │
//! │    round2(x) = round(x × 100) / 100                                     │
//! │                                                                         │
//! │  Storing the value as whole piastres makes that rule structural:        │
//! │    12.345 entered  →  1235 piastres  →  displayed 12.35                 │
//! │                                                                         │
//! │  Rounding happens ONCE, when text is parsed at the input boundary,      │
//! │  and in split_even() when a payment is divided between passengers.      │
//! │  Sums and differences after that are exact.                             │
//! │  There is no float constructor.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ojra_core::money::Money;
//!
//! let fare: Money = "12.5".parse().unwrap();
//! assert_eq!(fare.cents(), 1250);
//!
//! // 50.00 between 3 passengers → 16.67 each (half-up)
//! let share = Money::from_cents(5000).split_even(3);
//! assert_eq!(share.cents(), 1667);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (piastres for EGP).
///
/// ## Design Decisions
/// - **i64 (signed)**: Differences such as `paid − fare` may go negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serde**: serialized as the bare integer, so snapshots store cents
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  cost_per_person ──┬──► total_cost (× capacity)                        │
/// │                    │                                                    │
/// │                    └──► change owed (paid − fare)                       │
/// │                                                                         │
/// │  payment amount ──► split_even(n) ──► Passenger.paid                    │
/// │                                                                         │
/// │  Passenger.paid ──► total_collected / total_remaining                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use ojra_core::money::Money;
    ///
    /// let fare = Money::from_cents(1050); // 10.50
    /// assert_eq!(fare.cents(), 1050);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Divides the amount into `parts` equal shares, rounding half away from zero.
    ///
    /// This is the `round2(amount / n)` step of payment splitting. The shares
    /// do not necessarily add back up to the original amount; the settlement
    /// engine assigns the difference to the payer.
    ///
    /// ## Example
    /// ```rust
    /// use ojra_core::money::Money;
    ///
    /// // 10.00 / 3 = 3.333.. → 3.33
    /// assert_eq!(Money::from_cents(1000).split_even(3).cents(), 333);
    /// // 0.05 / 2 = 0.025 → 0.03
    /// assert_eq!(Money::from_cents(5).split_even(2).cents(), 3);
    /// ```
    ///
    /// ## Panics
    /// Never: `parts == 0` returns the amount unchanged.
    pub fn split_even(&self, parts: u32) -> Money {
        if parts == 0 {
            return *self;
        }

        // Use i128 to prevent overflow on large amounts
        let n = parts as i128;
        let value = self.0 as i128;
        let magnitude = (value.abs() * 2 + n) / (2 * n);
        let share = if value < 0 { -magnitude } else { magnitude };
        Money(share as i64)
    }

    /// Multiplies money by a passenger count.
    ///
    /// ## Example
    /// ```rust
    /// use ojra_core::money::Money;
    ///
    /// let fare = Money::from_cents(1000);
    /// assert_eq!(fare.times(4).cents(), 4000);
    /// ```
    #[inline]
    pub const fn times(&self, count: u32) -> Self {
        Money(self.0 * count as i64)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses decimal text such as `"12"`, `"12.5"` or `"-3.75"`.
///
/// Digits beyond the second decimal place are rounded half away from zero,
/// which is `round(x * 100) / 100` done on the digits instead of a float.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal number", s.trim()),
        };

        let text = s.trim();
        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let digits: Vec<i64> = fraction
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(i64::from)
            .collect();
        let tenths = digits.first().copied().unwrap_or(0);
        let hundredths = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).map(|d| *d >= 5).unwrap_or(false);

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as a plain decimal, e.g. `12.50`.
///
/// ## Note
/// No currency symbol: the presentation layer owns localisation.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a passenger count.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: u32) -> Self {
        self.times(count)
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
