//! # Money
//!
//! Fixed-point monetary values for the register.
//!
//! Every amount in the system is an `i64` count of the smallest currency
//! unit: 10.99 is stored as `1099`. Addition, comparison, and line math are
//! exact; floats never touch a price.
//!
//! ## Rounding Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line totals     unit × qty            exact, never rounded             │
//! │  Subtotals       Σ line totals         exact, never rounded             │
//! │  Percent off     subtotal × bps/10000  rounds HALF-UP, exactly once,    │
//! │                                        at the final discount value      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lotus_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price * 3;                // 32.97
//! let ten_percent = line.percent_of(1000);
//! assert_eq!(ten_percent.cents(), 330); // 3.297 rounds to 3.30
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// An amount of money in cents.
///
/// Signed because intermediates like `subtotal - discount` may dip below
/// zero before [`Money::clamp_non_negative`] is applied. Serializes as a
/// bare integer, so JSON carries cents directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Wraps a cent count.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// The raw cent count.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Major currency units, truncated toward zero (1099 → 10).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Minor units within the major unit, always 0..=99 (1099 → 99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// A percentage of this amount, rounded half-up.
    ///
    /// `bps` is the rate in basis points: 1000 is 10%, 825 is 8.25%. The
    /// product is widened to i128 so large subtotals cannot overflow, and
    /// the `+ 5000` term before the division rounds half-up. This is the
    /// only place percent math rounds.
    ///
    /// ```rust
    /// use lotus_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(20000).percent_of(1000).cents(), 2000);
    /// assert_eq!(Money::from_cents(1099).percent_of(500).cents(), 55); // 54.95 up
    /// ```
    pub fn percent_of(&self, bps: i64) -> Money {
        let value = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(value as i64)
    }

    /// Floors negative values at zero, for `total = max(0, subtotal - discount)`.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }
}

/// "10.99" / "-5.50" for logs. Currency symbol and locale belong to the
/// frontend, not here.
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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Line total: unit price × quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
