//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A bill typed as "1299.99" must stay exactly 1299.99 all the way       │
//! │  to the cashback ledger.                                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (cents / paise)                     │
//! │    "1299.99" ──parse_decimal──► 129999                                 │
//! │    No float ever touches the value.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rewardcart_core::money::{CashbackRate, Money};
//!
//! let bill = Money::parse_decimal("1299.99").unwrap();
//! assert_eq!(bill.cents(), 129999);
//!
//! let cashback = bill.cashback(CashbackRate::from_bps(500)); // 5%
//! assert_eq!(cashback.cents(), 6500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use thiserror::Error;
use ts_rs::TS;

/// Number of fractional digits carried by `Money`.
pub const MINOR_DIGITS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed so that debits and refunds can be represented directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

/// Reasons decimal text cannot become `Money`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a number")]
    NotANumber,

    #[error("amount has more than {max} decimal places")]
    TooManyDecimals { max: u32 },

    #[error("amount is too large")]
    Overflow,
}

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units.
    ///
    /// ```rust
    /// use rewardcart_core::money::Money;
    /// assert_eq!(Money::from_major(25).cents(), 2500);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Parses decimal text ("1299.5", "  42 ", "-3.10") into minor units.
    ///
    /// ## Rules
    /// - Optional leading `+` or `-`
    /// - Digits with at most one `.`; either side may be empty but not both
    /// - Trailing fractional zeros are ignored ("10.500" has one decimal place)
    /// - At most [`MINOR_DIGITS`] significant fractional digits
    /// - No exponents, no thousands separators
    ///
    /// ## Example
    /// ```rust
    /// use rewardcart_core::money::{Money, ParseMoneyError};
    ///
    /// assert_eq!(Money::parse_decimal("1000").unwrap().cents(), 100000);
    /// assert_eq!(Money::parse_decimal(".5").unwrap().cents(), 50);
    /// assert_eq!(
    ///     Money::parse_decimal("1.234"),
    ///     Err(ParseMoneyError::TooManyDecimals { max: 2 })
    /// );
    /// ```
    pub fn parse_decimal(text: &str) -> Result<Money, ParseMoneyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseMoneyError::NotANumber);
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseMoneyError::NotANumber);
        }

        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > MINOR_DIGITS as usize {
            return Err(ParseMoneyError::TooManyDecimals { max: MINOR_DIGITS });
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            // Leading zeros are fine; only the magnitude matters.
            let significant = whole.trim_start_matches('0');
            if significant.is_empty() {
                0
            } else {
                significant.parse().map_err(|_| ParseMoneyError::Overflow)?
            }
        };

        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => i64::from(fraction.as_bytes()[0] - b'0') * 10,
            _ => fraction.parse().map_err(|_| ParseMoneyError::NotANumber)?,
        };

        let cents = whole_value
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_value))
            .ok_or(ParseMoneyError::Overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Cashback earned on this amount, rounded half-up to a minor unit.
    ///
    /// ## Example
    /// ```rust
    /// use rewardcart_core::money::{CashbackRate, Money};
    ///
    /// // 10.10 at 2.5% = 0.2525 → 0.25
    /// let cashback = Money::from_cents(1010).cashback(CashbackRate::from_bps(250));
    /// assert_eq!(cashback.cents(), 25);
    /// ```
    pub fn cashback(&self, rate: CashbackRate) -> Money {
        // i128 keeps large bills from overflowing
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

/// Plain decimal rendering ("1299.99", "-5.50"). Currency symbols are a
/// presentation concern and are added by the region settings.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
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


// =============================================================================
// Cashback Rate
// =============================================================================

/// Cashback rate in basis points.
///
/// 1 basis point = 0.01%, so 500 bps = 5% back on a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashbackRate(u32);

impl CashbackRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CashbackRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for CashbackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(129999).to_string(), "1299.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse_whole_and_fraction() {
        assert_eq!(Money::parse_decimal("1000").unwrap().cents(), 100_000);
        assert_eq!(Money::parse_decimal("1000.5").unwrap().cents(), 100_050);
        assert_eq!(Money::parse_decimal("1000.05").unwrap().cents(), 100_005);
        assert_eq!(Money::parse_decimal("0.5").unwrap().cents(), 50);
        assert_eq!(Money::parse_decimal("5.").unwrap().cents(), 500);
        assert_eq!(Money::parse_decimal("  007.10 ").unwrap().cents(), 710);
        assert_eq!(Money::parse_decimal("-3.10").unwrap().cents(), -310);
        assert_eq!(Money::parse_decimal("+2").unwrap().cents(), 200);
    }

    #[test]
    fn test_parse_trailing_zeros_do_not_count_as_decimals() {
        assert_eq!(Money::parse_decimal("10.500").unwrap().cents(), 1050);
        assert_eq!(Money::parse_decimal("10.0000").unwrap().cents(), 1000);
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!(Money::parse_decimal(""), Err(ParseMoneyError::Empty));
        assert_eq!(Money::parse_decimal("   "), Err(ParseMoneyError::Empty));
        assert_eq!(Money::parse_decimal("."), Err(ParseMoneyError::NotANumber));
        assert_eq!(Money::parse_decimal("abc"), Err(ParseMoneyError::NotANumber));
        assert_eq!(Money::parse_decimal("1e3"), Err(ParseMoneyError::NotANumber));
        assert_eq!(Money::parse_decimal("1,000"), Err(ParseMoneyError::NotANumber));
        assert_eq!(Money::parse_decimal("1.2.3"), Err(ParseMoneyError::NotANumber));
        assert_eq!(
            Money::parse_decimal("9.999"),
            Err(ParseMoneyError::TooManyDecimals { max: 2 })
        );
        assert_eq!(
            Money::parse_decimal("99999999999999999999"),
            Err(ParseMoneyError::Overflow)
        );
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(b), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(b), None);

        let mut wallet = Money::zero();
        wallet += a;
        wallet -= b;
        assert_eq!(wallet.cents(), 500);
    }

    #[test]
    fn test_cashback_rounding() {
        let bill = Money::from_cents(1000);
        assert_eq!(bill.cashback(CashbackRate::from_bps(1000)).cents(), 100);
        // 10.00 at 8.25% = 0.825 → 0.83
        assert_eq!(bill.cashback(CashbackRate::from_bps(825)).cents(), 83);
        assert_eq!(bill.cashback(CashbackRate::default()).cents(), 0);
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(CashbackRate::from_bps(500).to_string(), "5%");
        assert_eq!(CashbackRate::from_bps(250).to_string(), "2.50%");
        assert!((CashbackRate::from_bps(825).percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_major(25).cents(), 2500);
    }
}
