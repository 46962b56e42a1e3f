//! Money type for representing currency amounts
//!
//! Internally stores amounts in minor units (i64, e.g. cents) so that no
//! floating-point arithmetic ever touches a ledger amount. Conversions to the
//! two remote representations (budget milliunits, ledger decimal strings) are
//! exact or fail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minor units per major unit (cents per dollar)
const MINOR_PER_MAJOR: i64 = 100;

/// Budget API milliunits per minor unit
const MILLIUNITS_PER_MINOR: i64 = 10;

/// A signed monetary amount stored as minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from minor units
    ///
    /// # Examples
    /// ```
    /// use ledgerbridge::models::Money;
    /// let amount = Money::from_minor(1050); // 10.50
    /// assert_eq!(amount.to_decimal_string(), "10.50");
    /// ```
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in minor units
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Whole major units (truncated toward zero)
    pub const fn major_part(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// The minor-unit remainder (0-99)
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Convert a budget-API milliunit amount
    ///
    /// Returns `None` when the milliunits are not a whole number of minor
    /// units; such amounts cannot be carried without rounding.
    pub const fn from_milliunits(milliunits: i64) -> Option<Self> {
        if milliunits % MILLIUNITS_PER_MINOR != 0 {
            return None;
        }
        Some(Self(milliunits / MILLIUNITS_PER_MINOR))
    }

    /// The amount in budget-API milliunits, or `None` if it does not fit
    pub const fn to_milliunits(&self) -> Option<i64> {
        self.0.checked_mul(MILLIUNITS_PER_MINOR)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn checked_neg(self) -> Option<Self> {
        self.0.checked_neg().map(Self)
    }

    /// Split the absolute amount into two shares that sum to it exactly
    ///
    /// The first share carries the odd minor unit, so `1001` always splits
    /// into `(501, 500)`.
    pub const fn split_halves(&self) -> (Self, Self) {
        let total = self.0.abs();
        let smaller = total / 2;
        (Self(total - smaller), Self(smaller))
    }

    /// Parse a decimal string such as `"25.0"`, `"-10.50"` or `"7"`
    ///
    /// Fraction digits beyond the second are accepted only when they are
    /// zeros; anything else would need rounding and is rejected.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();
        let invalid = || MoneyParseError::InvalidFormat(s.to_string());

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if body.is_empty() {
            return Err(invalid());
        }

        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let (kept, dropped) = fraction.split_at(fraction.len().min(2));
        if dropped.bytes().any(|b| b != b'0') {
            return Err(MoneyParseError::TooPrecise(s.to_string()));
        }

        let major: i64 = whole.parse().map_err(|_| invalid())?;
        let minor: i64 = match kept.len() {
            0 => 0,
            1 => kept.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => kept.parse().map_err(|_| invalid())?,
        };

        let total = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(minor))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -total } else { total }))
    }

    /// Render as a plain decimal string (`"10.05"`, `"-3.20"`)
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major_part().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    TooPrecise(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::TooPrecise(s) => {
                write!(f, "Amount has sub-minor-unit precision: {}", s)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}
