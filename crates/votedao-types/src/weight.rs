//! Fixed-point voting weight.
//!
//! Weights are token balances expressed in raw units with 18 decimal places,
//! the same precision the voting token reports through `balanceOf`.

use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// Voting weight in raw units (1 token = 10^18 raw).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Weight(u128);

impl Weight {
    pub const ZERO: Self = Self(0);

    /// Number of fractional decimal digits.
    pub const DECIMALS: u32 = 18;

    /// Raw units in one whole token.
    pub const UNIT: u128 = 1_000_000_000_000_000_000;

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// Weight of `tokens` whole tokens.
    pub const fn from_tokens(tokens: u64) -> Self {
        Self(tokens as u128 * Self::UNIT)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Split evenly across `parts` recipients, rounding down.
    ///
    /// The remainder is dropped, so `split_floor(k) * k <= self`.
    /// Returns `None` when `parts` is zero.
    pub fn split_floor(self, parts: usize) -> Option<Self> {
        if parts == 0 {
            return None;
        }
        Some(Self(self.0 / parts as u128))
    }

    /// Render as a decimal token amount, e.g. `1.5` or `100.0`.
    pub fn format_units(&self) -> String {
        let whole = self.0 / Self::UNIT;
        let frac = self.0 % Self::UNIT;
        if frac == 0 {
            return format!("{}.0", whole);
        }
        let digits = format!("{:018}", frac);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }

    /// Parse a decimal token amount such as `"12"`, `"0.25"` or `"1.000000000000000001"`.
    pub fn from_decimal_str(s: &str) -> Result<Self, TypesError> {
        let s = s.trim();
        let invalid = || TypesError::InvalidWeightString(s.to_string());

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > Self::DECIMALS as usize || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if s.ends_with('.') {
            return Err(invalid());
        }

        let whole: u128 = whole.parse().map_err(|_| TypesError::WeightOverflow)?;
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            // Right-pad to 18 digits so "5" means 0.5 rather than 5 raw.
            format!("{:0<18}", frac).parse()?
        };

        whole
            .checked_mul(Self::UNIT)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or(TypesError::WeightOverflow)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_units())
    }
}

impl fmt::Debug for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Weight({})", self.0)
    }
}

impl FromStr for Weight {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

impl From<u128> for Weight {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}
