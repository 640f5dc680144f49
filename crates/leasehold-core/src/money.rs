//! # Money
//!
//! Non-negative amounts backed by [`rust_decimal::Decimal`]. Rents, amenity
//! fees, expected and received payments all use [`Money`].
//!
//! ## Wire form
//!
//! Serialized as a decimal string with exactly two fraction digits
//! (`"1500.00"`). Deserialization goes through `Decimal`'s own serde support,
//! so strings and JSON numbers are both accepted; negative amounts and amounts
//! with more than two significant fraction digits are rejected.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const SCALE: u32 = 2;

/// A non-negative monetary amount with at most two fraction digits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// An amount of `minor` cents.
    pub fn from_minor(minor: u64) -> Self {
        Self(Decimal::from_i128_with_scale(i128::from(minor), SCALE))
    }

    /// An amount of whole units.
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    /// The amount in minor units, saturating at `u64::MAX`.
    pub fn minor_units(self) -> u64 {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.trunc().to_u64())
            .unwrap_or(u64::MAX)
    }

    /// Whether the amount is zero.
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Subtract, stopping at zero.
    pub fn saturating_sub(self, other: Money) -> Money {
        match self.0.checked_sub(other.0) {
            Some(d) if d > Decimal::ZERO => Money(d),
            _ => Money::ZERO,
        }
    }
}

impl TryFrom<Decimal> for Money {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value < Decimal::ZERO || value.normalize().scale() > SCALE {
            return Err(ValidationError::InvalidMoney(value.to_string()));
        }
        Ok(Money(value.abs()))
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Decimal {
        let mut d = value.0;
        d.rescale(SCALE);
        d
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Decimal::from(*self))
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| ValidationError::InvalidMoney(s.to_string()))?;
        Money::try_from(value).map_err(|_| ValidationError::InvalidMoney(s.to_string()))
    }
}
