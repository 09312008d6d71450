use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money counted in minor currency units (cents, won)
///
/// Prices are kept as plain integers so that ordinary arithmetic never
/// picks up binary-float drift. Percentage math goes through `Decimal`
/// and always rounds down to a whole minor unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Create an amount from a raw count of minor units
    pub const fn from_minor_units(amount: u64) -> Self {
        Money(amount)
    }

    /// Raw count of minor units
    pub const fn minor_units(self) -> u64 {
        self.0
    }

    /// Add two amounts, returning `None` on overflow
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Multiply by a unit count, returning `None` on overflow
    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(u64::from(quantity)).map(Money)
    }

    /// Subtract, stopping at zero instead of wrapping
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    /// `floor(self * rate / 100)` for an integer percentage rate
    ///
    /// Callers validate `rate` to `0..=100`, so the result never exceeds
    /// the original amount. The division is decimal, not float, and the
    /// result is truncated down to the whole minor unit.
    pub fn percentage(self, rate: u8) -> Money {
        let exact = Decimal::from(self.0) * Decimal::from(rate) / Decimal::from(100u32);
        // rate <= 100 keeps the floored value within u64 range
        Money(exact.floor().to_u64().unwrap_or(0))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error raised when a quantity fails validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Quantity must be at least 1")]
pub struct QuantityError;

/// A validated unit count, always at least 1
///
/// Cart lines and order lines never carry a zero quantity; an update to
/// zero deletes the line instead, outside this crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Create a quantity, rejecting zero
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            return Err(QuantityError);
        }
        Ok(Quantity(value))
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
