//! Non-negative prices and the "friendly" rounding used for price sliders.
//!
//! Prices are whole store-currency amounts in the seed catalog (for example
//! `25999`) but are kept as [`Decimal`] so fractional amounts survive
//! arithmetic unchanged. On the wire they are plain JSON numbers.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices can't be negative.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole amount.
    #[must_use]
    pub fn whole(amount: u64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Difference down to zero (never negative).
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// Round down to the nearest friendly slider step.
    #[must_use]
    pub fn round_down_friendly(self) -> Self {
        Self(round_down_friendly(self.0))
    }

    /// Round up to the nearest friendly slider step.
    #[must_use]
    pub fn round_up_friendly(self) -> Self {
        Self(round_up_friendly(self.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Slider step for a value: tens up to 100, hundreds up to 1 000, thousands
/// up to 10 000, fives of thousands up to 100 000, tens of thousands above.
fn friendly_step(value: Decimal) -> Decimal {
    if value <= Decimal::ONE_HUNDRED {
        Decimal::TEN
    } else if value <= Decimal::ONE_THOUSAND {
        Decimal::ONE_HUNDRED
    } else if value <= Decimal::from(10_000) {
        Decimal::ONE_THOUSAND
    } else if value <= Decimal::from(100_000) {
        Decimal::from(5_000)
    } else {
        Decimal::from(10_000)
    }
}

/// Round `value` down to its friendly step.
#[must_use]
pub fn round_down_friendly(value: Decimal) -> Decimal {
    let step = friendly_step(value);
    (value / step).floor() * step
}

/// Round `value` up to its friendly step.
#[must_use]
pub fn round_up_friendly(value: Decimal) -> Decimal {
    let step = friendly_step(value);
    (value / step).ceil() * step
}

/// An inclusive price range, as selected on the price slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest accepted price.
    pub min: Price,
    /// Highest accepted price.
    pub max: Price,
}

impl PriceRange {
    /// Create a range from its bounds.
    #[must_use]
    pub const fn new(min: Price, max: Price) -> Self {
        Self { min, max }
    }

    /// Whether `price` lies within the range (both ends inclusive).
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        price >= self.min && price <= self.max
    }

    /// Pull each end inside `bounds` if it lies outside.
    #[must_use]
    pub fn clamp_within(self, bounds: Self) -> Self {
        Self {
            min: self.min.max(bounds.min),
            max: self.max.min(bounds.max),
        }
    }

    /// Distance between the two ends (zero for inverted ranges).
    #[must_use]
    pub fn width(&self) -> Decimal {
        self.max.saturating_sub(self.min).amount()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(matches!(
            Price::new(dec(-1)),
            Err(PriceError::Negative(_))
        ));
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_friendly_rounding_steps() {
        assert_eq!(round_down_friendly(dec(57)), dec(50));
        assert_eq!(round_up_friendly(dec(57)), dec(60));
        assert_eq!(round_down_friendly(dec(799)), dec(700));
        assert_eq!(round_up_friendly(dec(701)), dec(800));
        assert_eq!(round_down_friendly(dec(9_450)), dec(9_000));
        assert_eq!(round_up_friendly(dec(9_450)), dec(10_000));
        assert_eq!(round_down_friendly(dec(12_599)), dec(10_000));
        assert_eq!(round_up_friendly(dec(25_999)), dec(30_000));
        assert_eq!(round_up_friendly(dec(109_999)), dec(110_000));
        assert_eq!(round_down_friendly(dec(109_999)), dec(100_000));
    }

    #[test]
    fn test_exact_steps_are_stable() {
        assert_eq!(round_down_friendly(dec(5_000)), dec(5_000));
        assert_eq!(round_up_friendly(dec(5_000)), dec(5_000));
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::whole(25_999);
        assert_eq!(serde_json::to_string(&price).unwrap(), "25999.0");
        let parsed: Price = serde_json::from_str("25999").unwrap();
        assert_eq!(parsed, price);
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = PriceRange::new(Price::whole(100), Price::whole(200));
        assert!(range.contains(Price::whole(100)));
        assert!(range.contains(Price::whole(200)));
        assert!(!range.contains(Price::whole(201)));
    }

    #[test]
    fn test_clamp_within_only_moves_outside_ends() {
        let bounds = PriceRange::new(Price::whole(1_000), Price::whole(50_000));
        let selected = PriceRange::new(Price::whole(0), Price::whole(20_000));
        let clamped = selected.clamp_within(bounds);
        assert_eq!(clamped.min, Price::whole(1_000));
        assert_eq!(clamped.max, Price::whole(20_000));
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::whole(10).times(3), Price::whole(5)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::whole(35));
        assert_eq!(Price::whole(5).saturating_sub(Price::whole(9)), Price::ZERO);
    }
}
