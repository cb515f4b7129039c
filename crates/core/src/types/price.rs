//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error returned when a price string cannot be parsed.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid price: {0}")]
pub struct PriceError(String);

/// A price in the store currency.
///
/// Deserialises from either a JSON number (`12.5`) or a string (`"12.50"`),
/// since the API is not consistent about which it sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Largest representable price. Arithmetic saturates here.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        *self * quantity
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map_or_else(|| saturate(self.0.is_sign_negative()), Self)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.0
            .checked_add(other.0)
            .map_or_else(|| saturate(self.0.is_sign_negative()), Self)
    }
}

const fn saturate(negative: bool) -> Price {
    if negative { Price(Decimal::MIN) } else { Price::MAX }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0.round_dp(2))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|_| PriceError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(1250).to_string(), "$12.50");
        assert_eq!(Price::from_cents(300).to_string(), "$3.00");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_times_quantity() {
        let unit = Price::from_cents(199);
        assert_eq!(unit.times(3), Price::from_cents(597));
        assert_eq!(unit.times(0), Price::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(250), Price::from_cents(199)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(449));
        assert_eq!(std::iter::empty::<Price>().sum::<Price>(), Price::ZERO);
    }

    #[test]
    fn test_overflow_saturates() {
        let huge: Price = serde_json::from_str("\"79228162514264337593543950335\"").unwrap();
        assert_eq!(huge.times(4), Price::MAX);
        assert_eq!(huge + Price::from_cents(1), Price::MAX);
        assert_eq!([huge, huge].into_iter().sum::<Price>(), Price::MAX);

        let debt = "-79228162514264337593543950335".parse::<Price>().unwrap();
        assert!(debt.times(2) < Price::ZERO);
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: Price = serde_json::from_str("12.5").unwrap();
        let from_string: Price = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("4.20".parse::<Price>().unwrap(), Price::from_cents(420));
        assert!("four".parse::<Price>().is_err());
    }
}
