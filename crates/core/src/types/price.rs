//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as plain JSON numbers (both the product API and the stored
//! cart snapshot use them), but are held as [`Decimal`] so that line subtotals
//! and cart totals never pick up binary floating point error.

use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A unit price in the currency's standard unit (e.g., dollars, not cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from an amount in the smallest currency unit.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Whether the price is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Price of `quantity` units, saturating at the largest representable amount.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn format(&self, currency: CurrencyCode) -> String {
        format!("{}{:.2}", currency.symbol(), self.0.round_dp(2))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

/// Unknown currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported currency code: {0}")]
pub struct CurrencyCodeError(String);

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    BRL,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::BRL => "R$",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "BRL" => Ok(Self::BRL),
            _ => Err(CurrencyCodeError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_reads_json_numbers() {
        let price: Price = serde_json::from_str("179.9").unwrap();
        assert_eq!(price, Price::from_cents(17990));

        let whole: Price = serde_json::from_str("139").unwrap();
        assert_eq!(whole, Price::from_cents(13900));
    }

    #[test]
    fn test_price_writes_json_numbers() {
        let json = serde_json::to_string(&Price::from_cents(17990)).unwrap();
        assert_eq!(json, "179.9");
    }

    #[test]
    fn test_price_times_and_sum() {
        let unit = Price::from_cents(1999);
        assert_eq!(unit.times(3), Price::from_cents(5997));

        let total: Price = [Price::from_cents(100), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(350));
    }

    #[test]
    fn test_price_arithmetic_saturates() {
        let huge: Price = serde_json::from_str("50000000000000000000000000000").unwrap();

        let doubled = huge.times(2);
        assert!(doubled > huge);
        assert_eq!(doubled + huge, doubled);
        assert_eq!(doubled.times(u32::MAX), doubled);
    }

    #[test]
    fn test_price_is_negative() {
        assert!(Price::from_cents(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::from_cents(1).is_negative());
    }

    #[test]
    fn test_price_format() {
        assert_eq!(Price::from_cents(17990).format(CurrencyCode::USD), "$179.90");
        assert_eq!(Price::from_cents(5).format(CurrencyCode::BRL), "R$0.05");
    }

    #[test]
    fn test_currency_code_from_str() {
        assert_eq!("brl".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert_eq!(" EUR ".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
