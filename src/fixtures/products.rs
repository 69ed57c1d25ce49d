//! Product Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::{Currency, EUR, GBP, INR, USD};
use serde::Deserialize;

use crate::fixtures::FixtureError;

/// Wrapper for categories and products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of category key -> category fixture
    pub categories: FxHashMap<String, CategoryFixture>,

    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Category Fixture
#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    /// Category name
    pub name: String,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Key of the category the product belongs to
    pub category: String,

    /// Product price (e.g., "499.00 INR")
    pub price: String,
}

/// Parse a price string (e.g., "499.00 INR") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "INR" => INR,
        "USD" => USD,
        "GBP" => GBP,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

/// Parse a percentage string in whole points (e.g., "10%" or "10")
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a decimal.
pub fn parse_percent_points(s: &str) -> Result<Decimal, FixtureError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed);

    digits
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPercent(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_reads_minor_units_and_currency() -> Result<(), FixtureError> {
        let (minor, currency) = parse_price("499.00 INR")?;

        assert_eq!(minor, 49_900);
        assert_eq!(currency, INR);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("499.00INR");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("499.00 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_percent_points_accepts_suffixed_and_bare_forms() -> Result<(), FixtureError> {
        assert_eq!(parse_percent_points("10%")?, Decimal::from(10));
        assert_eq!(parse_percent_points("10")?, Decimal::from(10));
        assert_eq!(parse_percent_points(" 12.5% ")?, Decimal::new(125, 1));

        Ok(())
    }

    #[test]
    fn parse_percent_points_rejects_invalid_input() {
        let result = parse_percent_points("ten percent");

        assert!(matches!(result, Err(FixtureError::InvalidPercent(_))));
    }
}
