//! Cart
//!
//! An immutable snapshot of the shopper's selections, validated at
//! construction so malformed lines never reach the pricing calculator.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::products::{CategoryKey, ProductKey};

/// Errors related to cart construction or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line has a quantity of zero (index).
    #[error("Line {0} has a quantity of zero")]
    ZeroQuantity(usize),

    /// A line has a negative unit price (index, minor units).
    #[error("Line {0} has a negative unit price of {1} minor units")]
    NegativePrice(usize, i64),

    /// A line was not found in the cart.
    #[error("Line {0} not found")]
    LineNotFound(usize),
}

/// One cart entry, snapshotted at selection time.
///
/// The authoritative stock and price belong to the catalog; the line records
/// what the shopper saw when they added it.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    product: ProductKey,
    category: CategoryKey,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    size: Option<String>,
}

impl<'a> CartLine<'a> {
    /// Create a new cart line with no selected size.
    #[must_use]
    pub fn new(
        product: ProductKey,
        category: CategoryKey,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            product,
            category,
            unit_price,
            quantity,
            size: None,
        }
    }

    /// Create a new cart line with a selected size.
    pub fn with_size(
        product: ProductKey,
        category: CategoryKey,
        unit_price: Money<'a, Currency>,
        quantity: u32,
        size: impl Into<String>,
    ) -> Self {
        Self {
            product,
            category,
            unit_price,
            quantity,
            size: Some(size.into()),
        }
    }

    /// Returns the product of the line.
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the category of the line's product.
    pub fn category(&self) -> CategoryKey {
        self.category
    }

    /// Returns the unit price of the line.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the quantity of the line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the selected size, if any.
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    /// The line amount before any discount: unit price times quantity.
    #[must_use]
    pub fn amount(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.unit_price.to_minor_units() * i64::from(self.quantity),
            self.unit_price.currency(),
        )
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line's currency differs from the cart
    /// currency, its quantity is zero, or its unit price is negative.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price().currency();

            if line_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if line.quantity() == 0 {
                return Err(CartError::ZeroQuantity(i));
            }

            if line.unit_price().to_minor_units() < 0 {
                return Err(CartError::NegativePrice(
                    i,
                    line.unit_price().to_minor_units(),
                ));
            }

            Ok(())
        })?;

        Ok(Cart { lines, currency })
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if money arithmetic fails.
    pub fn subtotal(&'a self) -> Result<Money<'a, Currency>, MoneyError> {
        self.lines
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, line| {
                acc.add(line.amount())
            })
    }

    /// Get a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::LineNotFound`] if the line is not found.
    pub fn get_line(&'a self, line: usize) -> Result<&'a CartLine<'a>, CartError> {
        self.lines.get(line).ok_or(CartError::LineNotFound(line))
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{INR, USD};
    use testresult::TestResult;

    use super::*;

    fn test_lines<'a>() -> [CartLine<'a>; 2] {
        [
            CartLine::new(
                ProductKey::default(),
                CategoryKey::default(),
                Money::from_minor(49_900, INR),
                2,
            ),
            CartLine::with_size(
                ProductKey::default(),
                CategoryKey::default(),
                Money::from_minor(129_900, INR),
                1,
                "M",
            ),
        ]
    }

    #[test]
    fn line_amount_is_price_times_quantity() {
        let line = CartLine::new(
            ProductKey::default(),
            CategoryKey::default(),
            Money::from_minor(49_900, INR),
            3,
        );

        assert_eq!(line.amount(), Money::from_minor(149_700, INR));
    }

    #[test]
    fn with_lines_currency_mismatch_errors() {
        let lines = [
            CartLine::new(
                ProductKey::default(),
                CategoryKey::default(),
                Money::from_minor(100, INR),
                1,
            ),
            CartLine::new(
                ProductKey::default(),
                CategoryKey::default(),
                Money::from_minor(100, USD),
                1,
            ),
        ];

        let result = Cart::with_lines(lines, INR);

        match result {
            Err(CartError::CurrencyMismatch(idx, line_currency, cart_currency)) => {
                assert_eq!(idx, 1);
                assert_eq!(line_currency, USD.iso_alpha_code);
                assert_eq!(cart_currency, INR.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn with_lines_rejects_zero_quantity() {
        let lines = [CartLine::new(
            ProductKey::default(),
            CategoryKey::default(),
            Money::from_minor(100, INR),
            0,
        )];

        let result = Cart::with_lines(lines, INR);

        assert!(matches!(result, Err(CartError::ZeroQuantity(0))));
    }

    #[test]
    fn with_lines_rejects_negative_price() {
        let lines = [CartLine::new(
            ProductKey::default(),
            CategoryKey::default(),
            Money::from_minor(-100, INR),
            1,
        )];

        let result = Cart::with_lines(lines, INR);

        assert!(matches!(result, Err(CartError::NegativePrice(0, -100))));
    }

    #[test]
    fn subtotal_sums_line_amounts() -> TestResult {
        let cart = Cart::with_lines(test_lines(), INR)?;

        assert_eq!(cart.subtotal()?, Money::from_minor(229_700, INR));

        Ok(())
    }

    #[test]
    fn subtotal_of_empty_cart_is_zero() -> TestResult {
        let cart = Cart::new(INR);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn get_line_returns_line() -> TestResult {
        let cart = Cart::with_lines(test_lines(), INR)?;
        let line = cart.get_line(1)?;

        assert_eq!(line.quantity(), 1);
        assert_eq!(line.size(), Some("M"));

        Ok(())
    }

    #[test]
    fn get_line_missing_returns_error() {
        let cart = Cart::new(INR);

        let err = cart.get_line(0).err();

        assert!(matches!(err, Some(CartError::LineNotFound(0))));
    }

    #[test]
    fn len_and_is_empty() -> TestResult {
        let empty = Cart::new(INR);
        let cart = Cart::with_lines(test_lines(), INR)?;

        assert!(empty.is_empty());
        assert!(!cart.is_empty());
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.currency(), INR);

        Ok(())
    }
}
