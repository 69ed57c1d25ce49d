//! Fixtures
//!
//! Named YAML fixture sets for products, carts, offers, and coupons, used by
//! the demos and the integration tests.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    catalog::OfferBook,
    coupons::{CouponBook, CouponCodeError},
    fixtures::{
        carts::CartFixture,
        coupons::CouponsFixture,
        offers::{OffersFixture, TargetFixture},
        products::ProductsFixture,
    },
    offers::{ActiveWindow, OfferTarget},
    products::{Category, CategoryKey, Product, ProductKey},
};

pub mod carts;
pub mod coupons;
pub mod offers;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percent format
    #[error("Invalid percent format: {0}")]
    InvalidPercent(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Currency mismatch between fixture records
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// No cart lines loaded
    #[error("No cart lines loaded; cannot create cart")]
    NoLines,

    /// Malformed coupon code
    #[error(transparent)]
    Code(#[from] CouponCodeError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] crate::cart::CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// `SlotMaps` storing the actual catalog metadata with generated keys
    product_meta: SlotMap<ProductKey, Product<'a>>,
    category_meta: SlotMap<CategoryKey, Category>,

    /// String key -> `SlotMap` key mappings for lookups
    product_keys: FxHashMap<String, ProductKey>,
    category_keys: FxHashMap<String, CategoryKey>,

    /// Pre-built offer and coupon books
    offers: OfferBook<'a>,
    coupons: CouponBook<'a>,

    /// Pre-built cart lines (reference products by `ProductKey`)
    lines: Vec<CartLine<'a>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            product_meta: SlotMap::with_key(),
            category_meta: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            category_keys: FxHashMap::default(),
            offers: OfferBook::new(),
            coupons: CouponBook::new(),
            lines: Vec::new(),
            currency: None,
        }
    }

    /// Load categories and products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a product
    /// references a missing category, or there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (key, category_fixture) in fixture.categories {
            let category_key = self.category_meta.insert(Category {
                name: category_fixture.name,
            });

            self.category_keys.insert(key, category_key);
        }

        for (key, product_fixture) in fixture.products {
            let (minor_units, currency) = products::parse_price(&product_fixture.price)?;

            self.check_currency(currency)?;

            let category = self
                .category_keys
                .get(&product_fixture.category)
                .copied()
                .ok_or_else(|| FixtureError::CategoryNotFound(product_fixture.category.clone()))?;

            let product_key = self.product_meta.insert(Product {
                name: product_fixture.name,
                category,
                price: Money::from_minor(minor_units, currency),
            });

            self.product_keys.insert(key, product_key);
        }

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// referenced products don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for line_fixture in fixture.lines {
            let product_key = self
                .product_keys
                .get(&line_fixture.product)
                .copied()
                .ok_or_else(|| FixtureError::ProductNotFound(line_fixture.product.clone()))?;

            let product = self
                .product_meta
                .get(product_key)
                .ok_or_else(|| FixtureError::ProductNotFound(line_fixture.product.clone()))?;

            let line = match line_fixture.size {
                Some(size) => CartLine::with_size(
                    product_key,
                    product.category,
                    product.price,
                    line_fixture.quantity,
                    size,
                ),
                None => CartLine::new(
                    product_key,
                    product.category,
                    product.price,
                    line_fixture.quantity,
                ),
            };

            self.lines.push(line);
        }

        Ok(self)
    }

    /// Load offers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an offer
    /// targets a missing product or category.
    pub fn load_offers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("offers").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: OffersFixture = serde_norway::from_str(&contents)?;

        for (_key, offer_fixture) in fixture.offers {
            let target = match &offer_fixture.target {
                TargetFixture::Product { key } => OfferTarget::Product(
                    self.product_keys
                        .get(key)
                        .copied()
                        .ok_or_else(|| FixtureError::ProductNotFound(key.clone()))?,
                ),
                TargetFixture::Category { key } => OfferTarget::Category(
                    self.category_keys
                        .get(key)
                        .copied()
                        .ok_or_else(|| FixtureError::CategoryNotFound(key.clone()))?,
                ),
            };

            let window = ActiveWindow::new(offer_fixture.starts_at, offer_fixture.ends_at);
            let rate = offer_fixture.discount.try_into_rate()?;

            self.offers
                .insert(target, rate, window, offer_fixture.enabled, offer_fixture.name);
        }

        Ok(self)
    }

    /// Load coupons from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a coupon
    /// record is malformed.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CouponsFixture = serde_norway::from_str(&contents)?;

        for (code, coupon_fixture) in fixture.coupons {
            self.coupons.insert(coupon_fixture.try_into_coupon(&code)?);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, cart, offers, and coupons with
    /// the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_cart(name)?
            .load_offers(name)?
            .load_coupons(name)?;

        Ok(fixture)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'a>, FixtureError> {
        let product_key = self.product_key(key)?;

        self.product_meta
            .get(product_key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a category key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found.
    pub fn category_key(&self, key: &str) -> Result<CategoryKey, FixtureError> {
        self.category_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::CategoryNotFound(key.to_string()))
    }

    /// Get the loaded offer book
    pub fn offer_book(&self) -> &OfferBook<'a> {
        &self.offers
    }

    /// Get the loaded coupon book
    pub fn coupon_book(&self) -> &CouponBook<'a> {
        &self.coupons
    }

    /// Get the loaded coupon book, mutably (for redemption-count tests)
    pub fn coupon_book_mut(&mut self) -> &mut CouponBook<'a> {
        &mut self.coupons
    }

    /// Create a cart from the loaded lines
    ///
    /// # Errors
    ///
    /// Returns an error if no lines are loaded or if cart creation fails.
    pub fn cart(&self) -> Result<Cart<'a>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        if self.lines.is_empty() {
            return Err(FixtureError::NoLines);
        }

        Ok(Cart::with_lines(self.lines.clone(), currency)?)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Get the product metadata `SlotMap`
    pub fn product_meta_map(&self) -> &SlotMap<ProductKey, Product<'a>> {
        &self.product_meta
    }

    /// Get the category metadata `SlotMap`
    pub fn category_meta_map(&self) -> &SlotMap<CategoryKey, Category> {
        &self.category_meta
    }

    /// Validate currency consistency across loaded records.
    fn check_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        if let Some(existing) = self.currency {
            if existing != currency {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            self.currency = Some(currency);
        }

        Ok(())
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
