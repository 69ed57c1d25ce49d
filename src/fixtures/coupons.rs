//! Coupon Fixtures

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponCode},
    fixtures::{
        FixtureError,
        offers::{RateFixture, enabled_default},
        products::parse_price,
    },
    offers::ActiveWindow,
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of coupon code -> coupon fixture
    pub coupons: FxHashMap<String, CouponFixture>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Coupon description
    pub description: String,

    /// Discount configuration
    pub discount: RateFixture,

    /// Minimum purchase amount (e.g., "100.00 INR")
    pub min_purchase: String,

    /// Maximum discount cap, meaningful for percentage rates
    #[serde(default)]
    pub max_discount: Option<String>,

    /// Start of the active window
    pub starts_at: DateTime<Utc>,

    /// End of the active window
    pub ends_at: DateTime<Utc>,

    /// Redemption limit
    #[serde(default)]
    pub usage_limit: Option<u64>,

    /// Active flag (defaults to true)
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

impl CouponFixture {
    /// Convert to a [`Coupon`] under the given code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code, rate, or amounts cannot be parsed.
    pub fn try_into_coupon(self, code: &str) -> Result<Coupon<'static>, FixtureError> {
        let code = CouponCode::new(code)?;
        let rate = self.discount.try_into_rate()?;

        let (min_minor, min_currency) = parse_price(&self.min_purchase)?;
        let min_purchase = Money::from_minor(min_minor, min_currency);

        let max_discount = self
            .max_discount
            .map(|amount| {
                let (minor, currency) = parse_price(&amount)?;
                Ok::<_, FixtureError>(Money::from_minor(minor, currency))
            })
            .transpose()?;

        Ok(Coupon::new(
            code,
            self.description,
            rate,
            min_purchase,
            max_discount,
            ActiveWindow::new(self.starts_at, self.ends_at),
            self.usage_limit,
            self.enabled,
        ))
    }
}
