//! Offer Fixtures

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    discounts::DiscountRate,
    fixtures::{
        FixtureError,
        products::{parse_percent_points, parse_price},
    },
};

/// Wrapper for offers in YAML
#[derive(Debug, Deserialize)]
pub struct OffersFixture {
    /// Map of offer key -> offer fixture
    pub offers: FxHashMap<String, OfferFixture>,
}

/// Offer fixture from YAML
#[derive(Debug, Deserialize)]
pub struct OfferFixture {
    /// Offer name shown on receipts
    pub name: String,

    /// Product or category the offer is attached to
    pub target: TargetFixture,

    /// Discount configuration
    pub discount: RateFixture,

    /// Start of the active window
    pub starts_at: DateTime<Utc>,

    /// End of the active window
    pub ends_at: DateTime<Utc>,

    /// Active flag (defaults to true)
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

/// Offer target from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetFixture {
    /// Product-level offer
    Product {
        /// Product fixture key
        key: String,
    },

    /// Category-level offer
    Category {
        /// Category fixture key
        key: String,
    },
}

/// Discount rate from YAML, shared by offer and coupon fixtures
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RateFixture {
    /// Percentage rate in whole points (e.g., "10%")
    Percent {
        /// Percent points
        points: String,
    },

    /// Fixed amount (e.g., "40.00 INR")
    Fixed {
        /// Money amount
        amount: String,
    },
}

impl RateFixture {
    /// Convert to a [`DiscountRate`]
    ///
    /// # Errors
    ///
    /// Returns an error if the points or amount string cannot be parsed.
    pub fn try_into_rate(self) -> Result<DiscountRate<'static>, FixtureError> {
        match self {
            RateFixture::Percent { points } => {
                Ok(DiscountRate::Percent(parse_percent_points(&points)?))
            }
            RateFixture::Fixed { amount } => {
                let (minor_units, currency) = parse_price(&amount)?;

                Ok(DiscountRate::Fixed(Money::from_minor(
                    minor_units,
                    currency,
                )))
            }
        }
    }
}

pub(super) fn enabled_default() -> bool {
    true
}
