//! Coupons
//!
//! Code-activated discounts with eligibility rules, applied at most once per
//! order. Validation is a pure decision: it returns tagged results and leaves
//! presentation to the caller.

use std::fmt;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::warn;

use crate::{
    discounts::{DiscountConfigError, DiscountError, DiscountRate, percent_of_minor},
    offers::ActiveWindow,
};

/// A normalised coupon code: non-empty, uppercase, ASCII alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CouponCode(String);

/// Errors constructing a coupon code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponCodeError {
    /// Codes are non-empty ASCII alphanumerics.
    #[error("coupon codes must be non-empty ASCII alphanumerics, got {0:?}")]
    Malformed(String),
}

impl CouponCode {
    /// Parse and normalise a code. Lowercase input is accepted and
    /// uppercased, so comparison is effectively case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponCodeError`] if the code is empty or contains
    /// non-alphanumeric characters.
    pub fn new(code: &str) -> Result<Self, CouponCodeError> {
        let normalised = code.trim().to_ascii_uppercase();

        if normalised.is_empty() || !normalised.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(CouponCodeError::Malformed(code.to_string()));
        }

        Ok(Self(normalised))
    }

    /// The normalised code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A code-activated discount with eligibility rules.
#[derive(Debug, Clone)]
pub struct Coupon<'a> {
    code: CouponCode,
    description: String,
    rate: DiscountRate<'a>,
    min_purchase: Money<'a, Currency>,
    max_discount: Option<Money<'a, Currency>>,
    window: ActiveWindow,
    usage_limit: Option<u64>,
    enabled: bool,
}

impl<'a> Coupon<'a> {
    /// Create a new coupon.
    #[must_use]
    #[expect(clippy::too_many_arguments, reason = "flat admin record")]
    pub fn new(
        code: CouponCode,
        description: impl Into<String>,
        rate: DiscountRate<'a>,
        min_purchase: Money<'a, Currency>,
        max_discount: Option<Money<'a, Currency>>,
        window: ActiveWindow,
        usage_limit: Option<u64>,
        enabled: bool,
    ) -> Self {
        Self {
            code,
            description: description.into(),
            rate,
            min_purchase,
            max_discount,
            window,
            usage_limit,
            enabled,
        }
    }

    /// Return the coupon code.
    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    /// Return the coupon description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Return the discount rate.
    pub fn rate(&self) -> DiscountRate<'a> {
        self.rate
    }

    /// Return the minimum purchase amount.
    pub fn min_purchase(&self) -> &Money<'a, Currency> {
        &self.min_purchase
    }

    /// Return the maximum discount cap, if set. Only meaningful for
    /// percentage rates.
    pub fn max_discount(&self) -> Option<&Money<'a, Currency>> {
        self.max_discount.as_ref()
    }

    /// Return the redemption limit, if set.
    pub fn usage_limit(&self) -> Option<u64> {
        self.usage_limit
    }

    /// A coupon only applies while it is enabled and inside its window.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.window.contains(now)
    }

    /// Check the coupon record against its own invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountConfigError`] if the rate or the discount cap is
    /// malformed.
    pub fn validate(&self) -> Result<(), DiscountConfigError> {
        self.rate.validate()?;

        if let Some(cap) = &self.max_discount
            && cap.to_minor_units() <= 0
        {
            return Err(DiscountConfigError::NonPositiveAmount(cap.to_minor_units()));
        }

        Ok(())
    }
}

/// Rejection reasons from coupon validation.
///
/// All of these are recoverable at the UI boundary: the order simply proceeds
/// without a coupon discount, and the caller reports the reason.
#[derive(Debug, Clone, Error)]
pub enum CouponError {
    /// No coupon matches the supplied code.
    #[error("no coupon matches the supplied code")]
    NotFound,

    /// The coupon is disabled or outside its active window.
    #[error("the coupon is not currently active")]
    Inactive,

    /// The order amount is below the coupon's minimum purchase.
    #[error("order amount {actual} is below the coupon minimum of {required} (minor units)")]
    BelowMinimum {
        /// Minimum purchase in minor units
        required: i64,
        /// Order amount in minor units
        actual: i64,
    },

    /// The coupon's redemption limit has been reached.
    #[error("the coupon redemption limit has been reached")]
    UsageExceeded,

    /// Wrapped discount arithmetic error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Read-only source of coupons and their redemption counts.
///
/// Redemption counting is owned by the order pipeline; validation only
/// consumes the remaining-uses fact.
pub trait CouponDirectory<'a> {
    /// Look up a coupon by its normalised code.
    fn coupon(&self, code: &CouponCode) -> Option<&Coupon<'a>>;

    /// Number of times the coupon has been redeemed so far.
    fn redemptions(&self, code: &CouponCode) -> u64;
}

/// In-memory coupon directory, populated by the admin back office.
#[derive(Debug, Default)]
pub struct CouponBook<'a> {
    coupons: FxHashMap<CouponCode, Coupon<'a>>,
    redemptions: FxHashMap<CouponCode, u64>,
}

impl<'a> CouponBook<'a> {
    /// Create a new empty coupon book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a coupon, replacing any previous coupon with the same code.
    pub fn insert(&mut self, coupon: Coupon<'a>) {
        self.coupons.insert(coupon.code().clone(), coupon);
    }

    /// Record one redemption against a code.
    pub fn record_redemption(&mut self, code: &CouponCode) {
        *self.redemptions.entry(code.clone()).or_insert(0) += 1;
    }

    /// Number of registered coupons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Check if the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

impl<'a> CouponDirectory<'a> for CouponBook<'a> {
    fn coupon(&self, code: &CouponCode) -> Option<&Coupon<'a>> {
        self.coupons.get(code)
    }

    fn redemptions(&self, code: &CouponCode) -> u64 {
        self.redemptions.get(code).copied().unwrap_or(0)
    }
}

/// A validated coupon and the discount it grants.
#[derive(Debug, Clone)]
pub struct CouponGrant<'a> {
    coupon: Coupon<'a>,
    discount: Money<'a, Currency>,
}

impl<'a> CouponGrant<'a> {
    /// The coupon that was applied, snapshotted at validation time.
    pub fn coupon(&self) -> &Coupon<'a> {
        &self.coupon
    }

    /// The granted discount, clamped to the order amount.
    #[must_use]
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }
}

/// Validate a coupon code against an order amount.
///
/// The order amount is the subtotal minus already-applied offer discounts:
/// offers apply before the coupon. Checks run in a fixed order and stop at
/// the first failure: existence, active state, minimum purchase, redemption
/// limit. Percentage discounts are capped at the coupon's maximum discount
/// when set, and the final discount is clamped to `[0, order_amount]`.
///
/// A record that violates its own invariants is excluded from resolution and
/// reported as [`CouponError::NotFound`].
///
/// # Errors
///
/// Returns a [`CouponError`] naming the rejection reason.
pub fn validate_coupon<'a>(
    directory: &impl CouponDirectory<'a>,
    code: &str,
    order_amount: Money<'a, Currency>,
    now: DateTime<Utc>,
) -> Result<CouponGrant<'a>, CouponError> {
    // A code that cannot exist can only be unknown.
    let Ok(code) = CouponCode::new(code) else {
        return Err(CouponError::NotFound);
    };

    let Some(coupon) = directory.coupon(&code) else {
        return Err(CouponError::NotFound);
    };

    if let Err(err) = coupon.validate() {
        warn!(%err, %code, "skipping misconfigured coupon");
        return Err(CouponError::NotFound);
    }

    if !coupon.is_live(now) {
        return Err(CouponError::Inactive);
    }

    let order_minor = order_amount.to_minor_units();
    let min_minor = coupon.min_purchase().to_minor_units();

    if order_minor < min_minor {
        return Err(CouponError::BelowMinimum {
            required: min_minor,
            actual: order_minor,
        });
    }

    if let Some(limit) = coupon.usage_limit()
        && directory.redemptions(&code) >= limit
    {
        return Err(CouponError::UsageExceeded);
    }

    let raw_minor = match coupon.rate() {
        DiscountRate::Percent(points) => {
            let percent_minor = percent_of_minor(points, order_minor)?;

            match coupon.max_discount() {
                Some(cap) => percent_minor.min(cap.to_minor_units()),
                None => percent_minor,
            }
        }
        DiscountRate::Fixed(amount) => amount.to_minor_units(),
    };

    Ok(CouponGrant {
        coupon: coupon.clone(),
        discount: Money::from_minor(raw_minor.clamp(0, order_minor), order_amount.currency()),
    })
}
