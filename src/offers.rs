//! Offers
//!
//! Administrator-configured, time-bounded discounts attached to a product or
//! a category.

use chrono::{DateTime, Utc};
use slotmap::new_key_type;

use crate::{
    discounts::{DiscountConfigError, DiscountRate},
    products::{CategoryKey, ProductKey},
};

new_key_type! {
    /// Offer Key
    pub struct OfferKey;
}

/// Offer display metadata
#[derive(Debug, Default)]
pub struct OfferMeta {
    /// Offer name shown on receipts
    pub name: String,
}

/// The catalog entity an offer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferTarget {
    /// Applies to every cart line for one product.
    Product(ProductKey),

    /// Applies to every cart line in one category.
    Category(CategoryKey),
}

/// The period in which an offer or coupon may apply, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl ActiveWindow {
    /// Create a window spanning `starts_at..=ends_at`.
    #[must_use]
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        Self { starts_at, ends_at }
    }

    /// Whether the given instant falls inside the window.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now <= self.ends_at
    }

    /// Start of the window.
    #[must_use]
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    /// End of the window.
    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }
}

/// A promotional offer on one product or one category.
#[derive(Debug, Clone, Copy)]
pub struct Offer<'a> {
    key: OfferKey,
    target: OfferTarget,
    rate: DiscountRate<'a>,
    window: ActiveWindow,
    enabled: bool,
}

impl<'a> Offer<'a> {
    /// Create a new offer.
    pub fn new(
        key: OfferKey,
        target: OfferTarget,
        rate: DiscountRate<'a>,
        window: ActiveWindow,
        enabled: bool,
    ) -> Self {
        Self {
            key,
            target,
            rate,
            window,
            enabled,
        }
    }

    /// Return the offer key.
    pub fn key(&self) -> OfferKey {
        self.key
    }

    /// Return the target this offer is attached to.
    pub fn target(&self) -> OfferTarget {
        self.target
    }

    /// Return the discount rate.
    pub fn rate(&self) -> DiscountRate<'a> {
        self.rate
    }

    /// Return the active window.
    pub fn window(&self) -> ActiveWindow {
        self.window
    }

    /// An offer only applies while it is enabled and inside its window.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.window.contains(now)
    }

    /// Check the offer record against its own invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountConfigError`] if the discount rate is malformed.
    pub fn validate(&self) -> Result<(), DiscountConfigError> {
        self.rate.validate()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use super::*;

    fn window_2026() -> ActiveWindow {
        let starts_at = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("valid start date");

        let ends_at = Utc
            .with_ymd_and_hms(2026, 12, 31, 23, 59, 59)
            .single()
            .expect("valid end date");

        ActiveWindow::new(starts_at, ends_at)
    }

    fn mid_2026() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0)
            .single()
            .expect("valid date")
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = window_2026();

        assert!(window.contains(window.starts_at()));
        assert!(window.contains(window.ends_at()));
        assert!(!window.contains(window.ends_at() + chrono::Duration::seconds(1)));
    }

    #[test]
    fn offer_is_live_inside_window() {
        let offer = Offer::new(
            OfferKey::default(),
            OfferTarget::Product(ProductKey::default()),
            DiscountRate::Percent(Decimal::from(10)),
            window_2026(),
            true,
        );

        assert!(offer.is_live(mid_2026()));
    }

    #[test]
    fn disabled_offer_is_never_live() {
        let offer = Offer::new(
            OfferKey::default(),
            OfferTarget::Product(ProductKey::default()),
            DiscountRate::Percent(Decimal::from(10)),
            window_2026(),
            false,
        );

        assert!(!offer.is_live(mid_2026()));
    }

    #[test]
    fn offer_outside_window_is_not_live() {
        let offer = Offer::new(
            OfferKey::default(),
            OfferTarget::Category(CategoryKey::default()),
            DiscountRate::Fixed(Money::from_minor(4_000, INR)),
            window_2026(),
            true,
        );

        let before = Utc
            .with_ymd_and_hms(2025, 12, 31, 23, 59, 59)
            .single()
            .expect("valid date");

        assert!(!offer.is_live(before));
    }

    #[test]
    fn validate_delegates_to_rate() -> TestResult {
        let valid = Offer::new(
            OfferKey::default(),
            OfferTarget::Product(ProductKey::default()),
            DiscountRate::Percent(Decimal::from(30)),
            window_2026(),
            true,
        );

        valid.validate()?;

        let invalid = Offer::new(
            OfferKey::default(),
            OfferTarget::Product(ProductKey::default()),
            DiscountRate::Percent(Decimal::from(130)),
            window_2026(),
            true,
        );

        assert!(invalid.validate().is_err());

        Ok(())
    }
}
