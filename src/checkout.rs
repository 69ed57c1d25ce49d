//! Checkout
//!
//! Composes per-line offer resolution with coupon validation and the fixed
//! business rules (tax rate, shipping) into the final price breakdown.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::OfferSnapshot,
    coupons::{CouponDirectory, CouponError, CouponGrant, validate_coupon},
    discounts::{DiscountError, fraction_of_minor},
    resolver::{LinePricing, line_pricing},
};

/// Fixed business rules applied at checkout.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutPolicy<'a> {
    tax_rate: Decimal,
    free_shipping_over: Money<'a, Currency>,
    shipping_fee: Money<'a, Currency>,
}

impl<'a> CheckoutPolicy<'a> {
    /// Standard storefront policy: 18% flat tax, and a flat 100.00 shipping
    /// fee waived on subtotals strictly above 1000.00.
    #[must_use]
    pub fn standard(currency: &'static Currency) -> Self {
        Self {
            tax_rate: Decimal::new(18, 2),
            free_shipping_over: Money::from_minor(100_000, currency),
            shipping_fee: Money::from_minor(10_000, currency),
        }
    }

    /// Create a policy with explicit rules.
    #[must_use]
    pub fn new(
        tax_rate: Decimal,
        free_shipping_over: Money<'a, Currency>,
        shipping_fee: Money<'a, Currency>,
    ) -> Self {
        Self {
            tax_rate,
            free_shipping_over,
            shipping_fee,
        }
    }

    /// The flat tax rate as a fraction.
    #[must_use]
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Shipping charged for a given subtotal.
    ///
    /// The threshold is strict: a subtotal exactly at the threshold still
    /// pays the fee.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Money<'a, Currency>) -> Money<'a, Currency> {
        if subtotal.to_minor_units() > self.free_shipping_over.to_minor_units() {
            Money::from_minor(0, self.shipping_fee.currency())
        } else {
            self.shipping_fee
        }
    }
}

/// Outcome of the coupon step for one computation.
#[derive(Debug, Clone)]
pub enum CouponOutcome<'a> {
    /// No code was supplied.
    NotRequested,

    /// The code was accepted and grants a discount.
    Applied(CouponGrant<'a>),

    /// The code was rejected; checkout proceeds without a coupon discount
    /// and the caller reports the reason.
    Rejected(CouponError),
}

impl CouponOutcome<'_> {
    /// The coupon discount this outcome contributes, in minor units.
    fn discount_minor(&self) -> i64 {
        match self {
            CouponOutcome::Applied(grant) => grant.discount().to_minor_units(),
            CouponOutcome::NotRequested | CouponOutcome::Rejected(_) => 0,
        }
    }

    /// Whether a coupon was accepted.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, CouponOutcome::Applied(_))
    }

    /// The rejection reason, if the code was rejected.
    pub fn rejection(&self) -> Option<&CouponError> {
        match self {
            CouponOutcome::Rejected(err) => Some(err),
            CouponOutcome::NotRequested | CouponOutcome::Applied(_) => None,
        }
    }
}

/// The final itemized computation for a checkout.
///
/// Derived and disposable: recomputed whenever cart contents, the selected
/// coupon, or the offer catalog change.
#[derive(Debug, Clone)]
pub struct PricingBreakdown<'a> {
    lines: SmallVec<[LinePricing<'a>; 8]>,
    subtotal: Money<'a, Currency>,
    offer_discount: Money<'a, Currency>,
    tax: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
    coupon: CouponOutcome<'a>,
    coupon_discount: Money<'a, Currency>,
    grand_total: Money<'a, Currency>,
}

impl<'a> PricingBreakdown<'a> {
    /// Per-line pricings, in cart order.
    #[must_use]
    pub fn lines(&self) -> &[LinePricing<'a>] {
        &self.lines
    }

    /// Sum of line amounts before any discount.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total per-line offer discount.
    #[must_use]
    pub fn offer_discount(&self) -> Money<'a, Currency> {
        self.offer_discount
    }

    /// Tax computed from the pre-rounded subtotal.
    #[must_use]
    pub fn tax(&self) -> Money<'a, Currency> {
        self.tax
    }

    /// Shipping charged for this order.
    #[must_use]
    pub fn shipping(&self) -> Money<'a, Currency> {
        self.shipping
    }

    /// Outcome of the coupon step.
    pub fn coupon(&self) -> &CouponOutcome<'a> {
        &self.coupon
    }

    /// The coupon discount (zero unless a coupon was applied).
    #[must_use]
    pub fn coupon_discount(&self) -> Money<'a, Currency> {
        self.coupon_discount
    }

    /// Grand total: subtotal + tax + shipping − offer discount − coupon
    /// discount, clamped to zero.
    #[must_use]
    pub fn grand_total(&self) -> Money<'a, Currency> {
        self.grand_total
    }

    /// Total savings from offers and the coupon combined.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the addition fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.offer_discount.add(self.coupon_discount)
    }
}

/// Errors from assembling checkout totals.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Wrapped discount arithmetic error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Assemble the full price breakdown for a cart.
///
/// Offers apply first, per line; the coupon is validated against the
/// post-offer amount (`subtotal − offer_discount`). A rejected coupon leaves
/// the breakdown without a coupon discount and carries the tagged reason.
/// Supplying a code always replaces any previously applied coupon — coupons
/// never stack — and supplying `None` removes it.
///
/// Pure function of its inputs: identical cart, offers, coupons, policy,
/// code, and clock produce an identical breakdown, and line order never
/// changes the totals.
///
/// # Errors
///
/// Returns a [`CheckoutError`] if discount or money arithmetic cannot be
/// represented. A well-formed cart never fails.
pub fn checkout_totals<'a>(
    cart: &Cart<'a>,
    offers: &OfferSnapshot<'a>,
    coupons: &impl CouponDirectory<'a>,
    policy: &CheckoutPolicy<'a>,
    coupon_code: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PricingBreakdown<'a>, CheckoutError> {
    let currency = cart.currency();

    let mut lines: SmallVec<[LinePricing<'a>; 8]> = SmallVec::new();
    let mut subtotal_minor = 0i64;
    let mut offer_minor = 0i64;

    for line in cart.iter() {
        let pricing = line_pricing(line, offers)?;

        subtotal_minor += pricing.line_amount().to_minor_units();
        offer_minor += pricing.discount().to_minor_units();

        lines.push(pricing);
    }

    let subtotal = Money::from_minor(subtotal_minor, currency);
    let tax = Money::from_minor(fraction_of_minor(policy.tax_rate(), subtotal_minor)?, currency);
    let shipping = policy.shipping_for(subtotal);

    let coupon = match coupon_code {
        None => CouponOutcome::NotRequested,
        Some(code) => {
            let order_amount = Money::from_minor(subtotal_minor - offer_minor, currency);

            match validate_coupon(coupons, code, order_amount, now) {
                Ok(grant) => CouponOutcome::Applied(grant),
                Err(err) => CouponOutcome::Rejected(err),
            }
        }
    };

    let coupon_minor = coupon.discount_minor();

    let grand_minor = (subtotal_minor + tax.to_minor_units() + shipping.to_minor_units()
        - offer_minor
        - coupon_minor)
        .max(0);

    Ok(PricingBreakdown {
        lines,
        subtotal,
        offer_discount: Money::from_minor(offer_minor, currency),
        tax,
        shipping,
        coupon,
        coupon_discount: Money::from_minor(coupon_minor, currency),
        grand_total: Money::from_minor(grand_minor, currency),
    })
}
