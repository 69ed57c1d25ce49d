//! Discount resolution
//!
//! Picks the best applicable offer for each cart line by comparing the
//! product-level and category-level discounts.

use rusty_money::{Money, MoneyError, iso::Currency};

use crate::{
    cart::CartLine,
    catalog::OfferSnapshot,
    discounts::{DiscountError, DiscountRate, percent_of_minor},
    offers::OfferKey,
};

/// Where the winning offer was attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferScope {
    /// The product-level offer won.
    Product,

    /// The category-level offer won.
    Category,
}

/// The offer that won a line, recorded for receipt display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedOffer {
    /// Key of the winning offer
    pub offer: OfferKey,

    /// Whether the product- or category-level offer won
    pub scope: OfferScope,
}

/// Pricing of a single cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePricing<'a> {
    line_amount: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    applied: Option<AppliedOffer>,
}

impl<'a> LinePricing<'a> {
    /// The line amount before any discount.
    #[must_use]
    pub fn line_amount(&self) -> Money<'a, Currency> {
        self.line_amount
    }

    /// The applied offer discount, clamped to the line amount.
    #[must_use]
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// The offer that produced the discount, if any.
    #[must_use]
    pub fn applied(&self) -> Option<AppliedOffer> {
        self.applied
    }

    /// The line amount after its offer discount.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn discounted_amount(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.line_amount.sub(self.discount)
    }
}

/// Price one cart line against the captured offers.
///
/// The applied discount is the larger of the product- and category-level
/// discounts, clamped to `[0, line_amount]`. Exact ties go to the product
/// offer, the more specific match. Pure: re-run whenever price, quantity, or
/// catalog contents change.
///
/// # Errors
///
/// Returns a [`DiscountError`] if a discount cannot be safely represented in
/// minor units.
pub fn line_pricing<'a>(
    line: &CartLine<'a>,
    offers: &OfferSnapshot<'a>,
) -> Result<LinePricing<'a>, DiscountError> {
    let line_amount = line.amount();
    let line_minor = line_amount.to_minor_units();

    let product = offers
        .for_product(line.product())
        .map(|offer| Ok::<_, DiscountError>((offer.key(), rate_discount_minor(offer.rate(), line)?)))
        .transpose()?;

    let category = offers
        .for_category(line.category())
        .map(|offer| Ok::<_, DiscountError>((offer.key(), rate_discount_minor(offer.rate(), line)?)))
        .transpose()?;

    // Ties deliberately favour the product offer: it is the more specific
    // match, and the choice must be deterministic for receipts.
    let winner = match (product, category) {
        (Some((key, product_minor)), Some((_, category_minor)))
            if product_minor >= category_minor && product_minor > 0 =>
        {
            Some((key, OfferScope::Product, product_minor))
        }
        (_, Some((key, category_minor))) if category_minor > 0 => {
            Some((key, OfferScope::Category, category_minor))
        }
        (Some((key, product_minor)), _) if product_minor > 0 => {
            Some((key, OfferScope::Product, product_minor))
        }
        _ => None,
    };

    let (applied, discount_minor) = match winner {
        Some((offer, scope, minor)) => (
            Some(AppliedOffer { offer, scope }),
            minor.clamp(0, line_minor),
        ),
        None => (None, 0),
    };

    Ok(LinePricing {
        line_amount,
        discount: Money::from_minor(discount_minor, line_amount.currency()),
        applied,
    })
}

/// Discount one rate yields on a line, in minor units.
///
/// Percentage rates apply to the whole line amount; fixed rates apply per
/// unit and are capped at the line amount.
fn rate_discount_minor(rate: DiscountRate<'_>, line: &CartLine<'_>) -> Result<i64, DiscountError> {
    let line_minor = line.amount().to_minor_units();

    match rate {
        DiscountRate::Percent(points) => percent_of_minor(points, line_minor),
        DiscountRate::Fixed(amount) => {
            let per_unit_total = amount.to_minor_units() * i64::from(line.quantity());

            Ok(per_unit_total.min(line_minor))
        }
    }
}
