//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{CatalogError, OfferBook, OfferCatalog, OfferSnapshot},
    checkout::{CheckoutError, CheckoutPolicy, CouponOutcome, PricingBreakdown, checkout_totals},
    coupons::{
        Coupon, CouponBook, CouponCode, CouponDirectory, CouponError, CouponGrant, validate_coupon,
    },
    discounts::{DiscountConfigError, DiscountError, DiscountRate},
    fixtures::{Fixture, FixtureError},
    flow::{CartSignature, CheckoutFlow, CheckoutStage, FlowError},
    offers::{ActiveWindow, Offer, OfferKey, OfferMeta, OfferTarget},
    products::{Category, CategoryKey, Product, ProductKey},
    receipt::{ReceiptError, write_receipt},
    resolver::{AppliedOffer, LinePricing, OfferScope, line_pricing},
};
