//! Checkout Example
//!
//! Prices a fixture cart against the live offers, optionally applies a
//! coupon code, and prints the receipt.
//!
//! Run with: `cargo run --example checkout -- --coupon SAVE10`

use anyhow::Result;
use chrono::Utc;
use clap::Parser;

use till::{
    catalog::OfferSnapshot,
    checkout::{CheckoutPolicy, CouponOutcome, checkout_totals},
    fixtures::Fixture,
    receipt::write_receipt,
    utils::DemoCheckoutArgs,
};

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = DemoCheckoutArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let cart = fixture.cart()?;
    let now = Utc::now();

    let offers = OfferSnapshot::capture(fixture.offer_book(), &cart, now);
    let policy = CheckoutPolicy::standard(cart.currency());

    let breakdown = checkout_totals(
        &cart,
        &offers,
        fixture.coupon_book(),
        &policy,
        args.coupon.as_deref(),
        now,
    )?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    write_receipt(
        &mut handle,
        &cart,
        &breakdown,
        fixture.product_meta_map(),
        fixture.offer_book().meta_map(),
    )?;

    if let CouponOutcome::Rejected(reason) = breakdown.coupon() {
        println!("Coupon was not applied: {reason}");
    }

    Ok(())
}
