//! Integration tests for per-line offer resolution.
//!
//! The resolver compares the product-level and category-level offer on each
//! line and applies whichever discounts more, clamped to the line amount.
//! Exact ties prefer the product offer — the more specific match — and that
//! policy is pinned here rather than left to incidental code order.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::INR};
use testresult::TestResult;

use till::{
    cart::{Cart, CartLine},
    catalog::{OfferBook, OfferSnapshot},
    discounts::DiscountRate,
    offers::{ActiveWindow, OfferTarget},
    products::{CategoryKey, ProductKey},
    resolver::{AppliedOffer, OfferScope, line_pricing},
};

fn mid_2026() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0)
        .single()
        .expect("valid date")
}

fn window_2026() -> ActiveWindow {
    ActiveWindow::new(
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("valid start date"),
        Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59)
            .single()
            .expect("valid end date"),
    )
}

fn product_key(id: u64) -> ProductKey {
    slotmap::KeyData::from_ffi(id).into()
}

fn category_key(id: u64) -> CategoryKey {
    slotmap::KeyData::from_ffi(id).into()
}

#[test]
fn twenty_percent_of_a_500_line_is_100() -> TestResult {
    let product = product_key(1);
    let category = category_key(1);

    let mut book = OfferBook::new();

    book.insert(
        OfferTarget::Product(product),
        DiscountRate::Percent(Decimal::from(20)),
        window_2026(),
        true,
        "20% off",
    );

    let cart = Cart::with_lines(
        [CartLine::new(product, category, Money::from_minor(50_000, INR), 1)],
        INR,
    )?;

    let snapshot = OfferSnapshot::capture(&book, &cart, mid_2026());
    let pricing = line_pricing(cart.get_line(0)?, &snapshot)?;

    assert_eq!(pricing.discount(), Money::from_minor(10_000, INR));

    Ok(())
}

#[test]
fn fixed_50_per_unit_on_quantity_3_is_150() -> TestResult {
    let product = product_key(1);
    let category = category_key(1);

    let mut book = OfferBook::new();

    book.insert(
        OfferTarget::Product(product),
        DiscountRate::Fixed(Money::from_minor(5_000, INR)),
        window_2026(),
        true,
        "50 off per unit",
    );

    let cart = Cart::with_lines(
        [CartLine::new(product, category, Money::from_minor(30_000, INR), 3)],
        INR,
    )?;

    let snapshot = OfferSnapshot::capture(&book, &cart, mid_2026());
    let pricing = line_pricing(cart.get_line(0)?, &snapshot)?;

    assert_eq!(pricing.discount(), Money::from_minor(15_000, INR));

    Ok(())
}

#[test]
fn the_larger_of_product_and_category_offer_wins() -> TestResult {
    let product = product_key(1);
    let category = category_key(1);

    let mut book = OfferBook::new();

    // On a 200.00 line: 30% (60.00) beats 40.00 fixed per unit.
    let product_offer = book.insert(
        OfferTarget::Product(product),
        DiscountRate::Percent(Decimal::from(30)),
        window_2026(),
        true,
        "30% off",
    );

    book.insert(
        OfferTarget::Category(category),
        DiscountRate::Fixed(Money::from_minor(4_000, INR)),
        window_2026(),
        true,
        "40 off per unit",
    );

    let cart = Cart::with_lines(
        [CartLine::new(product, category, Money::from_minor(20_000, INR), 1)],
        INR,
    )?;

    let snapshot = OfferSnapshot::capture(&book, &cart, mid_2026());
    let pricing = line_pricing(cart.get_line(0)?, &snapshot)?;

    assert_eq!(pricing.discount(), Money::from_minor(6_000, INR));
    assert_eq!(
        pricing.applied(),
        Some(AppliedOffer {
            offer: product_offer,
            scope: OfferScope::Product,
        })
    );

    Ok(())
}

#[test]
fn exact_ties_prefer_the_product_offer() -> TestResult {
    let product = product_key(1);
    let category = category_key(1);

    let mut book = OfferBook::new();

    let product_offer = book.insert(
        OfferTarget::Product(product),
        DiscountRate::Fixed(Money::from_minor(2_500, INR)),
        window_2026(),
        true,
        "25 off product",
    );

    book.insert(
        OfferTarget::Category(category),
        DiscountRate::Fixed(Money::from_minor(2_500, INR)),
        window_2026(),
        true,
        "25 off category",
    );

    let cart = Cart::with_lines(
        [CartLine::new(product, category, Money::from_minor(20_000, INR), 1)],
        INR,
    )?;

    let snapshot = OfferSnapshot::capture(&book, &cart, mid_2026());
    let pricing = line_pricing(cart.get_line(0)?, &snapshot)?;

    assert_eq!(
        pricing.applied(),
        Some(AppliedOffer {
            offer: product_offer,
            scope: OfferScope::Product,
        })
    );

    Ok(())
}

#[test]
fn every_line_discount_stays_within_the_line_amount() -> TestResult {
    let category = category_key(1);

    let mut book = OfferBook::new();

    book.insert(
        OfferTarget::Category(category),
        DiscountRate::Fixed(Money::from_minor(100_000, INR)),
        window_2026(),
        true,
        "1000 off per unit",
    );

    let lines = [
        CartLine::new(product_key(1), category, Money::from_minor(100, INR), 1),
        CartLine::new(product_key(2), category, Money::from_minor(49_900, INR), 2),
        CartLine::new(product_key(3), category, Money::from_minor(500_000, INR), 1),
    ];

    let cart = Cart::with_lines(lines, INR)?;
    let snapshot = OfferSnapshot::capture(&book, &cart, mid_2026());

    for line in cart.iter() {
        let pricing = line_pricing(line, &snapshot)?;
        let discount_minor = pricing.discount().to_minor_units();

        assert!(discount_minor >= 0, "discount must never be negative");
        assert!(
            discount_minor <= pricing.line_amount().to_minor_units(),
            "discount must never exceed the line amount"
        );
    }

    Ok(())
}

#[test]
fn lines_without_offers_price_at_full_amount() -> TestResult {
    let book = OfferBook::new();

    let cart = Cart::with_lines(
        [CartLine::new(
            product_key(1),
            category_key(1),
            Money::from_minor(49_900, INR),
            2,
        )],
        INR,
    )?;

    let snapshot = OfferSnapshot::capture(&book, &cart, mid_2026());
    let pricing = line_pricing(cart.get_line(0)?, &snapshot)?;

    assert_eq!(pricing.discount(), Money::from_minor(0, INR));
    assert_eq!(pricing.discounted_amount()?, pricing.line_amount());
    assert!(pricing.applied().is_none());

    Ok(())
}
