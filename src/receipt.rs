//! Receipt

use std::io;

use decimal_percentage::Percentage;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use rusty_money::MoneyError;
use slotmap::{SecondaryMap, SlotMap};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    checkout::{CouponOutcome, PricingBreakdown},
    offers::{OfferKey, OfferMeta},
    products::{Product, ProductKey},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A cart line references a product missing from the catalog metadata.
    #[error("Missing product")]
    MissingProduct(ProductKey),

    /// IO error
    #[error("IO error")]
    Io,
}

/// Write a priced cart as an itemized table plus a summary block.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if a product is missing from the metadata map
/// or the output cannot be written.
pub fn write_receipt(
    mut out: impl io::Write,
    cart: &Cart<'_>,
    breakdown: &PricingBreakdown<'_>,
    products: &SlotMap<ProductKey, Product<'_>>,
    offer_meta: &SecondaryMap<OfferKey, OfferMeta>,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Qty", "Amount", "Discount", "Offer"]);

    for (idx, (line, pricing)) in cart.iter().zip(breakdown.lines()).enumerate() {
        let product = products
            .get(line.product())
            .ok_or(ReceiptError::MissingProduct(line.product()))?;

        let (discount_cell, offer_cell) = match pricing.applied() {
            Some(applied) => {
                let name = offer_meta
                    .get(applied.offer)
                    .map_or("<unknown>", |meta| meta.name.as_str());

                (format!("-{}", pricing.discount()), name.to_string())
            }
            None => (String::new(), String::new()),
        };

        builder.push_record([
            format!("#{:<3}", idx + 1),
            product.name.clone(),
            line.quantity().to_string(),
            format!("{}", pricing.line_amount()),
            discount_cell,
            offer_cell,
        ]);
    }

    write_receipt_table(&mut out, builder)?;
    write_receipt_summary(&mut out, breakdown)?;

    Ok(())
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Alignment::center());
    table.modify(Columns::new(3..5), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::Io)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    breakdown: &PricingBreakdown<'_>,
) -> Result<(), ReceiptError> {
    let offer_percent_points = percent_points(offer_savings_percent(breakdown));

    let mut rows: Vec<(String, String)> = vec![
        (
            " Subtotal:".to_string(),
            format!("{}", breakdown.subtotal()),
        ),
        (
            " Offer savings:".to_string(),
            format!("({offer_percent_points:.2}%) -{}", breakdown.offer_discount()),
        ),
        (" Tax:".to_string(), format!("{}", breakdown.tax())),
        (" Shipping:".to_string(), format!("{}", breakdown.shipping())),
    ];

    match breakdown.coupon() {
        CouponOutcome::Applied(grant) => rows.push((
            format!(" Coupon {}:", grant.coupon().code()),
            format!("-{}", grant.discount()),
        )),
        CouponOutcome::Rejected(reason) => {
            rows.push((" Coupon:".to_string(), format!("not applied ({reason})")));
        }
        CouponOutcome::NotRequested => {}
    }

    rows.push((" Total:".to_string(), format!("{}", breakdown.grand_total())));

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in rows {
        writeln!(out, "{label:>label_width$}  {value:>value_width$}")
            .map_err(|_err| ReceiptError::Io)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::Io)
}

/// Offer savings relative to the pre-discount subtotal.
fn offer_savings_percent(breakdown: &PricingBreakdown<'_>) -> Percentage {
    let savings_minor = breakdown.offer_discount().to_minor_units();
    let subtotal_minor = breakdown.subtotal().to_minor_units();

    if subtotal_minor == 0 {
        return Percentage::from(0.0);
    }

    let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
    let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

    Percentage::from(savings_dec / subtotal_dec)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::from_i64(100).unwrap_or(Decimal::ZERO)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use crate::{
        cart::CartLine,
        catalog::{OfferBook, OfferSnapshot},
        checkout::{CheckoutPolicy, checkout_totals},
        coupons::{Coupon, CouponBook, CouponCode},
        discounts::DiscountRate,
        offers::{ActiveWindow, OfferTarget},
        products::{Category, CategoryKey},
    };

    use super::*;

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

    struct Storefront<'a> {
        products: SlotMap<ProductKey, Product<'a>>,
        categories: SlotMap<CategoryKey, Category>,
        offers: OfferBook<'a>,
        coupons: CouponBook<'a>,
        cart: Cart<'a>,
    }

    fn storefront<'a>() -> Storefront<'a> {
        let mut categories = SlotMap::with_key();
        let apparel = categories.insert(Category {
            name: "Apparel".to_string(),
        });

        let mut products = SlotMap::with_key();

        let tshirt = products.insert(Product {
            name: "Graphic T-Shirt".to_string(),
            category: apparel,
            price: Money::from_minor(49_900, INR),
        });

        let hoodie = products.insert(Product {
            name: "Zip Hoodie".to_string(),
            category: apparel,
            price: Money::from_minor(129_900, INR),
        });

        let mut offers = OfferBook::new();

        offers.insert(
            OfferTarget::Category(apparel),
            DiscountRate::Percent(Decimal::from(10)),
            window_2026(),
            true,
            "10% off Apparel",
        );

        let mut coupons = CouponBook::new();

        coupons.insert(Coupon::new(
            CouponCode::new("FLAT100").expect("valid code"),
            "flat 100 off",
            DiscountRate::Fixed(Money::from_minor(10_000, INR)),
            Money::from_minor(50_000, INR),
            None,
            window_2026(),
            None,
            true,
        ));

        let cart = Cart::with_lines(
            [
                CartLine::with_size(tshirt, apparel, Money::from_minor(49_900, INR), 2, "M"),
                CartLine::new(hoodie, apparel, Money::from_minor(129_900, INR), 1),
            ],
            INR,
        )
        .expect("valid cart");

        Storefront {
            products,
            categories,
            offers,
            coupons,
            cart,
        }
    }

    #[test]
    fn write_receipt_renders_items_offers_and_summary() -> TestResult {
        let shop = storefront();

        let snapshot = OfferSnapshot::capture(&shop.offers, &shop.cart, mid_2026());
        let policy = CheckoutPolicy::standard(INR);

        let breakdown = checkout_totals(
            &shop.cart,
            &snapshot,
            &shop.coupons,
            &policy,
            Some("FLAT100"),
            mid_2026(),
        )?;

        let mut out = Vec::new();

        write_receipt(
            &mut out,
            &shop.cart,
            &breakdown,
            &shop.products,
            shop.offers.meta_map(),
        )?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Graphic T-Shirt"));
        assert!(output.contains("Zip Hoodie"));
        assert!(output.contains("10% off Apparel"));
        assert!(output.contains("Coupon FLAT100:"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("Total:"));
        // There are categories in the metadata even though the receipt only
        // names products.
        assert_eq!(shop.categories.len(), 1);

        Ok(())
    }

    #[test]
    fn write_receipt_notes_a_rejected_coupon() -> TestResult {
        let shop = storefront();

        let snapshot = OfferSnapshot::capture(&shop.offers, &shop.cart, mid_2026());
        let policy = CheckoutPolicy::standard(INR);

        let breakdown = checkout_totals(
            &shop.cart,
            &snapshot,
            &shop.coupons,
            &policy,
            Some("BOGUS"),
            mid_2026(),
        )?;

        let mut out = Vec::new();

        write_receipt(
            &mut out,
            &shop.cart,
            &breakdown,
            &shop.products,
            shop.offers.meta_map(),
        )?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("not applied"));

        Ok(())
    }

    #[test]
    fn write_receipt_errors_on_missing_product() -> TestResult {
        let shop = storefront();

        let snapshot = OfferSnapshot::capture(&shop.offers, &shop.cart, mid_2026());
        let policy = CheckoutPolicy::standard(INR);

        let breakdown = checkout_totals(
            &shop.cart,
            &snapshot,
            &shop.coupons,
            &policy,
            None,
            mid_2026(),
        )?;

        let empty_products = SlotMap::with_key();

        let result = write_receipt(
            Vec::new(),
            &shop.cart,
            &breakdown,
            &empty_products,
            shop.offers.meta_map(),
        );

        assert!(matches!(result, Err(ReceiptError::MissingProduct(_))));

        Ok(())
    }

    #[test]
    fn percent_points_converts_fractions() {
        let points = percent_points(Percentage::from(0.25));

        assert_eq!(points, Decimal::from_i64(25).expect("valid decimal"));
    }
}
