//! Discounts
//!
//! The shared discount vocabulary for offers and coupons: a rate is either a
//! whole-point percentage or a fixed amount of money.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors specific to discount arithmetic.
#[derive(Debug, Clone, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Ways a discount record can violate its own invariants.
///
/// A record failing these checks is excluded from resolution; it never grants
/// a discount and never aborts a pricing computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountConfigError {
    /// Percentages are whole points in `(0, 100]`.
    #[error("percentage must be in (0, 100], got {0}")]
    PercentOutOfRange(Decimal),

    /// Fixed amounts must be strictly positive.
    #[error("fixed discount amount must be positive, got {0} minor units")]
    NonPositiveAmount(i64),
}

/// How an offer or coupon reduces an amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscountRate<'a> {
    /// Percentage off, in whole percent points (`10` means 10%).
    Percent(Decimal),

    /// A fixed amount off. Offers apply this per unit, coupons per order.
    Fixed(Money<'a, Currency>),
}

impl DiscountRate<'_> {
    /// Check the rate against its own invariants.
    ///
    /// # Errors
    ///
    /// - [`DiscountConfigError::PercentOutOfRange`]: percentage outside `(0, 100]`.
    /// - [`DiscountConfigError::NonPositiveAmount`]: fixed amount of zero or less.
    pub fn validate(&self) -> Result<(), DiscountConfigError> {
        match self {
            DiscountRate::Percent(points) => {
                if *points <= Decimal::ZERO || *points > Decimal::ONE_HUNDRED {
                    Err(DiscountConfigError::PercentOutOfRange(*points))
                } else {
                    Ok(())
                }
            }
            DiscountRate::Fixed(amount) => {
                if amount.to_minor_units() <= 0 {
                    Err(DiscountConfigError::NonPositiveAmount(
                        amount.to_minor_units(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Calculate `points` percent of an amount in minor units.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation cannot be
/// safely represented in minor units.
pub fn percent_of_minor(points: Decimal, minor: i64) -> Result<i64, DiscountError> {
    fraction_of_minor(points / Decimal::ONE_HUNDRED, minor)
}

/// Calculate a decimal fraction of an amount in minor units, rounding
/// midpoints away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation cannot be
/// safely represented in minor units.
pub fn fraction_of_minor(fraction: Decimal, minor: i64) -> Result<i64, DiscountError> {
    let Some(minor) = Decimal::from_i64(minor) else {
        unreachable!("always returns `Some` for every `i64`")
    };

    let Some(applied) = fraction.checked_mul(minor) else {
        return Err(DiscountError::PercentConversion);
    };

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_i64().ok_or(DiscountError::PercentConversion)
}
