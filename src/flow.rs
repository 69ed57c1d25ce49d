//! Checkout flow
//!
//! The stage machine around pricing: recompute freely while the shopper
//! browses, freeze the breakdown at submission, and discard stale
//! computations by cart signature.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use thiserror::Error;

use crate::{cart::Cart, checkout::PricingBreakdown};

/// Identity of one cart + coupon state.
///
/// Newer cart states win over older in-flight computations regardless of
/// arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSignature(u64);

impl CartSignature {
    /// Signature over the cart contents and the requested coupon code.
    #[must_use]
    pub fn of(cart: &Cart<'_>, coupon_code: Option<&str>) -> Self {
        let mut hasher = FxHasher::default();

        for line in cart.iter() {
            line.product().hash(&mut hasher);
            line.category().hash(&mut hasher);
            line.unit_price().to_minor_units().hash(&mut hasher);
            line.quantity().hash(&mut hasher);
            line.size().hash(&mut hasher);
        }

        coupon_code.hash(&mut hasher);

        CartSignature(hasher.finish())
    }
}

/// Errors from illegal stage transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// Submission requires a priced cart.
    #[error("cannot submit before a pricing pass has completed")]
    NotPriced,

    /// The breakdown is frozen once submitted.
    #[error("the order has already been submitted")]
    AlreadySubmitted,

    /// Confirmation and payment failure require a submitted order.
    #[error("the order has not been submitted")]
    NotSubmitted,
}

/// Stages of one checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutStage {
    /// Nothing priced yet.
    #[default]
    Idle,

    /// A breakdown is available and tracks the latest cart state.
    Priced,

    /// The breakdown is frozen as the order record.
    Submitted,

    /// Payment was captured.
    Confirmed,

    /// Payment was declined; the order keeps its frozen breakdown.
    PaymentFailed,
}

/// One checkout's progression from browsing to payment.
///
/// Repricing is allowed while idle or priced; once submitted the breakdown
/// used for the order record is frozen, even if offers or coupons later
/// change.
#[derive(Debug, Default)]
pub struct CheckoutFlow<'a> {
    stage: CheckoutStage,
    current: Option<CartSignature>,
    breakdown: Option<PricingBreakdown<'a>>,
}

impl<'a> CheckoutFlow<'a> {
    /// Create a new idle flow.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current stage.
    #[must_use]
    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// The latest installed breakdown, if any.
    pub fn breakdown(&self) -> Option<&PricingBreakdown<'a>> {
        self.breakdown.as_ref()
    }

    /// Note the newest cart state. Computations begun for older signatures
    /// will be discarded on arrival.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::AlreadySubmitted`] once the order is frozen.
    pub fn begin(&mut self, signature: CartSignature) -> Result<(), FlowError> {
        if self.is_frozen() {
            return Err(FlowError::AlreadySubmitted);
        }

        self.current = Some(signature);

        Ok(())
    }

    /// Install a computed breakdown.
    ///
    /// Returns `false` (dropping the breakdown) when it was computed for a
    /// cart state older than the latest [`CheckoutFlow::begin`] — last write
    /// wins on the cart signature, not on arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::AlreadySubmitted`] once the order is frozen.
    pub fn accept(
        &mut self,
        signature: CartSignature,
        breakdown: PricingBreakdown<'a>,
    ) -> Result<bool, FlowError> {
        if self.is_frozen() {
            return Err(FlowError::AlreadySubmitted);
        }

        if self.current != Some(signature) {
            return Ok(false);
        }

        self.breakdown = Some(breakdown);
        self.stage = CheckoutStage::Priced;

        Ok(true)
    }

    /// Freeze the current breakdown as the order record.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NotPriced`] before a pricing pass has completed,
    /// or [`FlowError::AlreadySubmitted`] on a repeated submit.
    pub fn submit(&mut self) -> Result<&PricingBreakdown<'a>, FlowError> {
        match self.stage {
            CheckoutStage::Priced => {
                self.stage = CheckoutStage::Submitted;
                self.breakdown.as_ref().ok_or(FlowError::NotPriced)
            }
            CheckoutStage::Idle => Err(FlowError::NotPriced),
            CheckoutStage::Submitted | CheckoutStage::Confirmed | CheckoutStage::PaymentFailed => {
                Err(FlowError::AlreadySubmitted)
            }
        }
    }

    /// Record a successful payment capture.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NotSubmitted`] unless the order was submitted.
    pub fn confirm(&mut self) -> Result<(), FlowError> {
        if self.stage != CheckoutStage::Submitted {
            return Err(FlowError::NotSubmitted);
        }

        self.stage = CheckoutStage::Confirmed;

        Ok(())
    }

    /// Record a declined payment. The frozen breakdown is kept for the order
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NotSubmitted`] unless the order was submitted.
    pub fn fail_payment(&mut self) -> Result<(), FlowError> {
        if self.stage != CheckoutStage::Submitted {
            return Err(FlowError::NotSubmitted);
        }

        self.stage = CheckoutStage::PaymentFailed;

        Ok(())
    }

    fn is_frozen(&self) -> bool {
        matches!(
            self.stage,
            CheckoutStage::Submitted | CheckoutStage::Confirmed | CheckoutStage::PaymentFailed
        )
    }
}
