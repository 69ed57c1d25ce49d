//! Utils

use clap::Parser;

/// Arguments for the checkout demos
#[derive(Debug, Parser)]
pub struct DemoCheckoutArgs {
    /// Fixture set to use for the cart, offers and coupons
    #[clap(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Coupon code to apply at checkout
    #[clap(short, long)]
    pub coupon: Option<String>,
}
