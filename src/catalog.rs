//! Offer catalog
//!
//! Read-only lookup of the live offer for a product or category, plus the
//! immutable per-computation snapshot the resolver prices against.

use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{SecondaryMap, SlotMap};
use thiserror::Error;
use tracing::warn;

use crate::{
    cart::{Cart, CartLine},
    discounts::DiscountRate,
    offers::{ActiveWindow, Offer, OfferKey, OfferMeta, OfferTarget},
    products::{CategoryKey, ProductKey},
};

/// Errors from offer catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backing store could not be reached.
    ///
    /// Treated as "no offer" by snapshot capture so checkout can proceed
    /// without promotions.
    #[error("offer catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only source of promotional offers.
///
/// `Ok(None)` is the expected, common case when nothing qualifies — not a
/// failure. Implementations must apply the enabled and active-window filters
/// themselves, and must skip records that fail [`Offer::validate`].
pub trait OfferCatalog<'a> {
    /// Returns the live offer for a product, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the backing store cannot be reached.
    fn offer_for_product(
        &self,
        product: ProductKey,
        now: DateTime<Utc>,
    ) -> Result<Option<&Offer<'a>>, CatalogError>;

    /// Returns the live offer for a category, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the backing store cannot be reached.
    fn offer_for_category(
        &self,
        category: CategoryKey,
        now: DateTime<Utc>,
    ) -> Result<Option<&Offer<'a>>, CatalogError>;
}

/// In-memory offer catalog, populated by the admin back office.
///
/// Holds at most one offer per product and per category; inserting a new
/// offer for the same target replaces the previous one.
#[derive(Debug, Default)]
pub struct OfferBook<'a> {
    offers: SlotMap<OfferKey, Offer<'a>>,
    meta: SecondaryMap<OfferKey, OfferMeta>,
    by_product: FxHashMap<ProductKey, OfferKey>,
    by_category: FxHashMap<CategoryKey, OfferKey>,
}

impl<'a> OfferBook<'a> {
    /// Create a new empty offer book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an offer, replacing any previous offer on the same target.
    pub fn insert(
        &mut self,
        target: OfferTarget,
        rate: DiscountRate<'a>,
        window: ActiveWindow,
        enabled: bool,
        name: impl Into<String>,
    ) -> OfferKey {
        let key = self
            .offers
            .insert_with_key(|key| Offer::new(key, target, rate, window, enabled));

        self.meta.insert(key, OfferMeta { name: name.into() });

        match target {
            OfferTarget::Product(product) => {
                self.by_product.insert(product, key);
            }
            OfferTarget::Category(category) => {
                self.by_category.insert(category, key);
            }
        }

        key
    }

    /// Get an offer by key.
    pub fn get(&self, key: OfferKey) -> Option<&Offer<'a>> {
        self.offers.get(key)
    }

    /// Get an offer's display metadata.
    pub fn meta(&self, key: OfferKey) -> Option<&OfferMeta> {
        self.meta.get(key)
    }

    /// Get the offer metadata map.
    pub fn meta_map(&self) -> &SecondaryMap<OfferKey, OfferMeta> {
        &self.meta
    }

    /// Resolve a target's offer, applying the live filter and skipping
    /// misconfigured records.
    fn live_offer(&self, key: Option<&OfferKey>, now: DateTime<Utc>) -> Option<&Offer<'a>> {
        let offer = self.offers.get(*key?)?;

        if !offer.is_live(now) {
            return None;
        }

        if let Err(err) = offer.validate() {
            warn!(%err, "skipping misconfigured offer");
            return None;
        }

        Some(offer)
    }
}

impl<'a> OfferCatalog<'a> for OfferBook<'a> {
    fn offer_for_product(
        &self,
        product: ProductKey,
        now: DateTime<Utc>,
    ) -> Result<Option<&Offer<'a>>, CatalogError> {
        Ok(self.live_offer(self.by_product.get(&product), now))
    }

    fn offer_for_category(
        &self,
        category: CategoryKey,
        now: DateTime<Utc>,
    ) -> Result<Option<&Offer<'a>>, CatalogError> {
        Ok(self.live_offer(self.by_category.get(&category), now))
    }
}

/// Immutable snapshot of the offers relevant to one cart.
///
/// Captured once per pricing computation: the distinct product and category
/// keys of the cart are each looked up exactly once, and the results joined
/// back onto the lines by the resolver. Admin edits to the catalog take
/// effect on the next capture, never mid-computation.
#[derive(Debug, Default)]
pub struct OfferSnapshot<'a> {
    product_offers: FxHashMap<ProductKey, Offer<'a>>,
    category_offers: FxHashMap<CategoryKey, Offer<'a>>,
}

impl<'a> OfferSnapshot<'a> {
    /// Capture the live offers for every distinct product and category in
    /// the cart.
    ///
    /// A failed lookup degrades that key to "no offer" (logged) so checkout
    /// can proceed without promotions rather than blocking the customer.
    pub fn capture(
        catalog: &impl OfferCatalog<'a>,
        cart: &Cart<'a>,
        now: DateTime<Utc>,
    ) -> Self {
        let products: FxHashSet<ProductKey> = cart.iter().map(CartLine::product).collect();
        let categories: FxHashSet<CategoryKey> = cart.iter().map(CartLine::category).collect();

        let mut snapshot = Self::default();

        for product in products {
            match catalog.offer_for_product(product, now) {
                Ok(Some(offer)) => {
                    snapshot.product_offers.insert(product, *offer);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%err, "product offer lookup failed; pricing without promotion");
                }
            }
        }

        for category in categories {
            match catalog.offer_for_category(category, now) {
                Ok(Some(offer)) => {
                    snapshot.category_offers.insert(category, *offer);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%err, "category offer lookup failed; pricing without promotion");
                }
            }
        }

        snapshot
    }

    /// The captured offer for a product, if any.
    pub fn for_product(&self, product: ProductKey) -> Option<&Offer<'a>> {
        self.product_offers.get(&product)
    }

    /// The captured offer for a category, if any.
    pub fn for_category(&self, category: CategoryKey) -> Option<&Offer<'a>> {
        self.category_offers.get(&category)
    }

    /// Number of offers captured, across both targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.product_offers.len() + self.category_offers.len()
    }

    /// Check if the snapshot captured no offers at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.product_offers.is_empty() && self.category_offers.is_empty()
    }
}
