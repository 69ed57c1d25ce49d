//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

new_key_type! {
    /// Category Key
    pub struct CategoryKey;
}

/// Catalog metadata for a product.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Category the product belongs to
    pub category: CategoryKey,

    /// Unit price
    pub price: Money<'a, Currency>,
}

/// Catalog metadata for a category.
#[derive(Debug, Clone)]
pub struct Category {
    /// Category name
    pub name: String,
}
