//! Product and variant data structures.

use serde::{Deserialize, Serialize};

/// Stable identifier of a catalog product.
pub type ProductId = u64;

/// A catalog product as returned by the products listing.
///
/// Listings are requested with a field projection, so everything except the
/// id may be absent and falls back to an empty value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Raw comma-separated tag field
    #[serde(default, deserialize_with = "nullable_string")]
    pub tags: String,

    /// Sellable variants
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Whether any variant carries a non-blank compare-at price.
    pub fn has_compare_at_price(&self) -> bool {
        self.variants.iter().any(Variant::has_compare_at_price)
    }
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Variant {
    /// Variant identifier
    #[serde(default)]
    pub id: u64,

    /// "Was" price shown next to the current price, as a decimal string
    #[serde(default)]
    pub compare_at_price: Option<String>,
}

impl Variant {
    pub fn has_compare_at_price(&self) -> bool {
        self.compare_at_price
            .as_deref()
            .is_some_and(|price| !price.trim().is_empty())
    }
}

fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
