//! Collection data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a collection.
pub type CollectionId = u64;

/// A catalog collection, smart or custom.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collection {
    pub id: CollectionId,
    #[serde(default)]
    pub title: String,
}

impl Collection {
    /// Case-insensitive exact title comparison, ignoring surrounding whitespace.
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.trim().to_lowercase() == title.trim().to_lowercase()
    }
}

/// The two collection resources of the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Rule-based collection with computed membership
    Smart,
    /// Manually curated collection
    Custom,
}

impl CollectionKind {
    /// Lookup order used when resolving a title.
    pub const SEARCH_ORDER: [CollectionKind; 2] = [CollectionKind::Smart, CollectionKind::Custom];

    /// Listing endpoint, relative to the API base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            CollectionKind::Smart => "smart_collections.json",
            CollectionKind::Custom => "custom_collections.json",
        }
    }

    /// JSON key holding the listing items.
    pub fn root_key(&self) -> &'static str {
        match self {
            CollectionKind::Smart => "smart_collections",
            CollectionKind::Custom => "custom_collections",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Smart => f.write_str("smart"),
            CollectionKind::Custom => f.write_str("custom"),
        }
    }
}

/// A collection found by title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCollection {
    pub id: CollectionId,
    pub title: String,
    pub kind: CollectionKind,
}
