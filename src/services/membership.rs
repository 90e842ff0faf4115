// src/services/membership.rs

//! Snapshot of the products belonging to one collection.

use std::collections::HashSet;

use serde::Deserialize;

use crate::client::CatalogClient;
use crate::error::Result;
use crate::models::{CollectionId, ProductId};

#[derive(Deserialize)]
struct ProductRef {
    id: ProductId,
}

/// Product ids of a collection, captured once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipIndex {
    collection_id: CollectionId,
    members: HashSet<ProductId>,
}

impl MembershipIndex {
    /// List every product of the collection.
    ///
    /// Fails if any page fails; a partially listed collection is never
    /// returned.
    pub async fn build(client: &CatalogClient, collection_id: CollectionId) -> Result<Self> {
        let query = vec![
            ("fields".to_string(), "id".to_string()),
            ("collection_id".to_string(), collection_id.to_string()),
        ];
        let mut pages = client.paginate::<ProductRef>("products.json", query, "products");

        let mut members = HashSet::new();
        while let Some(page) = pages.next_page().await? {
            members.extend(page.into_iter().map(|p| p.id));
        }

        log::debug!(
            "Collection #{} has {} products across {} pages",
            collection_id,
            members.len(),
            pages.pages_fetched()
        );
        Ok(Self {
            collection_id,
            members,
        })
    }

    /// Build an index from known ids.
    pub fn from_ids(collection_id: CollectionId, ids: impl IntoIterator<Item = ProductId>) -> Self {
        Self {
            collection_id,
            members: ids.into_iter().collect(),
        }
    }

    pub fn collection_id(&self) -> CollectionId {
        self.collection_id
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
