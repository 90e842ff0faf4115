// src/services/collections.rs

//! Collection title resolution.
//!
//! Titles are matched exactly (case-insensitive, trimmed) against smart
//! collections first and custom collections second.

use futures::TryStreamExt;

use crate::client::CatalogClient;
use crate::error::Result;
use crate::models::{Collection, CollectionKind, ResolvedCollection};

/// Field projection for collection listings.
const COLLECTION_FIELDS: &str = "id,title";

/// Looks up collections by title.
pub struct CollectionResolver<'a> {
    client: &'a CatalogClient,
}

impl<'a> CollectionResolver<'a> {
    pub fn new(client: &'a CatalogClient) -> Self {
        Self { client }
    }

    /// Find the collection whose title matches `title`.
    ///
    /// Smart collections win over custom ones; within a kind the first match
    /// in listing order wins.
    pub async fn resolve(&self, title: &str) -> Result<Option<ResolvedCollection>> {
        let wanted = title.trim();
        if wanted.is_empty() {
            return Ok(None);
        }

        for kind in CollectionKind::SEARCH_ORDER {
            if let Some(found) = self.find_in(kind, wanted).await? {
                log::debug!(
                    "Resolved collection {:?} to {} collection #{}",
                    wanted,
                    kind,
                    found.id
                );
                return Ok(Some(ResolvedCollection {
                    id: found.id,
                    title: found.title,
                    kind,
                }));
            }
        }

        log::debug!("No smart or custom collection titled {:?}", wanted);
        Ok(None)
    }

    async fn find_in(&self, kind: CollectionKind, title: &str) -> Result<Option<Collection>> {
        let query = vec![("fields".to_string(), COLLECTION_FIELDS.to_string())];
        let collections = self
            .client
            .paginate::<Collection>(kind.endpoint(), query, kind.root_key())
            .into_items();
        futures::pin_mut!(collections);

        while let Some(collection) = collections.try_next().await? {
            if collection.title_matches(title) {
                return Ok(Some(collection));
            }
        }
        Ok(None)
    }
}
