// src/services/qualification.rs

//! Rules deciding whether a product is discountable.

use crate::client::CatalogClient;
use crate::error::{AppError, Result};
use crate::models::{Config, PolicyKind, Product};
use crate::services::{CollectionResolver, MembershipIndex};

/// Decides, from catalog data alone, whether a product should carry the tag.
pub trait QualificationRule: Send + Sync {
    /// Short name used in reports.
    fn name(&self) -> &'static str;

    /// Product fields the rule reads, as a listing projection.
    fn product_fields(&self) -> &'static str;

    fn qualifies(&self, product: &Product) -> bool;
}

/// Products outside the reference collection are discountable.
#[derive(Debug, Clone)]
pub struct CollectionMembershipRule {
    index: MembershipIndex,
}

impl CollectionMembershipRule {
    pub fn new(index: MembershipIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &MembershipIndex {
        &self.index
    }
}

impl QualificationRule for CollectionMembershipRule {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn product_fields(&self) -> &'static str {
        "id,title,tags"
    }

    fn qualifies(&self, product: &Product) -> bool {
        !self.index.contains(product.id)
    }
}

/// Products with no compare-at price on any variant are discountable.
///
/// One marked-down variant opts the whole product out.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareAtPriceRule;

impl QualificationRule for CompareAtPriceRule {
    fn name(&self) -> &'static str {
        "compare_at_price"
    }

    fn product_fields(&self) -> &'static str {
        "id,title,tags,variants"
    }

    fn qualifies(&self, product: &Product) -> bool {
        !product.has_compare_at_price()
    }
}

/// Build the rule selected in `config`.
///
/// For the collection policy this resolves the collection title when no id
/// is configured, then lists the collection's members.
pub async fn build_rule(
    config: &Config,
    client: &CatalogClient,
) -> Result<Box<dyn QualificationRule>> {
    match config.sync.policy {
        PolicyKind::CompareAtPrice => Ok(Box::new(CompareAtPriceRule)),
        PolicyKind::Collection => {
            let collection_id = match (config.sync.collection_id, config.sync.collection_title()) {
                (Some(id), _) => id,
                (None, Some(title)) => CollectionResolver::new(client)
                    .resolve(title)
                    .await?
                    .map(|found| {
                        log::info!(
                            "Using {} collection \"{}\" (#{})",
                            found.kind,
                            found.title,
                            found.id
                        );
                        found.id
                    })
                    .ok_or_else(|| {
                        AppError::config(format!("no collection titled \"{title}\""))
                    })?,
                (None, None) => {
                    return Err(AppError::config(
                        "collection policy needs sync.collection_id or sync.collection_title",
                    ));
                }
            };

            let index = MembershipIndex::build(client, collection_id).await?;
            Ok(Box::new(CollectionMembershipRule::new(index)))
        }
    }
}
