// src/services/reconciler.rs

//! Tag reconciliation.
//!
//! Compares the desired tag presence with a product's normalized tag list and
//! writes the complete list back only when they disagree.

use std::fmt;

use crate::client::CatalogClient;
use crate::error::Result;
use crate::models::{Product, Tags};

/// What reconciling one product did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    NoChange,
    TagAdded,
    TagRemoved,
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::NoChange => f.write_str("no change"),
            ReconcileOutcome::TagAdded => f.write_str("tag added"),
            ReconcileOutcome::TagRemoved => f.write_str("tag removed"),
        }
    }
}

/// The decision for one product: the outcome and the tag list to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlan {
    pub outcome: ReconcileOutcome,
    pub tags: Tags,
}

impl TagPlan {
    pub fn needs_write(&self) -> bool {
        self.outcome != ReconcileOutcome::NoChange
    }
}

/// Keeps one tag present exactly on qualifying products.
pub struct TagReconciler<'a> {
    client: &'a CatalogClient,
    tag: String,
    dry_run: bool,
}

impl<'a> TagReconciler<'a> {
    pub fn new(client: &'a CatalogClient, tag: impl Into<String>) -> Self {
        Self {
            client,
            tag: tag.into().trim().to_string(),
            dry_run: false,
        }
    }

    /// Decide outcomes without writing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Decide what `product`'s tags should become.
    pub fn plan(&self, product: &Product, qualifies: bool) -> TagPlan {
        let mut tags = Tags::parse(&product.tags);
        let has_tag = tags.contains(&self.tag);

        let outcome = match (qualifies, has_tag) {
            (true, false) if tags.insert(&self.tag) => ReconcileOutcome::TagAdded,
            (false, true) => {
                tags.remove(&self.tag);
                ReconcileOutcome::TagRemoved
            }
            _ => ReconcileOutcome::NoChange,
        };
        TagPlan { outcome, tags }
    }

    /// Bring `product`'s tags in line with `qualifies`, writing if needed.
    pub async fn reconcile(&self, product: &Product, qualifies: bool) -> Result<ReconcileOutcome> {
        let plan = self.plan(product, qualifies);
        if !plan.needs_write() {
            return Ok(plan.outcome);
        }

        if self.dry_run {
            log::debug!(
                "Dry run: would set tags of #{} to \"{}\"",
                product.id,
                plan.tags
            );
        } else {
            self.client.update_product_tags(product.id, &plan.tags).await?;
        }
        Ok(plan.outcome)
    }
}
