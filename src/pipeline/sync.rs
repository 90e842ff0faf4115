// src/pipeline/sync.rs

//! Catalog-wide tag synchronization.

use futures::TryStreamExt;

use crate::client::CatalogClient;
use crate::error::Result;
use crate::models::{Config, Product, SyncReport, validate_tag};
use crate::services::{QualificationRule, ReconcileOutcome, TagReconciler, build_rule};
use crate::utils::log;

/// Run one full synchronization: build the configured rule, then walk the
/// catalog and reconcile every product.
pub async fn run_sync(config: &Config, client: &CatalogClient) -> Result<SyncReport> {
    validate_tag(&config.sync.tag_name)?;
    let tag = config.sync.tag_name.trim();
    log::header(&format!(
        "Syncing tag '{}' ({} policy{})",
        tag,
        config.sync.policy,
        if config.sync.dry_run { ", dry run" } else { "" }
    ));

    if config.sync.dry_run {
        log::warn("Dry run: changes are reported but not written");
    }

    log::step(1, 2, "Preparing qualification rule");
    let rule = build_rule(config, client).await?;

    log::step(2, 2, "Reconciling catalog tags");
    let reconciler = TagReconciler::new(client, tag).dry_run(config.sync.dry_run);
    let report = reconcile_catalog(client, rule.as_ref(), &reconciler).await?;

    log::summary(
        if report.dry_run {
            "Dry run complete (no tags written)"
        } else {
            "Sync complete"
        },
        &[
            ("Scanned", report.scanned.to_string()),
            ("Added", report.added.to_string()),
            ("Removed", report.removed.to_string()),
            ("Unchanged", report.unchanged.to_string()),
        ],
    );
    log::success(&format!(
        "Done. Added: {}, Removed: {}",
        report.added, report.removed
    ));

    Ok(report)
}

/// Walk every product once, in listing order, reconciling as we go.
///
/// Stops at the first error; products already written stay written.
pub async fn reconcile_catalog(
    client: &CatalogClient,
    rule: &dyn QualificationRule,
    reconciler: &TagReconciler<'_>,
) -> Result<SyncReport> {
    validate_tag(reconciler.tag())?;
    let query = vec![("fields".to_string(), rule.product_fields().to_string())];
    let products = client
        .paginate::<Product>("products.json", query, "products")
        .into_items();
    futures::pin_mut!(products);

    let mut report = SyncReport {
        dry_run: reconciler.is_dry_run(),
        ..SyncReport::default()
    };

    while let Some(product) = products.try_next().await? {
        report.scanned += 1;
        let qualifies = rule.qualifies(&product);

        match reconciler.reconcile(&product, qualifies).await? {
            ReconcileOutcome::TagAdded => {
                report.added += 1;
                log::success(&format!(
                    "Added '{}' → {} (#{})",
                    reconciler.tag(),
                    product.title,
                    product.id
                ));
            }
            ReconcileOutcome::TagRemoved => {
                report.removed += 1;
                log::info(&format!(
                    "✗ Removed '{}' → {} (#{})",
                    reconciler.tag(),
                    product.title,
                    product.id
                ));
            }
            ReconcileOutcome::NoChange => report.unchanged += 1,
        }
    }

    Ok(report)
}
