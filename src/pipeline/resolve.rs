// src/pipeline/resolve.rs

use crate::client::CatalogClient;
use crate::error::{AppError, Result};
use crate::models::ResolvedCollection;
use crate::services::CollectionResolver;
use crate::utils::log;

/// Look up a collection by title and print its id.
pub async fn run_resolve(client: &CatalogClient, title: &str) -> Result<ResolvedCollection> {
    log::info(&format!("Looking up collection \"{}\"...", title.trim()));

    match CollectionResolver::new(client).resolve(title).await? {
        Some(found) => {
            log::success(&format!(
                "Found {} collection \"{}\"",
                found.kind, found.title
            ));
            log::sub_item(&format!("collection_id = {}", found.id));
            Ok(found)
        }
        None => {
            log::error(&format!("No collection titled \"{}\"", title.trim()));
            Err(AppError::config(format!(
                "no collection titled \"{}\"",
                title.trim()
            )))
        }
    }
}
