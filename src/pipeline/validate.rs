// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::{Config, PolicyKind};
use crate::utils::log;

/// Validate configuration and print the effective settings.
pub fn run_validate(config: &Config) -> Result<()> {
    log::header("Validating configuration");

    if let Err(e) = config.validate() {
        log::error(&format!("Configuration invalid: {}", e));
        return Err(e);
    }

    log::success("Configuration OK");
    log::sub_item(&format!("API base URL: {}", config.store.base_url()));
    log::sub_item(&format!("Tag: {}", config.sync.tag_name.trim()));
    log::sub_item(&format!("Policy: {}", config.sync.policy));
    if config.sync.policy == PolicyKind::Collection {
        match (config.sync.collection_id, config.sync.collection_title()) {
            (Some(id), _) => log::sub_item(&format!("Collection id: {}", id)),
            (None, Some(title)) => {
                log::sub_item(&format!("Collection title: \"{}\" (resolved at run time)", title))
            }
            (None, None) => {}
        }
    }
    log::sub_item(&format!(
        "Page limit: {}, max retries: {}",
        config.client.page_limit, config.client.max_retries
    ));
    if config.sync.dry_run {
        log::sub_item("Dry run: no tags will be written");
    }
    Ok(())
}
