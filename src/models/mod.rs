// src/models/mod.rs

//! Domain models for the tag synchronizer.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod collection;
mod config;
mod product;
mod tags;

// Re-export all public types
pub use collection::{Collection, CollectionId, CollectionKind, ResolvedCollection};
pub use config::{
    ClientConfig, Config, LoggingConfig, MAX_PAGE_LIMIT, PolicyKind, StoreConfig, SyncConfig,
};
pub use product::{Product, ProductId, Variant};
pub use tags::{TAG_SEPARATOR, Tags, validate_tag};

/// Counters for one synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Products inspected
    pub scanned: usize,
    /// Products that gained the tag
    pub added: usize,
    /// Products that lost the tag
    pub removed: usize,
    /// Products already in the desired state
    pub unchanged: usize,
    /// Whether writes were suppressed
    pub dry_run: bool,
}

impl SyncReport {
    /// Number of products whose tags were (or would be) rewritten.
    pub fn changed(&self) -> usize {
        self.added + self.removed
    }
}
