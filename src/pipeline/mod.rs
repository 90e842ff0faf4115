//! Pipeline entry points for tag-sync operations.
//!
//! - `run_sync`: Reconcile the discount tag across the whole catalog
//! - `run_resolve`: Look up a collection id by title
//! - `run_validate`: Check configuration without touching the network

pub mod resolve;
pub mod sync;
pub mod validate;

pub use resolve::run_resolve;
pub use sync::{reconcile_catalog, run_sync};
pub use validate::run_validate;
