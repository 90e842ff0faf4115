//! Service layer for the tag synchronizer.
//!
//! This module contains the business logic for:
//! - Collection title lookup (`CollectionResolver`)
//! - Collection membership snapshots (`MembershipIndex`)
//! - Discount eligibility rules (`QualificationRule`)
//! - Tag reconciliation (`TagReconciler`)

mod collections;
mod membership;
mod qualification;
mod reconciler;

pub use collections::CollectionResolver;
pub use membership::MembershipIndex;
pub use qualification::{
    CollectionMembershipRule, CompareAtPriceRule, QualificationRule, build_rule,
};
pub use reconciler::{ReconcileOutcome, TagPlan, TagReconciler};
