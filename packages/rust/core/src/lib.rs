//! Core pipeline orchestration and domain logic for internwatch.
//!
//! This crate ties together fetching, normalization, archiving, selection and
//! README publishing into one sync workflow ([`pipeline::sync_listings`]).

pub mod archive;
pub mod diff;
pub mod normalize;
pub mod pipeline;
pub mod select;
pub mod terms;

pub use archive::{Archive, MergeOutcome, MergeStats};
pub use diff::{SnapshotDiff, diff_snapshots};
pub use normalize::{normalize, normalize_all};
pub use pipeline::{
    ProgressReporter, PublishOutcome, Reconciled, SilentProgress, SyncReport, publish_readme,
    reconcile, sync_listings,
};
pub use select::{is_listable, select_current};
pub use terms::{UNPARSED_SORT_KEY, is_past_term, sort_key};
