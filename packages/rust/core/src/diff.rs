//! Id-level diff between the previous and the new current snapshot.
//!
//! Reporting only: the diff never changes what gets written.

use std::collections::HashSet;

use internwatch_shared::Posting;

/// Ids that entered or left the current listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// In the new snapshot, not in the previous one. New-snapshot order.
    pub added: Vec<String>,
    /// In the previous snapshot, not in the new one. Previous-snapshot order.
    pub removed: Vec<String>,
}

/// Compare snapshots by id set. Duplicate ids count once.
pub fn diff_snapshots(previous: &[Posting], current: &[Posting]) -> SnapshotDiff {
    let previous_ids: HashSet<&str> = previous.iter().map(|p| p.id.as_str()).collect();
    let current_ids: HashSet<&str> = current.iter().map(|p| p.id.as_str()).collect();

    SnapshotDiff {
        added: ids_missing_from(current, &previous_ids),
        removed: ids_missing_from(previous, &current_ids),
    }
}

/// Ids of `postings` absent from `other`, first occurrence only.
fn ids_missing_from(postings: &[Posting], other: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    postings
        .iter()
        .map(|p| p.id.as_str())
        .filter(|id| !other.contains(id) && seen.insert(*id))
        .map(str::to_string)
        .collect()
}
