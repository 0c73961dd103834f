//! The accumulating archive of every posting ever fetched, keyed by id.

use std::collections::HashMap;

use internwatch_shared::{Posting, RawPosting};
use tracing::debug;

use crate::normalize::normalize;

/// Result of merging one posting into the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The id was not in the archive; appended at the end.
    Inserted,
    /// The id existed and its record was replaced.
    Replaced,
    /// The id existed with an identical record.
    Unchanged,
}

/// Counts from merging a batch of fetched postings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    pub replaced: usize,
    pub unchanged: usize,
}

/// Insertion-ordered id → posting map.
///
/// Ids are never removed. Replacing an existing id keeps its position.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    records: Vec<Posting>,
    index: HashMap<String, usize>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a stored archive collection, normalizing each record.
    pub fn from_raw(raw: &[RawPosting]) -> Self {
        let mut archive = Self::new();
        for item in raw {
            archive.merge(normalize(item));
        }
        debug!(loaded = raw.len(), unique = archive.len(), "archive loaded");
        archive
    }

    /// Insert or overwrite by id. The incoming record always wins.
    pub fn merge(&mut self, posting: Posting) -> MergeOutcome {
        match self.index.get(&posting.id) {
            Some(&slot) if self.records[slot] == posting => MergeOutcome::Unchanged,
            Some(&slot) => {
                self.records[slot] = posting;
                MergeOutcome::Replaced
            }
            None => {
                self.index.insert(posting.id.clone(), self.records.len());
                self.records.push(posting);
                MergeOutcome::Inserted
            }
        }
    }

    /// Merge every posting in order, tallying the outcomes.
    pub fn merge_all<'a>(&mut self, postings: impl IntoIterator<Item = &'a Posting>) -> MergeStats {
        let mut stats = MergeStats::default();
        for posting in postings {
            match self.merge(posting.clone()) {
                MergeOutcome::Inserted => stats.inserted += 1,
                MergeOutcome::Replaced => stats.replaced += 1,
                MergeOutcome::Unchanged => stats.unchanged += 1,
            }
        }
        stats
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Posting> {
        self.index.get(id).map(|&slot| &self.records[slot])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[Posting] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Posting> {
        self.records
    }
}
