//! Corpus-aware deduplication.
//!
//! Seeded once from the persisted-corpus snapshot at run start; `commit`
//! tracks names accepted during the run so the result can never contain a
//! duplicate, even though the persisted corpus is stale until the
//! persistence collaborator appends the run's output.

use std::collections::HashSet;

/// Membership set over the corpus snapshot plus intra-run acceptances.
#[derive(Debug, Default)]
pub struct CorpusDedup {
    seen: HashSet<String>,
    snapshot_len: usize,
}

impl CorpusDedup {
    /// Build the set from the corpus snapshot. O(1) amortized membership
    /// regardless of corpus size.
    pub fn from_snapshot(corpus: impl IntoIterator<Item = String>) -> Self {
        let seen: HashSet<String> = corpus.into_iter().collect();
        let snapshot_len = seen.len();
        Self { seen, snapshot_len }
    }

    /// True if the candidate collides with neither the snapshot nor a name
    /// already committed this run.
    pub fn is_new(&self, candidate: &str) -> bool {
        !self.seen.contains(candidate)
    }

    /// Record an accepted name; returns false if it was already present.
    pub fn commit(&mut self, candidate: String) -> bool {
        self.seen.insert(candidate)
    }

    /// Size of the original snapshot.
    pub fn snapshot_len(&self) -> usize {
        self.snapshot_len
    }
}
