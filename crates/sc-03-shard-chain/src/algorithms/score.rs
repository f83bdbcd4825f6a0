//! # Lazy Score Computation
//!
//! `score(genesis) = 0` and `score(c) = score(parent(c)) + 1`.
//!
//! ## Algorithm (fill then backfill)
//!
//! 1. Walk `c -> parent(c) -> ...` collecting hashes until one with a cached
//!    score is found.
//! 2. Walk the collected hashes oldest first, assigning
//!    `parent_score + 1` to each.
//!
//! The caller commits the returned fills to its cache. Cached scores are
//! never recomputed, so extending a scored chain costs O(1) and only the
//! first query below an unscored stretch pays for its depth.

use shared_types::Hash;
use tracing::debug;

/// Read access to the score cache and the parent links.
pub trait ScoreLookup {
    /// Cached score, if any.
    fn cached_score(&self, hash: &Hash) -> Option<u64>;

    /// Parent of a known collation.
    fn parent_of(&self, hash: &Hash) -> Option<Hash>;
}

/// Score of the requested collation plus every entry to cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreFill {
    /// Score of the requested collation.
    pub score: u64,
    /// Newly computed `(hash, score)` pairs, oldest ancestor first.
    pub fills: Vec<(Hash, u64)>,
}

/// Score of a known collation.
///
/// Returns `None` if the parent walk reaches a collation that is neither
/// cached nor linked to a parent.
pub fn score_of<L: ScoreLookup + ?Sized>(lookup: &L, hash: Hash) -> Option<ScoreFill> {
    let mut pending = Vec::new();
    let mut cursor = hash;

    let base = loop {
        if let Some(score) = lookup.cached_score(&cursor) {
            break score;
        }
        pending.push(cursor);
        cursor = lookup.parent_of(&cursor)?;
    };

    if !pending.is_empty() {
        debug!("[sc-03] Filling {} uncached scores", pending.len());
    }

    let mut score = base;
    let fills: Vec<(Hash, u64)> = pending
        .into_iter()
        .rev()
        .map(|h| {
            score += 1;
            (h, score)
        })
        .collect();

    Some(ScoreFill { score, fills })
}

/// Score of a new collation `child` built on `parent`.
pub fn score_child<L: ScoreLookup + ?Sized>(
    lookup: &L,
    parent: Hash,
    child: Hash,
) -> Option<ScoreFill> {
    let mut fill = score_of(lookup, parent)?;
    fill.score += 1;
    fill.fills.push((child, fill.score));
    Some(fill)
}
