//! # Parent Queue
//!
//! Orphans keyed by the parent they wait for.
//!
//! - Children of one parent are released in arrival order.
//! - The queue holds at most `capacity` orphans; on overflow the oldest
//!   orphan is evicted.

use crate::domain::Collation;
use shared_types::Hash;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// An orphan and the vantage point it was submitted from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedCollation {
    /// Collation hash.
    pub hash: Hash,
    /// The orphan itself.
    pub collation: Collation,
    /// Main-chain block the collation was submitted under.
    pub vantage: Hash,
}

/// Bounded orphan queue.
#[derive(Debug)]
pub struct ParentQueue {
    waiting: BTreeMap<Hash, Vec<QueuedCollation>>,
    /// `(child, parent)` in arrival order.
    arrival: VecDeque<(Hash, Hash)>,
    /// Hashes in `arrival`, for membership checks.
    queued: BTreeSet<Hash>,
    capacity: usize,
}

impl ParentQueue {
    /// Empty queue holding at most `capacity` orphans.
    pub fn new(capacity: usize) -> Self {
        Self {
            waiting: BTreeMap::new(),
            arrival: VecDeque::new(),
            queued: BTreeSet::new(),
            capacity,
        }
    }

    /// Queue an orphan; returns the orphans evicted to make room.
    ///
    /// With zero capacity the new orphan itself is returned.
    pub fn push(&mut self, entry: QueuedCollation) -> Vec<QueuedCollation> {
        if self.capacity == 0 {
            return vec![entry];
        }

        let mut evicted = Vec::new();
        while self.arrival.len() >= self.capacity {
            match self.evict_oldest() {
                Some(old) => evicted.push(old),
                None => break,
            }
        }

        let parent = entry.collation.header.parent_collation_hash;
        self.arrival.push_back((entry.hash, parent));
        self.queued.insert(entry.hash);
        self.waiting.entry(parent).or_default().push(entry);
        evicted
    }

    /// Release every orphan waiting for `parent`, oldest first.
    pub fn take_children(&mut self, parent: &Hash) -> Vec<QueuedCollation> {
        let children = self.waiting.remove(parent).unwrap_or_default();
        if !children.is_empty() {
            self.arrival.retain(|(_, p)| p != parent);
            for child in &children {
                self.queued.remove(&child.hash);
            }
        }
        children
    }

    /// Remove one orphan.
    pub fn remove(&mut self, hash: &Hash) -> Option<QueuedCollation> {
        if !self.queued.remove(hash) {
            return None;
        }
        let position = self.arrival.iter().position(|(child, _)| child == hash)?;
        let (_, parent) = self.arrival.remove(position)?;
        self.detach(&parent, hash)
    }

    /// Remove every orphan matching `expired`, oldest first.
    pub fn prune<F>(&mut self, mut expired: F) -> Vec<QueuedCollation>
    where
        F: FnMut(&QueuedCollation) -> bool,
    {
        let doomed: Vec<Hash> = self
            .waiting
            .values()
            .flatten()
            .filter(|entry| expired(*entry))
            .map(|entry| entry.hash)
            .collect();

        let mut order: Vec<Hash> = self
            .arrival
            .iter()
            .map(|(child, _)| *child)
            .filter(|child| doomed.contains(child))
            .collect();
        order.dedup();

        order.iter().filter_map(|hash| self.remove(hash)).collect()
    }

    /// Orphans that pushing one more entry would evict, oldest first.
    pub fn eviction_candidates(&self) -> Vec<Hash> {
        let overflow = (self.arrival.len() + 1).saturating_sub(self.capacity);
        self.arrival
            .iter()
            .take(overflow)
            .map(|(child, _)| *child)
            .collect()
    }

    /// Every queued orphan, grouped by missing parent.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedCollation> {
        self.waiting.values().flatten()
    }

    /// Whether `hash` is queued.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.queued.contains(hash)
    }

    /// Maximum number of queued orphans.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued orphans.
    pub fn len(&self) -> usize {
        self.arrival.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.arrival.is_empty()
    }

    fn evict_oldest(&mut self) -> Option<QueuedCollation> {
        let (child, parent) = self.arrival.pop_front()?;
        self.queued.remove(&child);
        self.detach(&parent, &child)
    }

    fn detach(&mut self, parent: &Hash, child: &Hash) -> Option<QueuedCollation> {
        let siblings = self.waiting.get_mut(parent)?;
        let position = siblings.iter().position(|e| &e.hash == child)?;
        let entry = siblings.remove(position);
        if siblings.is_empty() {
            self.waiting.remove(parent);
        }
        Some(entry)
    }
}
