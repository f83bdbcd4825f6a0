//! # Algorithms Module
//!
//! Lazy score computation and the bounded orphan queue.

pub mod parent_queue;
pub mod score;

pub use parent_queue::{ParentQueue, QueuedCollation};
pub use score::{score_child, score_of, ScoreFill, ScoreLookup};
