//! # SettleTally – track in-flight combinator runs
//!
//! Maintains the set of run ids that started but have not decided yet, plus a
//! counter of discarded late settlements.
//!
//! ## Internal scheme
//! ```text
//! on_event(ev):
//!   ├─ CombinatorStarted   && ev.run => insert(run)
//!   ├─ CombinatorDecided   && ev.run => remove(run), decided += 1
//!   ├─ SettlementDiscarded           => discarded += 1
//!   └─ otherwise: ignore
//!
//! in_flight() -> Vec<u64>  (sorted copy of the current set)
//! ```
//!
//! A run whose future was dropped before deciding stays in the set.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Tracks undecided runs and discarded settlements.
pub struct SettleTally {
    in_flight: RwLock<HashSet<u64>>,
    decided: AtomicU64,
    discarded: AtomicU64,
    capacity: usize,
}

impl SettleTally {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: RwLock::new(HashSet::new()),
            decided: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            capacity: 2048,
        }
    }

    /// Configure the queue capacity for this subscriber.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Returns a sorted snapshot of runs that have not decided yet.
    #[must_use]
    pub fn in_flight(&self) -> Vec<u64> {
        let g = self.in_flight.read().unwrap_or_else(PoisonError::into_inner);
        let mut v: Vec<u64> = g.iter().copied().collect();
        v.sort_unstable();
        v
    }

    /// Number of runs that reached a decision.
    #[must_use]
    pub fn decided(&self) -> u64 {
        self.decided.load(AtomicOrdering::Relaxed)
    }

    /// Number of settlements discarded after a decision.
    #[must_use]
    pub fn discarded(&self) -> u64 {
        self.discarded.load(AtomicOrdering::Relaxed)
    }
}

impl Default for SettleTally {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for SettleTally {
    async fn on_event(&self, ev: &Event) {
        match (ev.kind, ev.run) {
            (EventKind::CombinatorStarted, Some(run)) => {
                self.in_flight
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(run);
            }
            (EventKind::CombinatorDecided, Some(run)) => {
                self.in_flight
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&run);
                self.decided.fetch_add(1, AtomicOrdering::Relaxed);
            }
            (EventKind::SettlementDiscarded, _) => {
                self.discarded.fetch_add(1, AtomicOrdering::Relaxed);
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "settle_tally"
    }

    fn queue_capacity(&self) -> usize {
        self.capacity
    }
}
