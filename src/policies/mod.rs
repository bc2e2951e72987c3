//! Settlement policies.
//!
//! A policy decides **when** a combinator stops waiting and **what** it
//! resolves with. Policies are pure state machines: the engine feeds them one
//! settlement at a time, in completion order, and stops at the first
//! [`Step::Decided`].
//!
//! ## Contents
//! - [`AllPolicy`]        first rejection, or every value in input order
//! - [`AllSettledPolicy`] every outcome in input order, never short-circuits
//! - [`AnyPolicy`]        first fulfillment, or every error in input order
//! - [`RacePolicy`]       first settlement of either kind
//!
//! ## Quick wiring
//! ```text
//! engine: for each settlement (index, outcome) in completion order
//!     settled += 1
//!     match policy.on_settle(index, outcome, Progress { settled, total }) {
//!         Step::Continue   => keep waiting
//!         Step::Decided(o) => resolve with o, discard later settlements
//!     }
//! empty input: policy.on_empty()  (None = never resolves)
//! ```

mod all;
mod all_settled;
mod any;
mod race;

pub use all::AllPolicy;
pub use all_settled::AllSettledPolicy;
pub use any::AnyPolicy;
pub use race::RacePolicy;

use std::fmt;

use crate::outcome::Outcome;

/// Identifies one of the built-in policies (used in events and logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    All,
    AllSettled,
    Any,
    Race,
}

impl PolicyKind {
    /// Returns a short stable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::All => "all",
            PolicyKind::AllSettled => "all_settled",
            PolicyKind::Any => "any",
            PolicyKind::Race => "race",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of feeding one settlement into a policy.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<T> {
    /// Keep waiting for more settlements.
    Continue,
    /// Stop waiting and resolve with this output.
    Decided(T),
}

/// Settled/total counters at the moment a settlement is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Settlements delivered so far, including the current one.
    pub settled: usize,
    /// Number of input tasks.
    pub total: usize,
}

impl Progress {
    /// True when every input task has settled.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.settled >= self.total
    }
}

/// Decision state machine driven by the settlement engine.
///
/// Implementations receive each task's outcome **at most once**, in completion
/// order, tagged with the task's input index. They must reconstruct any
/// aggregate in input order themselves.
pub trait SettlePolicy<V, E> {
    /// Value the combinator future resolves with.
    type Output;

    /// Policy identifier for events.
    fn kind(&self) -> PolicyKind;

    /// Output for an empty input collection.
    ///
    /// `None` means the combinator never resolves.
    fn on_empty(self) -> Option<Self::Output>;

    /// Feeds one settlement.
    fn on_settle(
        &mut self,
        index: usize,
        outcome: Outcome<V, E>,
        progress: Progress,
    ) -> Step<Self::Output>;

    /// Outcome label of the aggregate, for events.
    fn label(output: &Self::Output) -> &'static str;
}
