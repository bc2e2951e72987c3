//! # `race`: first settlement of either kind wins.
//!
//! The winning outcome is relayed verbatim.
//!
//! ## Hazard
//! With an empty input there is nothing to settle: the combinator never resolves.
//! Callers that may pass an empty collection must bound the wait themselves
//! (e.g. with `tokio::time::timeout`).

use super::{PolicyKind, Progress, SettlePolicy, Step};
use crate::outcome::Outcome;

/// Decides on the very first settlement.
#[derive(Debug, Default, Clone, Copy)]
pub struct RacePolicy;

impl RacePolicy {
    pub fn new() -> Self {
        Self
    }
}

impl<V, E> SettlePolicy<V, E> for RacePolicy {
    type Output = Outcome<V, E>;

    fn kind(&self) -> PolicyKind {
        PolicyKind::Race
    }

    fn on_empty(self) -> Option<Self::Output> {
        None
    }

    fn on_settle(
        &mut self,
        _index: usize,
        outcome: Outcome<V, E>,
        _progress: Progress,
    ) -> Step<Self::Output> {
        Step::Decided(outcome)
    }

    fn label(output: &Self::Output) -> &'static str {
        output.as_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_rejection_is_relayed() {
        let mut p = RacePolicy::new();
        let step = p.on_settle(0, Outcome::<u8, _>::Rejected("late"), Progress { settled: 1, total: 3 });
        assert_eq!(step, Step::Decided(Outcome::Rejected("late")));
    }

    #[test]
    fn test_empty_has_no_outcome() {
        assert!(SettlePolicy::<u8, ()>::on_empty(RacePolicy::new()).is_none());
    }
}
