//! # `all_settled`: wait for every task, record every outcome.
//!
//! Never short-circuits and never fails; each slot keeps its own outcome.

use super::{PolicyKind, Progress, SettlePolicy, Step};
use crate::outcome::Outcome;

/// Collects every outcome at its input index.
#[derive(Debug)]
pub struct AllSettledPolicy<V, E> {
    slots: Vec<Option<Outcome<V, E>>>,
}

impl<V, E> AllSettledPolicy<V, E> {
    /// Creates a policy for `total` tasks.
    pub fn new(total: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(total).collect(),
        }
    }
}

impl<V, E> SettlePolicy<V, E> for AllSettledPolicy<V, E> {
    type Output = Vec<Outcome<V, E>>;

    fn kind(&self) -> PolicyKind {
        PolicyKind::AllSettled
    }

    fn on_empty(self) -> Option<Self::Output> {
        Some(Vec::new())
    }

    fn on_settle(
        &mut self,
        index: usize,
        outcome: Outcome<V, E>,
        progress: Progress,
    ) -> Step<Self::Output> {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(outcome);
        }
        if progress.is_complete() {
            Step::Decided(self.slots.drain(..).flatten().collect())
        } else {
            Step::Continue
        }
    }

    fn label(_output: &Self::Output) -> &'static str {
        "fulfilled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_do_not_short_circuit() {
        let mut p = AllSettledPolicy::new(3);
        let at = |settled| Progress { settled, total: 3 };

        assert_eq!(p.on_settle(1, Outcome::Rejected("e1"), at(1)), Step::Continue);
        assert_eq!(p.on_settle(2, Outcome::Fulfilled(2), at(2)), Step::Continue);
        assert_eq!(
            p.on_settle(0, Outcome::Fulfilled(0), at(3)),
            Step::Decided(vec![
                Outcome::Fulfilled(0),
                Outcome::Rejected("e1"),
                Outcome::Fulfilled(2),
            ])
        );
    }
}
