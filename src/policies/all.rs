//! # `all`: every task must fulfill.
//!
//! - First rejection (in completion order) decides with that error.
//! - Otherwise decides once every task settled, with values in input order.

use super::{PolicyKind, Progress, SettlePolicy, Step};
use crate::outcome::Outcome;

/// Short-circuits on the first rejection.
#[derive(Debug)]
pub struct AllPolicy<V> {
    values: Vec<Option<V>>,
}

impl<V> AllPolicy<V> {
    /// Creates a policy for `total` tasks.
    pub fn new(total: usize) -> Self {
        Self {
            values: std::iter::repeat_with(|| None).take(total).collect(),
        }
    }
}

impl<V, E> SettlePolicy<V, E> for AllPolicy<V> {
    type Output = Result<Vec<V>, E>;

    fn kind(&self) -> PolicyKind {
        PolicyKind::All
    }

    fn on_empty(self) -> Option<Self::Output> {
        Some(Ok(Vec::new()))
    }

    fn on_settle(
        &mut self,
        index: usize,
        outcome: Outcome<V, E>,
        progress: Progress,
    ) -> Step<Self::Output> {
        match outcome {
            Outcome::Rejected(e) => Step::Decided(Err(e)),
            Outcome::Fulfilled(v) => {
                if let Some(slot) = self.values.get_mut(index) {
                    *slot = Some(v);
                }
                if progress.is_complete() {
                    Step::Decided(Ok(self.values.drain(..).flatten().collect()))
                } else {
                    Step::Continue
                }
            }
        }
    }

    fn label(output: &Self::Output) -> &'static str {
        if output.is_ok() { "fulfilled" } else { "rejected" }
    }
}
