//! # `any`: first task to fulfill wins.
//!
//! - First fulfillment (in completion order) decides with that value.
//! - If every task rejects, decides with an [`AggregateError`] holding all
//!   errors in input order.

use super::{PolicyKind, Progress, SettlePolicy, Step};
use crate::{error::AggregateError, outcome::Outcome};

/// Short-circuits on the first fulfillment.
#[derive(Debug)]
pub struct AnyPolicy<E> {
    errors: Vec<Option<E>>,
}

impl<E> AnyPolicy<E> {
    /// Creates a policy for `total` tasks.
    pub fn new(total: usize) -> Self {
        Self {
            errors: std::iter::repeat_with(|| None).take(total).collect(),
        }
    }
}

impl<V, E> SettlePolicy<V, E> for AnyPolicy<E> {
    type Output = Result<V, AggregateError<E>>;

    fn kind(&self) -> PolicyKind {
        PolicyKind::Any
    }

    fn on_empty(self) -> Option<Self::Output> {
        Some(Err(AggregateError::new(Vec::new())))
    }

    fn on_settle(
        &mut self,
        index: usize,
        outcome: Outcome<V, E>,
        progress: Progress,
    ) -> Step<Self::Output> {
        match outcome {
            Outcome::Fulfilled(v) => Step::Decided(Ok(v)),
            Outcome::Rejected(e) => {
                if let Some(slot) = self.errors.get_mut(index) {
                    *slot = Some(e);
                }
                if progress.is_complete() {
                    let errors = self.errors.drain(..).flatten().collect();
                    Step::Decided(Err(AggregateError::new(errors)))
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

#[cfg(test)]
mod tests {
    use super::*;

    fn err(e: &'static str) -> Outcome<u8, &'static str> {
        Outcome::Rejected(e)
    }

    #[test]
    fn test_errors_in_input_order() {
        let mut p = AnyPolicy::new(2);
        assert_eq!(
            p.on_settle(1, err("second"), Progress { settled: 1, total: 2 }),
            Step::Continue
        );
        assert_eq!(
            p.on_settle(0, err("first"), Progress { settled: 2, total: 2 }),
            Step::Decided(Err(AggregateError::new(vec!["first", "second"])))
        );
    }

    #[test]
    fn test_fulfillment_ignores_earlier_rejections() {
        let mut p = AnyPolicy::new(3);
        assert_eq!(
            p.on_settle(0, err("x"), Progress { settled: 1, total: 3 }),
            Step::Continue
        );
        assert_eq!(
            p.on_settle(2, Outcome::<u8, _>::Fulfilled(9), Progress { settled: 2, total: 3 }),
            Step::Decided(Ok(9))
        );
    }

    #[test]
    fn test_empty_is_aggregate_with_no_errors() {
        let p = AnyPolicy::<()>::new(0);
        let out: Option<Result<u8, _>> = p.on_empty();
        assert!(matches!(out, Some(Err(e)) if e.is_empty()));
    }
}
