//! Error types used by the combinators and the timed tasks.
//!
//! This module defines:
//!
//! - [`AggregateError`]: the only error the combinators synthesize themselves,
//!   returned by [`any`](crate::any) when every task rejected.
//! - [`TaskError`]: errors raised by the timed tasks built from a
//!   [`TaskSpec`](crate::TaskSpec).
//!
//! Every other failure path relays the task's own error untouched.

use std::time::Duration;
use thiserror::Error;

/// # Every task rejected.
///
/// Holds one error per input task, in **input order** (not completion order).
/// An empty container means the input collection itself was empty.
///
/// # Example
/// ```
/// use tasksettle::AggregateError;
///
/// let err = AggregateError::new(vec!["a", "b"]);
/// assert_eq!(err.len(), 2);
/// assert_eq!(err.to_string(), "all 2 tasks rejected");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("all {} tasks rejected", .errors.len())]
pub struct AggregateError<E> {
    errors: Vec<E>,
}

impl<E> AggregateError<E> {
    /// Wraps the ordered error sequence.
    pub fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    /// Returns the errors in input order.
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// Consumes the container, returning the errors in input order.
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when no task was given at all.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        "aggregate_rejected"
    }
}

/// # Errors produced by timed tasks.
///
/// The combinators never construct these; they only relay them.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// A configured task rejected on purpose.
    #[error("Item at {index} index couldn't resolve!")]
    Rejected {
        /// Position of the task in its input collection.
        index: usize,
    },

    /// A cut-off timer elapsed before the competing work settled.
    #[error("Request couldn't resolve in {after:?}")]
    DeadlineElapsed {
        /// The configured cut-off.
        after: Duration,
    },

    /// Free-form failure from user code.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use tasksettle::TaskError;
    ///
    /// let err = TaskError::Rejected { index: 1 };
    /// assert_eq!(err.as_label(), "task_rejected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Rejected { .. } => "task_rejected",
            TaskError::DeadlineElapsed { .. } => "task_deadline_elapsed",
            TaskError::Fail { .. } => "task_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Rejected { index } => format!("rejected: index={index}"),
            TaskError::DeadlineElapsed { after } => format!("deadline: {after:?}"),
            TaskError::Fail { error } => format!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_keeps_order() {
        let err = AggregateError::new(vec![3, 1, 2]);
        assert_eq!(err.errors(), &[3, 1, 2]);
        assert!(!err.is_empty());
        assert_eq!(err.into_errors(), vec![3, 1, 2]);
    }

    #[test]
    fn test_empty_aggregate_display() {
        let err: AggregateError<TaskError> = AggregateError::new(Vec::new());
        assert!(err.is_empty());
        assert_eq!(err.to_string(), "all 0 tasks rejected");
    }

    #[test]
    fn test_task_error_display_matches_demo_text() {
        let err = TaskError::Rejected { index: 1 };
        assert_eq!(err.to_string(), "Item at 1 index couldn't resolve!");
        assert_eq!(err.as_message(), "rejected: index=1");

        let cut = TaskError::DeadlineElapsed {
            after: Duration::from_secs(5),
        };
        assert_eq!(cut.to_string(), "Request couldn't resolve in 5s");
        assert_eq!(cut.as_label(), "task_deadline_elapsed");
    }
}
