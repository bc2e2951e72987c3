//! # Timed task configuration.
//!
//! [`TaskSpec`] describes a task that settles after a fixed delay, either
//! fulfilling or rejecting. It is the factory behind demos and scenario tests:
//! a slice of specs maps to a vector of running [`TaskHandle`]s by position.
//!
//! ## Rules
//! - The index passed to [`TaskSpec::spawn`] ends up in the settlement message.
//! - [`spawn_all`] uses each spec's position as its index.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tasksettle::{Outcome, TaskSpec, spawn_all};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let tasks = spawn_all(&[
//!         TaskSpec::resolve(Duration::from_millis(10)),
//!         TaskSpec::reject(Duration::from_millis(10)),
//!     ]);
//!     let settled = tasksettle::all_settled(tasks).await;
//!     assert!(settled[0].is_fulfilled());
//!     assert!(settled[1].is_rejected());
//! }
//! ```

use std::time::Duration;

use crate::{error::TaskError, tasks::handle::TaskHandle};

/// Value type produced by timed tasks.
pub type TimedTask = TaskHandle<String, TaskError>;

/// Configuration of one timed task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskSpec {
    /// Delay before the task settles.
    pub settle_after: Duration,
    /// Reject instead of fulfilling.
    pub should_reject: bool,
}

impl TaskSpec {
    /// Creates a spec with explicit parameters.
    pub fn new(settle_after: Duration, should_reject: bool) -> Self {
        Self {
            settle_after,
            should_reject,
        }
    }

    /// A task that fulfills after `settle_after`.
    pub fn resolve(settle_after: Duration) -> Self {
        Self::new(settle_after, false)
    }

    /// A task that rejects after `settle_after`.
    pub fn reject(settle_after: Duration) -> Self {
        Self::new(settle_after, true)
    }

    /// Starts the task for position `index`.
    ///
    /// Fulfills with `"Item at {index} index resolved fine!"` or rejects with
    /// [`TaskError::Rejected`].
    pub fn spawn(&self, index: usize) -> TimedTask {
        let name = format!("item-{index}");
        if self.should_reject {
            TaskHandle::reject_after(name, self.settle_after, TaskError::Rejected { index })
        } else {
            TaskHandle::resolve_after(
                name,
                self.settle_after,
                format!("Item at {index} index resolved fine!"),
            )
        }
    }

    /// A cut-off timer: always rejects with [`TaskError::DeadlineElapsed`].
    ///
    /// Race it against slow work to bound how long a caller waits for it.
    /// The slow work is **not** stopped.
    pub fn deadline(after: Duration) -> TimedTask {
        TaskHandle::reject_after("deadline", after, TaskError::DeadlineElapsed { after })
    }
}

/// Starts one task per spec, using each spec's position as its index.
pub fn spawn_all(specs: &[TaskSpec]) -> Vec<TimedTask> {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| spec.spawn(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;

    #[tokio::test(start_paused = true)]
    async fn test_settles_with_indexed_messages() {
        let tasks = spawn_all(&[
            TaskSpec::resolve(Duration::from_secs(1)),
            TaskSpec::reject(Duration::from_secs(1)),
        ]);

        assert_eq!(tasks[0].name(), "item-0");
        assert_eq!(
            tasks[0].settled().await,
            Outcome::Fulfilled("Item at 0 index resolved fine!".to_string())
        );
        assert_eq!(
            tasks[1].settled().await,
            Outcome::Rejected(TaskError::Rejected { index: 1 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_settles_after_configured_delay() {
        let start = tokio::time::Instant::now();
        let t = TaskSpec::resolve(Duration::from_secs(2)).spawn(0);
        t.settled().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "settled early: {elapsed:?}");
        assert!(elapsed < Duration::from_millis(2050), "settled late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_always_rejects() {
        let cut = TaskSpec::deadline(Duration::from_secs(5));
        assert_eq!(
            cut.settled().await,
            Outcome::Rejected(TaskError::DeadlineElapsed {
                after: Duration::from_secs(5)
            })
        );
    }
}
