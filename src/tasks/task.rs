//! # Task abstraction.
//!
//! A [`Task`] is a *recipe*: it has a stable [`name`](Task::name) and produces a
//! fresh future per [`spawn`](Task::spawn). Turning a recipe into running work
//! is the job of [`TaskHandle::start`](crate::TaskHandle::start).
//!
//! The common shared form is [`TaskRef`], an `Arc<dyn Task<V, E>>`.

use std::{future::Future, pin::Pin, sync::Arc};

/// Boxed future produced by a single [`Task::spawn`] call.
pub type BoxTaskFuture<V, E> = Pin<Box<dyn Future<Output = Result<V, E>> + Send + 'static>>;

/// Shared handle to a task recipe.
pub type TaskRef<V, E> = Arc<dyn Task<V, E>>;

/// # Asynchronous unit of work that settles into `Ok(V)` or `Err(E)`.
///
/// # Example
/// ```
/// use tasksettle::{BoxTaskFuture, Task};
///
/// struct Answer;
///
/// impl Task<u32, String> for Answer {
///     fn name(&self) -> &str { "answer" }
///
///     fn spawn(&self) -> BoxTaskFuture<u32, String> {
///         Box::pin(async { Ok(42) })
///     }
/// }
/// ```
pub trait Task<V, E>: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates a new future for one execution of the task.
    ///
    /// Each call must produce an independent future.
    fn spawn(&self) -> BoxTaskFuture<V, E>;
}
