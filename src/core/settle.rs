//! # Settlement combinators.
//!
//! Each function attaches its observers immediately and returns a future that
//! resolves with the aggregate. None of them stop tasks that are still running.
//!
//! | Function         | Resolves when                      | Output                               |
//! |------------------|------------------------------------|--------------------------------------|
//! | [`all`]          | first rejection, or all fulfilled  | `Result<Vec<V>, E>`                  |
//! | [`all_settled`]  | every task settled                 | `Vec<Outcome<V, E>>`                 |
//! | [`any`]          | first fulfillment, or all rejected | `Result<V, AggregateError<E>>`       |
//! | [`race`]         | first settlement of either kind    | `Outcome<V, E>`                      |
//!
//! Aggregates are always in **input order**; only the moment of resolution
//! depends on completion order.

use std::future::Future;

use crate::{
    core::engine::drive,
    error::AggregateError,
    outcome::Outcome,
    policies::{AllPolicy, AllSettledPolicy, AnyPolicy, RacePolicy},
    tasks::TaskHandle,
};

/// Waits for every task to fulfill, or for the first rejection.
///
/// - Resolves `Ok(values)` in input order once all tasks fulfilled.
/// - Resolves `Err(e)` with the error of the first task to reject in time,
///   whatever its index. Later rejections are ignored.
/// - Empty input resolves `Ok(vec![])` immediately.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use tasksettle::TaskHandle;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let tasks = vec![
///         TaskHandle::<_, ()>::resolve_after("slow", Duration::from_millis(20), "a"),
///         TaskHandle::<_, ()>::resolve_after("fast", Duration::from_millis(10), "b"),
///     ];
///     assert_eq!(tasksettle::all(tasks).await, Ok(vec!["a", "b"]));
/// }
/// ```
pub fn all<V, E>(tasks: Vec<TaskHandle<V, E>>) -> impl Future<Output = Result<Vec<V>, E>> + Send
where
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let total = tasks.len();
    drive(tasks, AllPolicy::new(total), None)
}

/// Waits for every task to settle and reports each outcome at its index.
///
/// Never fails. Empty input resolves `vec![]` immediately.
pub fn all_settled<V, E>(
    tasks: Vec<TaskHandle<V, E>>,
) -> impl Future<Output = Vec<Outcome<V, E>>> + Send
where
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let total = tasks.len();
    drive(tasks, AllSettledPolicy::new(total), None)
}

/// Waits for the first task to fulfill.
///
/// - Resolves `Ok(v)` with the first fulfilled value in time.
/// - Resolves `Err(AggregateError)` only once every task rejected; its errors
///   are in input order.
/// - Empty input resolves `Err` with an empty [`AggregateError`] immediately.
pub fn any<V, E>(
    tasks: Vec<TaskHandle<V, E>>,
) -> impl Future<Output = Result<V, AggregateError<E>>> + Send
where
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let total = tasks.len();
    drive(tasks, AnyPolicy::new(total), None)
}

/// Resolves with the outcome of the first task to settle, fulfilled or rejected.
///
/// # Hazard
/// With an **empty** input the returned future never resolves. Bound the wait
/// (e.g. `tokio::time::timeout`) if the input may be empty.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use tasksettle::{Outcome, TaskHandle};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let tasks = vec![
///         TaskHandle::<&str, &str>::resolve_after("work", Duration::from_millis(50), "done"),
///         TaskHandle::<&str, &str>::reject_after("cutoff", Duration::from_millis(10), "too slow"),
///     ];
///     assert_eq!(tasksettle::race(tasks).await, Outcome::Rejected("too slow"));
/// }
/// ```
pub fn race<V, E>(tasks: Vec<TaskHandle<V, E>>) -> impl Future<Output = Outcome<V, E>> + Send
where
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    drive(tasks, RacePolicy::new(), None)
}
