//! # Running task handle with one-shot settlement observers.
//!
//! [`TaskHandle`] is what the combinators consume. Creating one spawns the
//! future onto the tokio runtime right away; the handle only *observes* it.
//!
//! ## Settlement contract
//! ```text
//! Pending ──settle(outcome)──► Settled { outcome, seq }
//!    │                              │
//!    └─ observe(f): queued          └─ observe(f): f(outcome) immediately
//!
//! settle():
//!   ├─ exactly once (later calls are ignored)
//!   ├─ stamps a process-wide sequence number (completion order)
//!   └─ invokes every queued observer outside the lock
//! ```
//!
//! ## Rules
//! - Every observer fires exactly once, no matter when it was attached.
//! - Observers never affect the task's own execution.
//! - Dropping all handles does **not** stop the task.
//!
//! ## Hazard
//! A future that panics (or is dropped at runtime shutdown) never settles.
//! Observers attached to it never fire and combinators waiting on it stay pending.

use std::{
    fmt,
    future::Future,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering as AtomicOrdering},
    },
    time::Duration,
};

use tokio::sync::oneshot;

use crate::{outcome::Outcome, tasks::task::Task};

/// Global sequence counter for settlement ordering.
static SETTLE_SEQ: AtomicU64 = AtomicU64::new(0);

type Observer<V, E> = Box<dyn FnOnce(Outcome<V, E>, u64) + Send + 'static>;

enum State<V, E> {
    Pending(Vec<Observer<V, E>>),
    Settled { outcome: Outcome<V, E>, seq: u64 },
}

/// Shared settlement cell behind every clone of a handle.
struct Cell<V, E> {
    state: Mutex<State<V, E>>,
}

impl<V, E> Cell<V, E>
where
    V: Clone,
    E: Clone,
{
    fn new() -> Self {
        Self {
            state: Mutex::new(State::Pending(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<V, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Transitions to `Settled` and fires queued observers.
    ///
    /// Returns `false` if the cell was already settled.
    fn settle(&self, outcome: Outcome<V, E>) -> bool {
        let (observers, seq) = {
            let mut state = self.lock();
            let State::Pending(queued) = &mut *state else {
                return false;
            };
            let observers = std::mem::take(queued);
            let seq = SETTLE_SEQ.fetch_add(1, AtomicOrdering::Relaxed);
            *state = State::Settled {
                outcome: outcome.clone(),
                seq,
            };
            (observers, seq)
        };

        for observer in observers {
            observer(outcome.clone(), seq);
        }
        true
    }

    fn observe(&self, observer: Observer<V, E>) {
        let (outcome, seq) = {
            let mut state = self.lock();
            match &mut *state {
                State::Pending(queued) => {
                    queued.push(observer);
                    return;
                }
                State::Settled { outcome, seq } => (outcome.clone(), *seq),
            }
        };
        observer(outcome, seq);
    }

    fn peek(&self) -> Option<Outcome<V, E>> {
        match &*self.lock() {
            State::Pending(_) => None,
            State::Settled { outcome, .. } => Some(outcome.clone()),
        }
    }
}

/// Handle to a task that is already running.
///
/// Cheap to clone; all clones observe the same settlement.
///
/// `V` and `E` must be `Clone` because every observer receives its own copy
/// of the outcome.
///
/// # Panics
/// Every constructor spawns onto the current tokio runtime and panics when
/// called outside of one (like [`tokio::spawn`]).
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use tasksettle::{Outcome, TaskHandle};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let t: TaskHandle<&str, String> =
///         TaskHandle::resolve_after("ping", Duration::from_millis(10), "pong");
///     assert_eq!(t.settled().await, Outcome::Fulfilled("pong"));
///
///     // Late observers fire immediately with the known outcome.
///     t.observe(|o| assert!(o.is_fulfilled()));
/// }
/// ```
pub struct TaskHandle<V, E> {
    name: Arc<str>,
    cell: Arc<Cell<V, E>>,
}

impl<V, E> Clone for TaskHandle<V, E> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<V, E> TaskHandle<V, E>
where
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Spawns `fut` immediately and returns a handle observing it.
    pub fn spawn<F>(name: impl Into<Arc<str>>, fut: F) -> Self
    where
        F: Future<Output = Result<V, E>> + Send + 'static,
    {
        let cell = Arc::new(Cell::new());
        let settler = Arc::clone(&cell);
        tokio::spawn(async move {
            settler.settle(fut.await.into());
        });
        Self {
            name: name.into(),
            cell,
        }
    }

    /// Starts one execution of a task recipe.
    pub fn start(task: &dyn Task<V, E>) -> Self {
        Self::spawn(task.name().to_owned(), task.spawn())
    }

    /// Spawns a timer task that fulfills with `value` after `after`.
    pub fn resolve_after(name: impl Into<Arc<str>>, after: Duration, value: V) -> Self {
        Self::spawn(name, async move {
            tokio::time::sleep(after).await;
            Ok(value)
        })
    }

    /// Spawns a timer task that rejects with `error` after `after`.
    pub fn reject_after(name: impl Into<Arc<str>>, after: Duration, error: E) -> Self {
        Self::spawn(name, async move {
            tokio::time::sleep(after).await;
            Err(error)
        })
    }

    /// Registers a one-shot observer.
    ///
    /// Fires exactly once: on settlement, or right now if already settled.
    pub fn observe<F>(&self, f: F)
    where
        F: FnOnce(Outcome<V, E>) + Send + 'static,
    {
        self.cell.observe(Box::new(move |outcome, _seq| f(outcome)));
    }

    /// Registers an observer that also receives the settlement sequence number.
    pub(crate) fn observe_with_seq<F>(&self, f: F)
    where
        F: FnOnce(Outcome<V, E>, u64) + Send + 'static,
    {
        self.cell.observe(Box::new(f));
    }

    /// Waits for the task to settle.
    pub async fn settled(&self) -> Outcome<V, E> {
        let (tx, rx) = oneshot::channel();
        self.observe(move |outcome| {
            let _ = tx.send(outcome);
        });
        match rx.await {
            Ok(outcome) => outcome,
            // The observer was dropped unfired: the task can no longer settle.
            Err(_) => std::future::pending().await,
        }
    }

    /// Returns the outcome if the task has already settled.
    pub fn outcome(&self) -> Option<Outcome<V, E>> {
        self.cell.peek()
    }

    /// True once the task has settled.
    pub fn is_settled(&self) -> bool {
        self.outcome().is_some()
    }
}

impl<V, E> TaskHandle<V, E> {
    /// Returns the task name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<V, E> fmt::Debug for TaskHandle<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.cell.state.lock().unwrap_or_else(PoisonError::into_inner) {
            State::Pending(_) => "pending",
            State::Settled { outcome, .. } => outcome.as_label(),
        };
        f.debug_struct("TaskHandle")
            .field("name", &self.name)
            .field("state", &state)
            .finish()
    }
}
