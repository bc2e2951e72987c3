//! # Events emitted by observed combinator runs.
//!
//! The [`EventKind`] enum classifies event types in two groups:
//! - **Run events**: one combinator invocation (started, task settled, decided, discarded)
//! - **Subscriber events**: delivery problems inside the fan-out (overflow, panic)
//!
//! The [`Event`] struct carries optional metadata such as the run id, policy,
//! task index and name, and elapsed time.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use tasksettle::{Event, EventKind, PolicyKind};
//!
//! let ev = Event::new(EventKind::TaskSettled)
//!     .with_run(3)
//!     .with_policy(PolicyKind::Any)
//!     .with_task("item-1")
//!     .with_index(1)
//!     .with_outcome("rejected");
//!
//! assert_eq!(ev.kind, EventKind::TaskSettled);
//! assert_eq!(ev.task.as_deref(), Some("item-1"));
//! assert_eq!(ev.outcome, Some("rejected"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::policies::PolicyKind;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Run events ===
    /// A combinator attached its observers.
    ///
    /// Sets:
    /// - `run`: invocation id
    /// - `policy`: settlement policy
    /// - `total`: number of input tasks
    CombinatorStarted,

    /// A task settled and the engine accepted its outcome.
    ///
    /// Sets:
    /// - `run`, `policy`
    /// - `task`: task name
    /// - `index`: input position
    /// - `outcome`: `"fulfilled"` or `"rejected"`
    /// - `settled`: settled count including this one
    /// - `total`: number of input tasks
    TaskSettled,

    /// The policy reached its decision; the combinator future resolves.
    ///
    /// Sets:
    /// - `run`, `policy`
    /// - `outcome`: `"fulfilled"` or `"rejected"` for the aggregate
    /// - `settled`: settled count at decision time
    /// - `total`: number of input tasks
    /// - `elapsed_ms`: time since `CombinatorStarted`
    CombinatorDecided,

    /// A task settled after the decision; its outcome was discarded.
    ///
    /// Sets:
    /// - `run`, `policy`
    /// - `task`: task name
    /// - `index`: input position
    /// - `outcome`: the discarded outcome label
    SettlementDiscarded,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Combinator invocation id.
    pub run: Option<u64>,
    /// Settlement policy of the run.
    pub policy: Option<PolicyKind>,
    /// Task (or subscriber) name, if applicable.
    pub task: Option<Arc<str>>,
    /// Input position of the task.
    pub index: Option<usize>,
    /// Number of input tasks.
    pub total: Option<usize>,
    /// Settled count at the time of the event.
    pub settled: Option<usize>,
    /// Outcome label (`"fulfilled"` / `"rejected"`).
    pub outcome: Option<&'static str>,
    /// Time since the run started in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Human-readable reason (overflow details, panic info).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            run: None,
            policy: None,
            task: None,
            index: None,
            total: None,
            settled: None,
            outcome: None,
            elapsed_ms: None,
            reason: None,
        }
    }

    /// Attaches the combinator invocation id.
    #[inline]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Attaches the settlement policy.
    #[inline]
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the task's input position.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches settled/total progress.
    #[inline]
    pub fn with_progress(mut self, settled: usize, total: usize) -> Self {
        self.settled = Some(settled);
        self.total = Some(total);
        self
    }

    /// Attaches the number of input tasks.
    #[inline]
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Attaches an outcome label.
    #[inline]
    pub fn with_outcome(mut self, label: &'static str) -> Self {
        self.outcome = Some(label);
        self
    }

    /// Attaches elapsed time (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panicked(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
