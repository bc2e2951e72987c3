//! # Settlement engine: drives one policy over one set of running tasks.
//!
//! ## Flow
//! ```text
//! drive(tasks, policy, sink):                       (synchronous part)
//!   ├─ attach one observer per task  ──► observer(outcome, seq):
//!   │                                       ├─ guard Decided? → discard (report if sink)
//!   │                                       └─ send Settlement{index, seq, outcome}
//!   └─ return decide(...)                           (the future)
//!
//! decide():
//!   ├─ total == 0 → policy.on_empty()  (None ⇒ pending forever)
//!   ├─ replay settlements already delivered, sorted by seq (completion order)
//!   └─ loop: recv → settled += 1 → policy.on_settle(...)
//!            └─ Decided(out) → guard.decide() → drain/discard queued → return out
//! ```
//!
//! ## Rules
//! - Engine state (policy buffer, settled counter) is owned by the returned future
//!   and mutated one settlement at a time.
//! - Observers never mutate engine state; they only enqueue.
//! - The [`DecisionGuard`] flips `Pending → Decided` exactly once.
//! - No task is ever stopped; late settlements are dropped.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering as AtomicOrdering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendError;
use tokio::time::Instant;

use crate::{
    events::{Bus, Event, EventKind},
    outcome::Outcome,
    policies::{PolicyKind, Progress, SettlePolicy, Step},
    tasks::TaskHandle,
};

/// Global counter for combinator invocation ids.
static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Decision state of one combinator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Decision {
    Pending = 0,
    Decided = 1,
}

/// Shared single-transition guard checked by every observer.
#[derive(Debug)]
pub(crate) struct DecisionGuard(AtomicU8);

impl DecisionGuard {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(Decision::Pending as u8))
    }

    pub(crate) fn state(&self) -> Decision {
        match self.0.load(AtomicOrdering::Acquire) {
            0 => Decision::Pending,
            _ => Decision::Decided,
        }
    }

    pub(crate) fn is_decided(&self) -> bool {
        self.state() == Decision::Decided
    }

    /// Flips to `Decided`. Returns `false` if it already was.
    pub(crate) fn decide(&self) -> bool {
        self.0
            .compare_exchange(
                Decision::Pending as u8,
                Decision::Decided as u8,
                AtomicOrdering::AcqRel,
                AtomicOrdering::Acquire,
            )
            .is_ok()
    }
}

/// One accepted settlement, tagged with its input index.
struct Settlement<V, E> {
    index: usize,
    seq: u64,
    name: Arc<str>,
    outcome: Outcome<V, E>,
}

/// Where an observed run reports its events.
#[derive(Clone, Debug)]
pub(crate) struct Sink {
    pub(crate) bus: Bus,
    pub(crate) report_discarded: bool,
}

/// Per-run event publisher.
#[derive(Clone, Debug)]
struct Tap {
    sink: Sink,
    run: u64,
    policy: PolicyKind,
}

impl Tap {
    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_run(self.run).with_policy(self.policy)
    }

    fn started(&self, total: usize) {
        self.sink
            .bus
            .publish(self.event(EventKind::CombinatorStarted).with_total(total));
    }

    fn settled(&self, index: usize, name: &str, label: &'static str, progress: Progress) {
        self.sink.bus.publish(
            self.event(EventKind::TaskSettled)
                .with_task(name)
                .with_index(index)
                .with_outcome(label)
                .with_progress(progress.settled, progress.total),
        );
    }

    fn decided(&self, label: &'static str, progress: Progress, started: Instant) {
        self.sink.bus.publish(
            self.event(EventKind::CombinatorDecided)
                .with_outcome(label)
                .with_progress(progress.settled, progress.total)
                .with_elapsed(started.elapsed()),
        );
    }

    fn discarded(&self, index: usize, name: &str, label: &'static str) {
        if !self.sink.report_discarded {
            return;
        }
        self.sink.bus.publish(
            self.event(EventKind::SettlementDiscarded)
                .with_task(name)
                .with_index(index)
                .with_outcome(label),
        );
    }
}

/// Attaches observers to `tasks` and returns the future that resolves with the
/// policy's decision.
///
/// Observers are attached before this function returns, so tasks settling
/// before the future is first polled are not missed.
pub(crate) fn drive<V, E, P>(
    tasks: Vec<TaskHandle<V, E>>,
    policy: P,
    sink: Option<Sink>,
) -> impl Future<Output = P::Output> + Send
where
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
    P: SettlePolicy<V, E> + Send + 'static,
    P::Output: Send,
{
    let total = tasks.len();
    let started = Instant::now();
    let tap = sink.map(|sink| Tap {
        sink,
        run: RUN_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
        policy: policy.kind(),
    });
    let guard = Arc::new(DecisionGuard::new());
    let (tx, rx) = mpsc::unbounded_channel::<Settlement<V, E>>();

    if let Some(tap) = &tap {
        tap.started(total);
    }

    for (index, task) in tasks.iter().enumerate() {
        let tx = tx.clone();
        let guard = Arc::clone(&guard);
        let tap = tap.clone();
        let name: Arc<str> = Arc::from(task.name());

        task.observe_with_seq(move |outcome, seq| {
            if guard.is_decided() {
                if let Some(tap) = &tap {
                    tap.discarded(index, &name, outcome.as_label());
                }
                return;
            }
            let settlement = Settlement {
                index,
                seq,
                name,
                outcome,
            };
            // Receiver gone: the run decided or its future was dropped.
            if let Err(SendError(late)) = tx.send(settlement) {
                if let Some(tap) = &tap {
                    tap.discarded(late.index, &late.name, late.outcome.as_label());
                }
            }
        });
    }
    drop(tx);

    decide(policy, rx, guard, tap, total, started)
}

async fn decide<V, E, P>(
    mut policy: P,
    mut rx: mpsc::UnboundedReceiver<Settlement<V, E>>,
    guard: Arc<DecisionGuard>,
    tap: Option<Tap>,
    total: usize,
    started: Instant,
) -> P::Output
where
    P: SettlePolicy<V, E>,
{
    if total == 0 {
        return match policy.on_empty() {
            Some(output) => {
                guard.decide();
                if let Some(tap) = &tap {
                    tap.decided(P::label(&output), Progress { settled: 0, total }, started);
                }
                output
            }
            // Nothing can ever settle (empty `race`).
            None => std::future::pending().await,
        };
    }

    // Tasks that were already settled fired during attach, in input order.
    let mut backlog = Vec::new();
    while let Ok(settlement) = rx.try_recv() {
        backlog.push(settlement);
    }
    backlog.sort_by_key(|s| s.seq);
    let mut backlog = VecDeque::from(backlog);

    let mut settled = 0;
    loop {
        let next = match backlog.pop_front() {
            Some(settlement) => Some(settlement),
            None => rx.recv().await,
        };
        // Every observer was dropped unfired; no decision is reachable.
        let Some(settlement) = next else {
            return std::future::pending().await;
        };

        settled += 1;
        let progress = Progress { settled, total };
        if let Some(tap) = &tap {
            tap.settled(
                settlement.index,
                &settlement.name,
                settlement.outcome.as_label(),
                progress,
            );
        }

        if let Step::Decided(output) =
            policy.on_settle(settlement.index, settlement.outcome, progress)
        {
            guard.decide();
            rx.close();
            if let Some(tap) = &tap {
                while let Some(late) = backlog.pop_front() {
                    tap.discarded(late.index, &late.name, late.outcome.as_label());
                }
                while let Ok(late) = rx.try_recv() {
                    tap.discarded(late.index, &late.name, late.outcome.as_label());
                }
                tap.decided(P::label(&output), progress, started);
            }
            return output;
        }
    }
}

/// Runs a custom [`SettlePolicy`] over `tasks`.
///
/// The built-in combinators are thin wrappers over this function.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use tasksettle::{Outcome, PolicyKind, Progress, SettlePolicy, Step, TaskHandle, settle_with};
///
/// /// Resolves with the index of the first task to fulfill.
/// struct FirstIndex;
///
/// impl SettlePolicy<u8, ()> for FirstIndex {
///     type Output = Option<usize>;
///     fn kind(&self) -> PolicyKind { PolicyKind::Any }
///     fn on_empty(self) -> Option<Self::Output> { Some(None) }
///     fn on_settle(&mut self, index: usize, o: Outcome<u8, ()>, p: Progress) -> Step<Self::Output> {
///         match o {
///             Outcome::Fulfilled(_) => Step::Decided(Some(index)),
///             Outcome::Rejected(_) if p.is_complete() => Step::Decided(None),
///             Outcome::Rejected(_) => Step::Continue,
///         }
///     }
///     fn label(out: &Self::Output) -> &'static str {
///         if out.is_some() { "fulfilled" } else { "rejected" }
///     }
/// }
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let tasks = vec![
///         TaskHandle::reject_after("a", Duration::from_millis(5), ()),
///         TaskHandle::resolve_after("b", Duration::from_millis(10), 1),
///     ];
///     assert_eq!(settle_with(tasks, FirstIndex).await, Some(1));
/// }
/// ```
pub fn settle_with<V, E, P>(
    tasks: Vec<TaskHandle<V, E>>,
    policy: P,
) -> impl Future<Output = P::Output> + Send
where
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
    P: SettlePolicy<V, E> + Send + 'static,
    P::Output: Send,
{
    drive(tasks, policy, None)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::policies::{AllPolicy, RacePolicy};

    #[test]
    fn test_guard_flips_once() {
        let guard = DecisionGuard::new();
        assert_eq!(guard.state(), Decision::Pending);
        assert!(guard.decide());
        assert!(!guard.decide());
        assert!(guard.is_decided());
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_settled_tasks_replay_in_completion_order() {
        let late = TaskHandle::<u8, &str>::reject_after("late", Duration::from_secs(2), "late");
        let early = TaskHandle::<u8, &str>::reject_after("early", Duration::from_secs(1), "early");
        late.settled().await;

        // index 0 settled after index 1; the replay must honor that.
        let first = drive(vec![late, early], AllPolicy::new(2), None).await;
        assert_eq!(first, Err("early"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_settlements_are_reported_as_discarded() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let sink = Sink {
            bus: bus.clone(),
            report_discarded: true,
        };

        let fast = TaskHandle::<u8, ()>::resolve_after("fast", Duration::from_secs(1), 1);
        let slow = TaskHandle::<u8, ()>::resolve_after("slow", Duration::from_secs(3), 3);
        let out = drive(vec![fast, slow.clone()], RacePolicy::new(), Some(sink)).await;
        assert_eq!(out, Outcome::Fulfilled(1));

        slow.settled().await;
        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::CombinatorStarted,
                EventKind::TaskSettled,
                EventKind::CombinatorDecided,
                EventKind::SettlementDiscarded,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_future_leaves_tasks_running() {
        let t = TaskHandle::<u8, ()>::resolve_after("t", Duration::from_secs(1), 5);
        drop(drive(vec![t.clone()], AllPolicy::new(1), None));
        assert_eq!(t.settled().await, Outcome::Fulfilled(5));
    }
}
