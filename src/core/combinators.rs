//! # Combinators: observed settlement runs with event fan-out.
//!
//! [`Combinators`] offers the same four operations as the free functions, but
//! every run publishes lifecycle events to its bus, and a listener forwards
//! them to a [`SubscriberSet`].
//!
//! ## Architecture
//! ```text
//! Combinators::all/any/race/all_settled(tasks)
//!     └─► engine::drive(tasks, policy, Some(sink))
//!            ├─ CombinatorStarted
//!            ├─ TaskSettled × k
//!            ├─ CombinatorDecided
//!            └─ SettlementDiscarded (late observers)
//!                     │
//!                     ▼
//!   Bus ──► listener (until shutdown token) ──► SubscriberSet::emit(&Event)
//!                                                  ├─► [queue S1] ─► worker S1
//!                                                  └─► [queue SN] ─► worker SN
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tasksettle::{Combinators, Config, SettleTally, TaskSpec, spawn_all};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let tally = Arc::new(SettleTally::new());
//!     let combinators = Combinators::builder(Config::default())
//!         .with_subscriber(tally.clone())
//!         .build();
//!
//!     let tasks = spawn_all(&[
//!         TaskSpec::resolve(Duration::from_millis(10)),
//!         TaskSpec::resolve(Duration::from_millis(20)),
//!     ]);
//!     let values = combinators.all(tasks).await.unwrap();
//!     assert_eq!(values.len(), 2);
//!
//!     combinators.shutdown().await;
//!     assert_eq!(tally.decided(), 1);
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{
    core::{
        builder::CombinatorsBuilder,
        config::Config,
        engine::{Sink, drive},
    },
    error::AggregateError,
    events::{Bus, Event},
    outcome::Outcome,
    policies::{AllPolicy, AllSettledPolicy, AnyPolicy, RacePolicy, SettlePolicy},
    subscribers::{Subscribe, SubscriberSet},
    tasks::TaskHandle,
};

/// Settlement combinators that report to subscribers.
///
/// Dropping an instance without [`shutdown`](Combinators::shutdown) stops the
/// listener as well, but does not wait for subscribers to drain.
pub struct Combinators {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    cancel_on_drop: DropGuard,
    listener: JoinHandle<()>,
}

impl Combinators {
    /// Creates a new instance with the given config and subscribers.
    ///
    /// Must be called inside a tokio runtime (spawns the listener and workers).
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        let token = CancellationToken::new();
        let listener = Self::subscriber_listener(bus.subscribe(), Arc::clone(&subs), token.clone());
        Self {
            cfg,
            bus,
            subs,
            cancel_on_drop: token.drop_guard(),
            listener,
        }
    }

    /// Returns a builder for fluent construction.
    pub fn builder(cfg: Config) -> CombinatorsBuilder {
        CombinatorsBuilder::new(cfg)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Creates a raw receiver on the event bus (events sent from now on).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Observed [`all`](crate::all).
    pub fn all<V, E>(
        &self,
        tasks: Vec<TaskHandle<V, E>>,
    ) -> impl Future<Output = Result<Vec<V>, E>> + Send
    where
        V: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        let total = tasks.len();
        self.settle_with(tasks, AllPolicy::new(total))
    }

    /// Observed [`all_settled`](crate::all_settled).
    pub fn all_settled<V, E>(
        &self,
        tasks: Vec<TaskHandle<V, E>>,
    ) -> impl Future<Output = Vec<Outcome<V, E>>> + Send
    where
        V: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        let total = tasks.len();
        self.settle_with(tasks, AllSettledPolicy::new(total))
    }

    /// Observed [`any`](crate::any).
    pub fn any<V, E>(
        &self,
        tasks: Vec<TaskHandle<V, E>>,
    ) -> impl Future<Output = Result<V, AggregateError<E>>> + Send
    where
        V: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        let total = tasks.len();
        self.settle_with(tasks, AnyPolicy::new(total))
    }

    /// Observed [`race`](crate::race). Never resolves on empty input.
    pub fn race<V, E>(
        &self,
        tasks: Vec<TaskHandle<V, E>>,
    ) -> impl Future<Output = Outcome<V, E>> + Send
    where
        V: Clone + Send + 'static,
        E: Clone + Send + 'static,
    {
        self.settle_with(tasks, RacePolicy::new())
    }

    /// Observed [`settle_with`](crate::settle_with) for custom policies.
    pub fn settle_with<V, E, P>(
        &self,
        tasks: Vec<TaskHandle<V, E>>,
        policy: P,
    ) -> impl Future<Output = P::Output> + Send
    where
        V: Clone + Send + 'static,
        E: Clone + Send + 'static,
        P: SettlePolicy<V, E> + Send + 'static,
        P::Output: Send,
    {
        drive(tasks, policy, Some(self.sink()))
    }

    /// Stops the listener and waits for subscribers to drain their queues.
    ///
    /// Events already on the bus are forwarded before the listener exits.
    /// Late settlements of runs that are still going are no longer delivered.
    pub async fn shutdown(self) {
        let Self {
            subs,
            cancel_on_drop,
            listener,
            ..
        } = self;
        drop(cancel_on_drop);
        let _ = listener.await;
        match Arc::try_unwrap(subs) {
            Ok(set) => set.shutdown().await,
            Err(_) => eprintln!("[tasksettle] subscriber set still shared at shutdown"),
        }
    }

    fn sink(&self) -> Sink {
        Sink {
            bus: self.bus.clone(),
            report_discarded: self.cfg.report_discarded,
        }
    }

    /// Forwards bus events to the subscriber set until the token is cancelled.
    fn subscriber_listener(
        mut rx: broadcast::Receiver<Event>,
        set: Arc<SubscriberSet>,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            eprintln!("[tasksettle] listener lagged; skipped {skipped} events");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = token.cancelled() => {
                        while let Ok(ev) = rx.try_recv() {
                            set.emit(&ev);
                        }
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::timeout;

    use super::*;
    use crate::{
        PolicyKind, Progress, SettleTally, Step, TaskSpec, events::EventKind, spawn_all,
    };

    #[derive(Default)]
    struct AlwaysPanics {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for AlwaysPanics {
        async fn on_event(&self, _ev: &Event) {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "always_panics"
        }
    }

    #[derive(Default)]
    struct KindLog {
        kinds: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for KindLog {
        async fn on_event(&self, ev: &Event) {
            self.kinds.lock().unwrap().push(ev.kind);
        }

        fn name(&self) -> &'static str {
            "kind_log"
        }
    }

    /// Decides once `need` tasks fulfilled, with their values in input order.
    struct Quorum {
        need: usize,
        values: Vec<Option<String>>,
    }

    impl SettlePolicy<String, crate::TaskError> for Quorum {
        type Output = Option<Vec<String>>;

        fn kind(&self) -> PolicyKind {
            PolicyKind::All
        }

        fn on_empty(self) -> Option<Self::Output> {
            Some(None)
        }

        fn on_settle(
            &mut self,
            index: usize,
            outcome: Outcome<String, crate::TaskError>,
            progress: Progress,
        ) -> Step<Self::Output> {
            if let Outcome::Fulfilled(v) = outcome {
                self.values[index] = Some(v);
            }
            let got = self.values.iter().flatten().count();
            if got >= self.need {
                Step::Decided(Some(self.values.iter().flatten().cloned().collect()))
            } else if progress.is_complete() {
                Step::Decided(None)
            } else {
                Step::Continue
            }
        }

        fn label(output: &Self::Output) -> &'static str {
            if output.is_some() { "quorum" } else { "no_quorum" }
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tally_sees_decision_and_discard() {
        let tally = Arc::new(SettleTally::new());
        let c = Combinators::builder(Config::default())
            .with_subscriber(tally.clone())
            .build();

        let tasks = spawn_all(&[TaskSpec::resolve(secs(2)), TaskSpec::resolve(secs(1))]);
        let slow = tasks[0].clone();
        assert!(c.race(tasks).await.is_fulfilled());
        slow.settled().await;

        c.shutdown().await;
        assert_eq!(tally.decided(), 1);
        assert_eq!(tally.discarded(), 1);
        assert!(tally.in_flight().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_discard_reporting_can_be_disabled() {
        let cfg = Config {
            report_discarded: false,
            ..Config::default()
        };
        let c = Combinators::new(cfg, Vec::new());
        let mut rx = c.subscribe();

        let tasks = spawn_all(&[TaskSpec::reject(secs(1)), TaskSpec::resolve(secs(2))]);
        let slow = tasks[1].clone();
        assert!(c.all(tasks).await.is_err());
        slow.settled().await;

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert!(!kinds.contains(&EventKind::SettlementDiscarded));
        assert_eq!(kinds.last(), Some(&EventKind::CombinatorDecided));
        c.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_decided_event_carries_elapsed_time() {
        let c = Combinators::new(Config::default(), Vec::new());
        let mut rx = c.subscribe();

        let tasks = spawn_all(&[TaskSpec::resolve(secs(2)), TaskSpec::resolve(secs(1))]);
        assert!(c.all_settled(tasks).await.iter().all(Outcome::is_fulfilled));

        let decided = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::CombinatorDecided)
            .unwrap();
        assert_eq!(decided.settled, Some(2));
        assert_eq!(decided.total, Some(2));
        let elapsed = decided.elapsed_ms.unwrap();
        assert!((2000..2050).contains(&elapsed), "elapsed {elapsed}ms");
        c.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_observed_any_with_all_rejected() {
        let c = Combinators::new(Config::default(), Vec::new());
        let tasks = spawn_all(&[TaskSpec::reject(secs(1)), TaskSpec::reject(secs(1))]);
        let err = c.any(tasks).await.unwrap_err();
        assert_eq!(err.len(), 2);
        c.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_subscriber_does_not_feed_on_its_reports() {
        let panics = Arc::new(AlwaysPanics::default());
        let log = Arc::new(KindLog::default());
        let c = Combinators::builder(Config::default())
            .with_subscriber(panics.clone())
            .with_subscriber(log.clone())
            .build();

        let tasks = vec![TaskHandle::<u8, ()>::spawn("once", async { Ok(1) })];
        assert!(c.race(tasks).await.is_fulfilled());
        tokio::time::sleep(Duration::from_millis(200)).await;
        c.shutdown().await;

        // Started, TaskSettled, Decided.
        assert_eq!(panics.calls.load(AtomicOrdering::SeqCst), 3);
        let kinds = log.kinds.lock().unwrap();
        let reports = kinds
            .iter()
            .filter(|k| **k == EventKind::SubscriberPanicked)
            .count();
        assert_eq!(reports, 3);
        assert!(!kinds.contains(&EventKind::SubscriberOverflow));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_without_shutdown_stops_listener() {
        let c = Combinators::new(Config::default(), vec![Arc::new(SettleTally::new())]);
        let mut rx = c.subscribe();
        drop(c);

        let res = timeout(secs(1), rx.recv()).await.expect("bus kept alive after drop");
        assert!(matches!(res, Err(RecvError::Closed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observed_custom_policy() {
        let c = Combinators::new(Config::default(), Vec::new());
        let mut rx = c.subscribe();

        let tasks = spawn_all(&[
            TaskSpec::resolve(secs(3)),
            TaskSpec::reject(secs(1)),
            TaskSpec::resolve(secs(2)),
            TaskSpec::resolve(secs(1)),
        ]);
        let policy = Quorum {
            need: 2,
            values: vec![None; tasks.len()],
        };
        let got = c.settle_with(tasks, policy).await;
        assert_eq!(
            got,
            Some(vec![
                "Item at 2 index resolved fine!".to_string(),
                "Item at 3 index resolved fine!".to_string(),
            ])
        );

        let decided = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::CombinatorDecided)
            .unwrap();
        assert_eq!(decided.policy, Some(PolicyKind::All));
        assert_eq!(decided.outcome, Some("quorum"));
        assert_eq!(decided.settled, Some(3));
        assert_eq!(decided.total, Some(4));
        c.shutdown().await;
    }
}
