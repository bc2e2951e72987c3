//! # Non-blocking event fan-out to multiple subscribers.
//!
//! [`SubscriberSet`] hands each event to every subscriber's bounded queue
//! without awaiting processing.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │                      └──────► panic → SubscriberPanicked
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - `emit()` returns immediately (uses `try_send`).
//! - Per-subscriber FIFO; no ordering across subscribers.
//! - Overflow drops the event for that subscriber only and publishes `SubscriberOverflow`.
//! - Overflow events that overflow themselves are not re-published.
//! - A subscriber never receives its own `SubscriberPanicked` report.
//! - A panic while handling `SubscriberPanicked` is not re-published.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let panic_bus = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let is_panic_evt = ev.is_subscriber_panicked();
                    if is_panic_evt && ev.task.as_deref() == Some(name) {
                        continue;
                    }
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        if !is_panic_evt {
                            panic_bus.publish(Event::subscriber_panicked(name, info));
                        }
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Emits an event to all subscribers (clones the event once).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a pre-allocated `Arc<Event>` to all subscribers.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = event.is_subscriber_overflow();

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow_evt {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// Closes every queue, then waits for workers to drain what is left.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::events::EventKind;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.seq);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _ev: &Event) {
            panic!("exploded");
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    /// Holds the first event until released; queue of one.
    #[derive(Default)]
    struct Stuck {
        release: Notify,
    }

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _ev: &Event) {
            self.release.notified().await;
        }

        fn name(&self) -> &'static str {
            "stuck"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_fifo_delivery_and_drain_on_shutdown() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![rec.clone()], Bus::new(8));
        assert_eq!(set.len(), 1);

        let a = Event::new(EventKind::CombinatorStarted);
        let b = Event::new(EventKind::CombinatorDecided);
        set.emit(&a);
        set.emit(&b);
        set.shutdown().await;

        assert_eq!(*rec.seen.lock().unwrap(), vec![a.seq, b.seq]);
    }

    #[tokio::test]
    async fn test_panic_is_reported_not_propagated() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploder)], bus.clone());

        set.emit(&Event::new(EventKind::TaskSettled));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.task.as_deref(), Some("exploder"));
        assert_eq!(ev.reason.as_deref(), Some("exploded"));
    }

    #[tokio::test]
    async fn test_panic_while_handling_panic_report_is_not_republished() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploder)], bus.clone());

        set.emit(&Event::subscriber_panicked("other", "boom".to_string()));
        set.shutdown().await;

        assert!(rx.try_recv().is_err(), "panic report must not feed back");
    }

    #[tokio::test]
    async fn test_own_panic_report_is_skipped() {
        let bus = Bus::new(8);
        let set = SubscriberSet::new(vec![Arc::new(Exploder)], bus.clone());
        let mut rx = bus.subscribe();

        set.emit(&Event::new(EventKind::TaskSettled));
        tokio::task::yield_now().await;
        // Feed the resulting report back, as the bus listener would.
        let report = rx.recv().await.unwrap();
        assert_eq!(report.kind, EventKind::SubscriberPanicked);
        set.emit(&report);
        set.shutdown().await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_full_queue_publishes_overflow_once() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let stuck = Arc::new(Stuck::default());
        let set = SubscriberSet::new(vec![stuck.clone()], bus.clone());

        // The worker has not run yet: the first event fills the queue.
        set.emit(&Event::new(EventKind::CombinatorStarted));
        set.emit(&Event::new(EventKind::TaskSettled));

        let ev = rx.try_recv().unwrap();
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.task.as_deref(), Some("stuck"));
        assert!(ev.reason.as_deref().unwrap().ends_with("reason=full"));

        // An overflow event that overflows is dropped silently.
        set.emit(&ev);
        assert!(rx.try_recv().is_err());

        stuck.release.notify_one();
        set.shutdown().await;
    }
}
