//! # Event bus for observed combinator runs.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Engines and
//! settlement observers publish into it; [`Combinators`](crate::Combinators)
//! holds the single listener that forwards into the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ```text
//! engine (run N) ──┐
//! observers     ───┼──► Bus ───► listener ───► SubscriberSet
//! subscriber set ──┘  (broadcast)
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no receivers the event is dropped.
//! - A single bounded ring buffer is shared by all receivers.
//! - Slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver for events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_receiver_sees_events_after_subscribe() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::CombinatorStarted));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::CombinatorDecided).with_run(9));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::CombinatorDecided);
        assert_eq!(ev.run, Some(9));
    }
}
