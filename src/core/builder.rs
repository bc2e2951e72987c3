use std::sync::Arc;

use crate::{
    core::{Combinators, Config},
    subscribers::Subscribe,
};

/// Builder for constructing [`Combinators`] with optional subscribers.
pub struct CombinatorsBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl CombinatorsBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive run events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds a single subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the [`Combinators`] instance.
    ///
    /// Spawns the bus listener and one worker per subscriber, so it must be
    /// called inside a tokio runtime.
    pub fn build(self) -> Combinators {
        Combinators::new(self.cfg, self.subscribers)
    }
}
