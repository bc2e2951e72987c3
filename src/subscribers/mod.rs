//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out,
//! and built-in subscribers.
//!
//! ## Architecture
//! ```text
//! engine ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                        ├──► SettleTally
//!                                                        ├──► LogWriter (feature "logging")
//!                                                        └──► custom ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;
mod tally;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
pub use tally::SettleTally;
