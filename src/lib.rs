//! # tasksettle
//!
//! **Tasksettle** combines concurrently running async tasks into a single
//! aggregate result, the way `all`, `allSettled`, `any` and `race` do for
//! promises.
//!
//! Tasks start running the moment they are created. A combinator only
//! *observes* them: it never starts, stops or cancels anything, and tasks
//! that lose a race keep running to completion.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  TaskHandle  │   │  TaskHandle  │   │  TaskHandle  │
//!     │ (running #0) │   │ (running #1) │   │ (running #2) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ observe()        │ observe()        │ observe()
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  engine (one per combinator call)                                 │
//! │  - DecisionGuard (Pending ─► Decided, exactly once)               │
//! │  - settlement queue (completion order)                            │
//! │  - SettlePolicy (All / AllSettled / Any / Race / custom)          │
//! └──────┬─────────────────────────────────────────────────┬──────────┘
//!        ▼                                                 │ (Combinators only)
//!   aggregate future                                       ▼
//!   Result<Vec<V>, E> / Vec<Outcome<V, E>> /    ┌────────────────────────┐
//!   Result<V, AggregateError<E>> / Outcome      │ Bus (broadcast events) │
//!                                               └───────────┬────────────┘
//!                                                           ▼
//!                                               ┌────────────────────────┐
//!                                               │  subscriber_listener   │
//!                                               └───────────┬────────────┘
//!                                                           ▼
//!                                                     SubscriberSet
//!                                                  ┌────────┼────────┐
//!                                                  ▼        ▼        ▼
//!                                               worker1  worker2  workerN
//! ```
//!
//! ### Lifecycle of one call
//! ```text
//! combinator(tasks)
//!   ├─► attach one observer per task (now, not on first poll)
//!   └─► return future
//!
//! future:
//!   ├─ empty input ─► policy.on_empty() (race: never resolves)
//!   └─ loop: next settlement in completion order
//!        ├─ Step::Continue   ─► keep waiting
//!        └─ Step::Decided(o) ─► guard.decide(), resolve with o
//!                               later settlements ─► SettlementDiscarded
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                              |
//! |-------------------|----------------------------------------------------------------|-------------------------------------------------|
//! | **Combinators**   | Aggregate running tasks by a settlement policy.                | [`all`], [`all_settled`], [`any`], [`race`]     |
//! | **Policies**      | Built-in decision rules and a seam for custom ones.            | [`SettlePolicy`], [`settle_with`]               |
//! | **Tasks**         | Spawn and observe running work; timed demo tasks.              | [`TaskHandle`], [`TaskFn`], [`TaskSpec`]        |
//! | **Errors**        | Typed aggregate and task errors.                               | [`AggregateError`], [`TaskError`]               |
//! | **Subscriber API**| Hook into run events (logging, counters, custom subscribers).  | [`Subscribe`], [`SettleTally`]                  |
//! | **Configuration** | Bus capacity and discard reporting for observed runs.          | [`Config`], [`Combinators`]                     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tasksettle::{Combinators, Config, Outcome, TaskError, TaskSpec, spawn_all};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn tasksettle::Subscribe>> = {
//!         use tasksettle::LogWriter;
//!         vec![Arc::new(LogWriter::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn tasksettle::Subscribe>> = Vec::new();
//!
//!     let combinators = Combinators::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     // [succeed@20ms, fail@10ms, succeed@30ms]
//!     let specs = [
//!         TaskSpec::resolve(Duration::from_millis(20)),
//!         TaskSpec::reject(Duration::from_millis(10)),
//!         TaskSpec::resolve(Duration::from_millis(30)),
//!     ];
//!
//!     let res = combinators.all(spawn_all(&specs)).await;
//!     assert_eq!(res, Err(TaskError::Rejected { index: 1 }));
//!
//!     let outcomes = combinators.all_settled(spawn_all(&specs)).await;
//!     assert!(matches!(outcomes[1], Outcome::Rejected(_)));
//!
//!     let first = combinators.any(spawn_all(&specs)).await;
//!     assert_eq!(first.unwrap(), "Item at 0 index resolved fine!");
//!
//!     combinators.shutdown().await;
//! }
//! ```
mod core;
mod error;
mod events;
mod outcome;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{Combinators, CombinatorsBuilder, Config, all, all_settled, any, race, settle_with};
pub use error::{AggregateError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use outcome::Outcome;
pub use policies::{
    AllPolicy, AllSettledPolicy, AnyPolicy, PolicyKind, Progress, RacePolicy, SettlePolicy, Step,
};
pub use subscribers::{SettleTally, Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskHandle, TaskRef, TaskSpec, TimedTask, spawn_all};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
