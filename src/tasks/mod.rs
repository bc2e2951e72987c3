//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for task recipes producing a fresh future per spawn
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`TaskHandle`] - a running task with one-shot settlement observers
//! - [`TaskSpec`] - timed task configuration (settle after a delay)

mod handle;
mod spec;
mod task;
mod task_fn;

pub use handle::TaskHandle;
pub use spec::{TaskSpec, TimedTask, spawn_all};
pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
