//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [started] run=0 policy=all tasks=3
//! [settled] run=0 policy=all task="item-1" index=1 outcome=rejected progress=1/3
//! [decided] run=0 policy=all outcome=rejected progress=1/3 elapsed=1000ms
//! [discarded] run=0 policy=all task="item-0" index=0 outcome=fulfilled
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Renders one event as a single log line.
pub(crate) fn render(e: &Event) -> String {
    let run = e.run.map_or_else(|| "-".to_string(), |r| r.to_string());
    let policy = e.policy.map_or("-", |p| p.as_str());
    let task = e.task.as_deref().unwrap_or("unknown");
    let outcome = e.outcome.unwrap_or("-");
    let progress = format!("{}/{}", e.settled.unwrap_or(0), e.total.unwrap_or(0));

    match e.kind {
        EventKind::CombinatorStarted => {
            format!("[started] run={run} policy={policy} tasks={}", e.total.unwrap_or(0))
        }
        EventKind::TaskSettled => format!(
            "[settled] run={run} policy={policy} task={task:?} index={:?} outcome={outcome} progress={progress}",
            e.index.unwrap_or_default()
        ),
        EventKind::CombinatorDecided => format!(
            "[decided] run={run} policy={policy} outcome={outcome} progress={progress} elapsed={}ms",
            e.elapsed_ms.unwrap_or(0)
        ),
        EventKind::SettlementDiscarded => format!(
            "[discarded] run={run} policy={policy} task={task:?} index={:?} outcome={outcome}",
            e.index.unwrap_or_default()
        ),
        EventKind::SubscriberOverflow => format!(
            "[subscriber-overflow] subscriber={task} reason={}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::SubscriberPanicked => format!(
            "[subscriber-panicked] subscriber={task} info={}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", render(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::policies::PolicyKind;

    #[test]
    fn test_render_decided_line() {
        let ev = Event::new(EventKind::CombinatorDecided)
            .with_run(0)
            .with_policy(PolicyKind::All)
            .with_outcome("rejected")
            .with_progress(1, 3)
            .with_elapsed(Duration::from_secs(1));
        assert_eq!(
            render(&ev),
            "[decided] run=0 policy=all outcome=rejected progress=1/3 elapsed=1000ms"
        );
    }

    #[test]
    fn test_render_settled_line() {
        let ev = Event::new(EventKind::TaskSettled)
            .with_run(4)
            .with_policy(PolicyKind::Race)
            .with_task("item-1")
            .with_index(1)
            .with_outcome("rejected")
            .with_progress(1, 3);
        assert_eq!(
            render(&ev),
            r#"[settled] run=4 policy=race task="item-1" index=1 outcome=rejected progress=1/3"#
        );
    }
}
