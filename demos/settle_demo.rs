//! # Example: Settlement combinators
//!
//! Runs every combinator over four timed configurations and prints what each
//! one resolves with, plus how long the staggered configuration took.
//! Finishes with a cut-off: slow work raced against a deadline.
//!
//! ```bash
//! cargo run --example settle_demo --features logging
//! ```

use std::{sync::Arc, time::Duration};

use tokio::time::Instant;

use tasksettle::{Combinators, Config, LogWriter, Subscribe, TaskSpec, spawn_all};

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Named timed configurations.
fn configs() -> [(&'static str, Vec<TaskSpec>); 4] {
    [
        (
            "allPassing",
            vec![TaskSpec::resolve(secs(1)), TaskSpec::resolve(secs(1))],
        ),
        (
            "someFail",
            vec![
                TaskSpec::resolve(secs(1)),
                TaskSpec::reject(secs(1)),
                TaskSpec::resolve(secs(1)),
            ],
        ),
        (
            "allFail",
            vec![TaskSpec::reject(secs(1)), TaskSpec::reject(secs(1))],
        ),
        (
            "raceCondition",
            vec![TaskSpec::resolve(secs(2)), TaskSpec::resolve(secs(1))],
        ),
    ]
}

fn report(name: &str, label: &str, started: Instant) {
    if label == "raceCondition" {
        println!(
            "Time ~ {name} ~ {label}: {} seconds",
            started.elapsed().as_secs_f64().round()
        );
    }
}

async fn with_all(c: &Combinators) {
    for (label, specs) in configs() {
        let started = Instant::now();
        match c.all(spawn_all(&specs)).await {
            Ok(values) => println!(" withAll ~ {label}: {values:?}"),
            Err(err) => eprintln!(" withAll ~ {label}: {err}"),
        }
        report("withAll", label, started);
    }
}

async fn with_all_settled(c: &Combinators) {
    for (label, specs) in configs() {
        let started = Instant::now();
        let outcomes = c.all_settled(spawn_all(&specs)).await;
        println!(" withAllSettled ~ {label}: {outcomes:?}");
        report("withAllSettled", label, started);
    }
}

async fn with_any(c: &Combinators) {
    for (label, specs) in configs() {
        let started = Instant::now();
        match c.any(spawn_all(&specs)).await {
            Ok(value) => println!(" withAny ~ {label}: {value}"),
            Err(err) => eprintln!(" withAny ~ {label}: {err} {:?}", err.errors()),
        }
        report("withAny", label, started);
    }
}

async fn with_race(c: &Combinators) {
    for (label, specs) in configs() {
        let started = Instant::now();
        match c.race(spawn_all(&specs)).await.into_result() {
            Ok(value) => println!(" withRace ~ {label}: {value}"),
            Err(err) => eprintln!(" withRace ~ {label}: {err}"),
        }
        report("withRace", label, started);
    }
}

async fn test_cutoff(c: &Combinators) {
    let slow_work = TaskSpec::resolve(secs(10)).spawn(0);
    if let Err(err) = c
        .race(vec![slow_work.clone(), TaskSpec::deadline(secs(5))])
        .await
        .into_result()
    {
        println!("{err}");
    }
    println!("slow work still running: {}", !slow_work.is_settled());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
    let combinators = Combinators::builder(Config::default())
        .with_subscribers(subs)
        .build();

    with_all(&combinators).await;
    with_all_settled(&combinators).await;
    with_any(&combinators).await;
    with_race(&combinators).await;
    test_cutoff(&combinators).await;

    combinators.shutdown().await;
}
