use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{MissedTickBehavior, interval};

use crate::config::{Mode, MonitorConfig, Target};
use crate::error::Result;
use crate::http_probe::prelude::*;
use crate::report::Reporter;
use crate::report::format::timestamp;

/// `[L1, s1, s2, L2, s1, s2, ...]`: every large target followed by all the
/// small ones.
pub fn cycle_sequence(large: &[Target], small: &[Target]) -> Vec<Target> {
    large
        .iter()
        .flat_map(|l| std::iter::once(l).chain(small))
        .cloned()
        .collect()
}

/// Counts of finished probe tasks.
#[derive(Debug, Default)]
pub struct TaskStats {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub succeeded: u64,
    pub failed: u64,
}

impl TaskStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// A failed task is logged and counted; it never reaches the tick loop.
    fn record(&self, joined: Result<Result<()>, JoinError>) {
        match joined {
            Ok(Ok(())) => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(err)) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("Probe task failed: {err}");
            }
            Err(err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                if err.is_panic() {
                    log::error!("Probe task panicked: {err}");
                } else {
                    log::warn!("Probe task cancelled: {err}");
                }
            }
        }
    }
}

/// Drives probes on a fixed interval.
pub struct Scheduler<F> {
    prober: Arc<Prober<F>>,
    reporter: Arc<Reporter>,
    thresholds: Thresholds,
    mode: Mode,
    tick: Duration,
    sequence: Vec<Target>,
    counter: u64,
    stats: Arc<TaskStats>,
}

impl<F: Fetcher> Scheduler<F> {
    pub fn new(config: &MonitorConfig, fetcher: F) -> Self {
        let sequence = match config.mode {
            Mode::Cycle => cycle_sequence(&config.large_targets, &config.small_targets),
            Mode::All => config.small_targets.clone(),
        };

        Self {
            prober: Arc::new(Prober::new(fetcher, config.timeout)),
            reporter: Arc::new(Reporter::from_config(config)),
            thresholds: Thresholds::from_config(config),
            mode: config.mode,
            tick: config.tick,
            sequence,
            counter: 0,
            stats: Arc::new(TaskStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<TaskStats> {
        Arc::clone(&self.stats)
    }

    pub fn sequence(&self) -> &[Target] {
        &self.sequence
    }

    /// Next target of the round robin cycle.
    pub fn next_target(&mut self) -> Option<Target> {
        if self.sequence.is_empty() {
            return None;
        }
        let index = (self.counter % self.sequence.len() as u64) as usize;
        self.counter = self.counter.wrapping_add(1);
        Some(self.sequence[index].clone())
    }

    fn spawn_probe(&self, tasks: &mut JoinSet<Result<()>>, target: Target) {
        let prober = Arc::clone(&self.prober);
        let reporter = Arc::clone(&self.reporter);
        let thresholds = self.thresholds;

        tasks.spawn(async move {
            let outcome = prober.probe(&target).await;
            let severity = thresholds.classify_outcome(&outcome);
            reporter.report(&outcome, severity).await
        });
    }

    /// Probes every target concurrently and waits for all of them. One
    /// target failing or panicking does not affect the others.
    pub async fn fan_out_round(&self) {
        let mut tasks = JoinSet::new();
        for target in &self.sequence {
            self.spawn_probe(&mut tasks, target.clone());
        }
        while let Some(joined) = tasks.join_next().await {
            self.stats.record(joined);
        }
    }

    /// Runs forever. Cycle mode starts one probe per tick without waiting for
    /// the previous one; fan out mode finishes a round before the next tick.
    pub async fn run(mut self) {
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        log::info!(
            "Scheduler started: mode {}, {} targets, tick {:?}, timeout {:?}",
            self.mode,
            self.sequence.len(),
            self.tick,
            self.prober.timeout()
        );

        loop {
            ticker.tick().await;
            println!("{}", timestamp(Utc::now()));

            match self.mode {
                Mode::Cycle => {
                    while let Some(joined) = in_flight.try_join_next() {
                        self.stats.record(joined);
                    }
                    if let Some(target) = self.next_target() {
                        self.spawn_probe(&mut in_flight, target);
                    }
                }
                Mode::All => self.fan_out_round().await,
            }
        }
    }
}
