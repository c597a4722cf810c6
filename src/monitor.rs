use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::http_probe::prelude::*;
use crate::schedule::{Scheduler, StatsSnapshot, TaskStats};

/// A running monitor. Dropping the handle leaves the monitor running.
pub struct MonitorHandle {
    task: JoinHandle<()>,
    stats: Arc<TaskStats>,
    out_dir: PathBuf,
}

impl MonitorHandle {
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Absolute directory the result files are written to.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Starts the round robin monitor writing into `out_dir` and returns
/// immediately. Must be called from within a tokio runtime.
pub fn run(out_dir: impl AsRef<Path>) -> Result<MonitorHandle> {
    start(MonitorConfig::round_robin(out_dir.as_ref()))
}

/// Validates `config`, prepares the output directory and spawns the scheduler
/// with the reqwest fetcher.
pub fn start(config: MonitorConfig) -> Result<MonitorHandle> {
    let fetcher = ReqwestFetcher::new(config.timeout)?;
    start_with(config, fetcher)
}

/// Same as [`start`] with a caller supplied transport.
pub fn start_with<F: Fetcher>(mut config: MonitorConfig, fetcher: F) -> Result<MonitorHandle> {
    config.validate()?;
    config.out_dir = prepare_out_dir(&config.out_dir)?;

    let scheduler = Scheduler::new(&config, fetcher);
    let stats = scheduler.stats();
    log::info!("Writing results to {}", config.out_dir.display());
    let task = tokio::spawn(scheduler.run());

    Ok(MonitorHandle {
        task,
        stats,
        out_dir: config.out_dir,
    })
}

fn prepare_out_dir(out_dir: &Path) -> Result<PathBuf> {
    let to_err = |source| MonitorError::OutDir {
        path: out_dir.to_path_buf(),
        source,
    };
    let absolute = std::path::absolute(out_dir).map_err(to_err)?;
    std::fs::create_dir_all(&absolute).map_err(to_err)?;
    Ok(absolute)
}
