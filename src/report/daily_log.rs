use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use super::format::format_line;
use crate::error::{MonitorError, Result};
use crate::http_probe::prelude::Severity;

/// Append-only result file, one per UTC day.
#[derive(Debug, Clone)]
pub struct DailyLog {
    out_dir: PathBuf,
}

impl DailyLog {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// `{out_dir}/results_YYYY-MM-DD.txt` for the UTC date of `now`.
    pub fn path_for(&self, now: DateTime<Utc>) -> PathBuf {
        self.out_dir
            .join(format!("results_{}.txt", now.format("%Y-%m-%d")))
    }

    /// Appends a single line. The whole line goes out in one write so
    /// concurrent appends do not interleave mid line.
    pub async fn append(&self, now: DateTime<Utc>, severity: Severity, message: &str) -> Result<()> {
        let path = self.path_for(now);
        let line = format_line(now, severity, message);
        let write_err = |source| MonitorError::LogWrite {
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(write_err)?;
        file.write_all(line.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        Ok(())
    }
}
