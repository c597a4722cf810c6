pub mod daily_log;
pub mod format;

use chrono::{DateTime, Utc};

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::http_probe::prelude::*;
use daily_log::DailyLog;
use format::{display_width, format_message};

/// Writes classified outcomes to the console and the daily result file.
#[derive(Debug, Clone)]
pub struct Reporter {
    log: DailyLog,
    size_aware: bool,
    persist_info: bool,
    name_width: usize,
}

impl Reporter {
    pub fn new(log: DailyLog, size_aware: bool, persist_info: bool, name_width: usize) -> Self {
        Self {
            log,
            size_aware,
            persist_info,
            name_width,
        }
    }

    /// Name column is as wide as the longest active target name.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let name_width = config
            .active_targets()
            .map(|t| display_width(&t.name))
            .max()
            .unwrap_or(10);
        Self::new(
            DailyLog::new(config.out_dir.clone()),
            config.size_aware,
            config.persist_info,
            name_width,
        )
    }

    pub fn log(&self) -> &DailyLog {
        &self.log
    }

    pub fn persists(&self, severity: Severity) -> bool {
        match severity {
            Severity::Info => self.persist_info,
            Severity::Warning | Severity::Error => true,
        }
    }

    pub async fn report(&self, outcome: &ProbeOutcome, severity: Severity) -> Result<()> {
        self.report_at(Utc::now(), outcome, severity).await
    }

    pub async fn report_at(
        &self,
        now: DateTime<Utc>,
        outcome: &ProbeOutcome,
        severity: Severity,
    ) -> Result<()> {
        let message = format_message(outcome, self.size_aware, self.name_width);

        match severity {
            Severity::Info => println!("{message}"),
            Severity::Warning | Severity::Error => eprintln!("{message}"),
        }

        if self.persists(severity) {
            self.log.append(now, severity, &message).await?;
        }
        Ok(())
    }
}
