use std::fmt;

use crate::config::MonitorConfig;

use super::result::{FailureKind, ProbeOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Tag written into the daily result file.
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "SLOW",
            Severity::Error => "TIMEOUT",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Thresholds deciding between Info and Warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub time_warn_ms: u64,
    pub throughput_warn_kbps: f64,
    pub size_aware: bool,
}

impl Thresholds {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            time_warn_ms: config.time_warn_ms,
            throughput_warn_kbps: config.throughput_warn_kbps,
            size_aware: config.size_aware,
        }
    }

    /// First match wins: any failure is an Error, a slow probe is a Warning,
    /// everything else is Info.
    pub fn classify(&self, failure: FailureKind, elapsed_ms: u64, throughput_kbps: f64) -> Severity {
        if failure != FailureKind::None {
            return Severity::Error;
        }
        let slow = elapsed_ms > self.time_warn_ms;
        let starved = !self.size_aware || throughput_kbps < self.throughput_warn_kbps;
        if slow && starved {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    pub fn classify_outcome(&self, outcome: &ProbeOutcome) -> Severity {
        self.classify(outcome.failure, outcome.elapsed_ms, outcome.throughput_kbps)
    }
}
