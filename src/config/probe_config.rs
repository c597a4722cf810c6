use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use super::targets;

/// Latency above which a probe is considered slow.
pub const TIME_WARN_MS: u64 = 500;

/// Throughput below which a slow probe is reported. Far above anything a
/// favicon reaches, so in practice the rule is latency driven.
pub const THROUGHPUT_WARN_KBPS: f64 = 1_000_000.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the fetch timeout must be greater than zero")]
    ZeroTimeout,

    #[error("the tick interval must be greater than zero")]
    ZeroTick,

    #[error("no {0} targets configured")]
    NoTargets(&'static str),

    #[error("target name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("target '{name}' has an invalid url '{url}': {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },

    #[error("unknown probe mode '{0}', expected 'cycle' or 'all'")]
    UnknownMode(String),

    #[error("{var} must be 'true' or 'false', got '{value}'")]
    InvalidFlag { var: &'static str, value: String },
}

/// A named endpoint to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Human readable label, unique within a configuration.
    pub name: String,

    /// Fully qualified URL fetched on every probe.
    pub url: String,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// How targets are scheduled across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One target per tick, cycling through the large targets interleaved with
    /// the small ones.
    Cycle,

    /// Every small target concurrently on each tick.
    All,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cycle" => Ok(Mode::Cycle),
            "all" => Ok(Mode::All),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Cycle => f.write_str("cycle"),
            Mode::All => f.write_str("all"),
        }
    }
}

/// Complete monitor configuration. Built once at startup and passed into the
/// scheduler; nothing reads it from global state.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Upper bound for a single fetch, body included.
    pub timeout: Duration,

    /// Elapsed milliseconds above which a probe may be classified as slow.
    pub time_warn_ms: u64,

    /// Throughput threshold used by the size aware rule.
    pub throughput_warn_kbps: f64,

    /// Interval between scheduler ticks.
    pub tick: Duration,

    pub mode: Mode,

    /// When set, a slow probe also needs low throughput to be reported, and
    /// messages carry the size and throughput columns.
    pub size_aware: bool,

    /// Write Info results to the daily file as well. Off by default.
    pub persist_info: bool,

    /// Large assets, only used by [`Mode::Cycle`].
    pub large_targets: Vec<Target>,

    pub small_targets: Vec<Target>,

    /// Directory receiving the `results_YYYY-MM-DD.txt` files.
    pub out_dir: PathBuf,
}

impl MonitorConfig {
    /// One target per second, size aware classification, 10 second timeout.
    pub fn round_robin(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            timeout: Duration::from_secs(10),
            time_warn_ms: TIME_WARN_MS,
            throughput_warn_kbps: THROUGHPUT_WARN_KBPS,
            tick: Duration::from_secs(1),
            mode: Mode::Cycle,
            size_aware: true,
            persist_info: false,
            large_targets: targets::large_targets(),
            small_targets: targets::small_targets(),
            out_dir: out_dir.into(),
        }
    }

    /// All small targets every round, latency only classification. The tick
    /// equals the timeout so rounds never overlap.
    pub fn fan_out(out_dir: impl Into<PathBuf>) -> Self {
        let timeout = Duration::from_secs(5);
        Self {
            timeout,
            time_warn_ms: TIME_WARN_MS,
            throughput_warn_kbps: THROUGHPUT_WARN_KBPS,
            tick: timeout,
            mode: Mode::All,
            size_aware: false,
            persist_info: false,
            large_targets: Vec::new(),
            small_targets: targets::small_targets(),
            out_dir: out_dir.into(),
        }
    }

    /// Preset matching the given mode.
    pub fn for_mode(mode: Mode, out_dir: impl Into<PathBuf>) -> Self {
        match mode {
            Mode::Cycle => Self::round_robin(out_dir),
            Mode::All => Self::fan_out(out_dir),
        }
    }

    /// Targets the active mode can probe.
    pub fn active_targets(&self) -> impl Iterator<Item = &Target> {
        let large: &[Target] = match self.mode {
            Mode::Cycle => &self.large_targets,
            Mode::All => &[],
        };
        large.iter().chain(self.small_targets.iter())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        if self.small_targets.is_empty() {
            return Err(ConfigError::NoTargets("small"));
        }
        if self.mode == Mode::Cycle && self.large_targets.is_empty() {
            return Err(ConfigError::NoTargets("large"));
        }

        let mut seen = HashSet::new();
        for target in self.large_targets.iter().chain(self.small_targets.iter()) {
            if !seen.insert(target.name.as_str()) {
                return Err(ConfigError::DuplicateName(target.name.clone()));
            }
            validate_url(target)?;
        }
        Ok(())
    }
}

fn validate_url(target: &Target) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name: target.name.clone(),
        url: target.url.clone(),
        reason,
    };

    let parsed = Url::parse(&target.url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
