//! Network heartbeat monitor.
//!
//! Probes a fixed list of HTTP endpoints on a timer, measures latency and
//! throughput, classifies each probe as Info, Warning (slow) or Error, and
//! writes the results to the console and to a daily result file.

pub mod config;
pub mod error;
pub mod http_probe;
pub mod monitor;
pub mod report;
pub mod schedule;

pub use config::{Mode, MonitorConfig, Target};
pub use error::MonitorError;
pub use monitor::{MonitorHandle, run, start, start_with};
