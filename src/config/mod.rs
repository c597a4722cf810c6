pub mod app_config;
pub mod probe_config;
pub mod targets;

pub use probe_config::{ConfigError, Mode, MonitorConfig, Target};
