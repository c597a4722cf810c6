use std::env;

use super::probe_config::{ConfigError, Mode, MonitorConfig};

const DEFAULT_OUT_DIR: &str = "../reports";

/// Load the monitor configuration from the process environment.
/// A `.env` file in the working directory is read first when present.
///
/// Recognised variables:
///     * `OUT_DIR` - directory for the daily result files (default `../reports`)
///     * `PROBE_MODE` - `cycle` (default) or `all`, selects the matching preset
///     * `PERSIST_INFO` - `true` to also write Info results to disk
pub fn load_config() -> Result<MonitorConfig, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }
    load_config_from(|key| env::var(key).ok())
}

/// Same as [`load_config`], reading variables through `lookup`.
pub fn load_config_from<F>(lookup: F) -> Result<MonitorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let out_dir = lookup("OUT_DIR").unwrap_or_else(|| DEFAULT_OUT_DIR.to_string());

    let mode = match lookup("PROBE_MODE") {
        Some(value) => value.parse::<Mode>()?,
        None => Mode::Cycle,
    };

    let mut config = MonitorConfig::for_mode(mode, out_dir);

    if let Some(value) = lookup("PERSIST_INFO") {
        config.persist_info = parse_flag("PERSIST_INFO", &value)?;
    }

    log::info!(
        "Probe mode: {}, output directory: {}",
        config.mode,
        config.out_dir.display()
    );

    Ok(config)
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}
