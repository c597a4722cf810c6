use std::process::ExitCode;

use netpulse::config::app_config::load_config;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let handle = match netpulse::start(config) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Failed to start monitor: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Cannot listen for shutdown signal, running until killed: {e}");
        std::future::pending::<()>().await;
    }

    let stats = handle.stats();
    log::info!(
        "Shutting down after {} completed and {} failed probes",
        stats.succeeded,
        stats.failed
    );
    handle.abort();

    ExitCode::SUCCESS
}
