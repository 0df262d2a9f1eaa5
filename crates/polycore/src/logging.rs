//! Logging initialization
//!
//! Both services log through the `log` facade; this module installs the
//! terminal + file backend once at startup.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use simplelog::{ColorChoice, CombinedLogger, Config, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger};

/// Noisy dependency modules kept out of the service logs
const QUIET_MODULES: &[&str] = &["hyper", "reqwest", "mongodb", "aws_config", "object_store"];

fn service_config() -> Config {
    let mut builder = ConfigBuilder::new();
    for module in QUIET_MODULES {
        builder.add_filter_ignore_str(*module);
    }
    builder.build()
}

/// Installs the process-wide logger: terminal plus `log_file_path`, both at `Info`
///
/// The file is truncated on every start, so each container run gets a fresh
/// log. Fails if the file cannot be created or a logger is already installed.
pub fn init_logger(log_file_path: impl AsRef<Path>) -> Result<()> {
    let log_file_path = log_file_path.as_ref();
    if let Some(parent) = log_file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let log_file = File::create(log_file_path)
        .with_context(|| format!("Failed to create log file {}", log_file_path.display()))?;

    CombinedLogger::init(vec![
        TermLogger::new(LevelFilter::Info, service_config(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Info, service_config(), log_file),
    ])
    .context("Failed to initialize logger")?;

    Ok(())
}

/// Logs a startup banner with the service name and the non-secret settings
pub fn log_startup(service: &str, settings: &[(&str, String)]) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("{} v{}", service, env!("CARGO_PKG_VERSION"));
    for (key, value) in settings {
        log::info!("  {:<18} {}", key, value);
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
