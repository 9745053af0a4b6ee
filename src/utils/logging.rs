use chrono::Local;
use eyre::{Result, WrapErr};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, time::ChronoUtc},
    prelude::*,
};

/// Filter directives for the stderr log, e.g. `STREAMPAY_LOG=debug`.
pub const LOG_FILTER_ENV: &str = "STREAMPAY_LOG";
/// When set, JSON logs are also written into this directory.
pub const LOG_DIR_ENV: &str = "STREAMPAY_LOG_DIR";

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(verbose: bool) -> Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| result = install(verbose));
    result
}

fn console_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(format!("{}=debug", env!("CARGO_CRATE_NAME")));
    }
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn create_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("failed to create log directory {dir:?}"))?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = dir.join(format!("streampay_{timestamp}.json"));
    let file = File::create(&path).wrap_err_with(|| format!("failed to create log file {path:?}"))?;
    Ok((file, path))
}

fn install(verbose: bool) -> Result<()> {
    let log_file = match std::env::var_os(LOG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        Some(dir) => Some(create_log_file(Path::new(&dir))?),
        None => None,
    };
    let log_path = log_file.as_ref().map(|(_, path)| path.clone());

    let json_layer = log_file.map(|(file, _)| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_filter(LevelFilter::DEBUG)
    });

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter(verbose));

    tracing_subscriber::registry()
        .with(json_layer)
        .with(console_layer)
        .try_init()
        .wrap_err("failed to install the log subscriber")?;

    if let Some(path) = log_path {
        tracing::debug!(?path, "JSON logging initialized");
    }
    Ok(())
}
