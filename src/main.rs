use anyhow::{Context, Result};
use log::{error, info, warn};
use simplelog::{Config, ConfigBuilder, LevelFilter, WriteLogger};
use std::error::Error as _;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use model_fetcher::config::load_dotenv;
use model_fetcher::report::Report;
use model_fetcher::{FetchConfig, FetchOutcome, Fetcher};

fn log_file_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("LOG_FILE").filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let log_dir = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("Failed to get base directories"))?
        .data_local_dir()
        .join("model-fetcher")
        .join("logs");

    Ok(log_dir.join(format!(
        "fetch_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )))
}

fn setup_logging() -> Result<()> {
    let level = match std::env::var("LOG_LEVEL") {
        Ok(value) => value
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| anyhow::anyhow!("Invalid LOG_LEVEL: {value}"))?,
        Err(_) => LevelFilter::Info,
    };

    let log_file = log_file_path()?;
    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context("Failed to create log directory")?;
    }

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Debug)
        .build();

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    WriteLogger::init(level, config, file).context("Failed to install logger")?;

    Ok(())
}

/// Logging never blocks the fetch: without a usable log file, warnings and
/// errors go to stderr instead.
fn init_logging() {
    if let Err(e) = setup_logging() {
        eprintln!("warning: {e:#}; logging to stderr");
        let _ = WriteLogger::init(LevelFilter::Warn, Config::default(), io::stderr());
        warn!("File logging unavailable: {:#}", e);
    }
}

fn run() -> model_fetcher::Result<FetchOutcome> {
    let config = FetchConfig::from_env()?;
    info!("Model URL: {}", config.url);

    Fetcher::new(config)?.run()
}

fn main() -> ExitCode {
    // LOG_FILE and LOG_LEVEL may come from .env too.
    let dotenv = load_dotenv();
    init_logging();
    if let Some(path) = dotenv {
        info!("Loaded environment from {:?}", path);
    }

    info!("model-fetcher starting");

    let result = run();
    match &result {
        Ok(outcome) => info!("Model available at {:?} ({} bytes)", outcome.path, outcome.bytes),
        Err(e) => {
            error!("Model fetch failed: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
        }
    }

    let report = Report::from_result(&result);
    println!("{}", report.line);
    report.exit_code()
}
