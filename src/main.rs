//! autoquality - selects the best stream quality in the w.tv player.
//!
//! Main entry point for the autoquality CLI.

mod cli;
mod discovery;
mod page_runner;
mod simulate;

use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use autoquality_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use autoquality_core::{CancellationToken, LabelMatcher, MenuItem};

use crate::cli::{Cli, Commands, ConfigAction};

/// Keeps the file writer flushing for the life of the process.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let file_layer = if logging.file {
        let log_dir = logging.directory_path();
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("autoquality")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&log_dir)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);
        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    // RUST_LOG wins over the configured level.
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing(&config.logging)?;

    match cli.command {
        None => run_watch(config, None, Vec::new()).await,
        Some(Commands::Run { endpoint, matches }) => run_watch(config, endpoint, matches).await,
        Some(Commands::Pick { labels }) => {
            pick(&config, &labels);
            Ok(())
        }
        Some(Commands::Simulate { delay_step, labels }) => {
            run_simulation(&config, delay_step, labels).await
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Check => check_config(&cli.config, &config),
        },
    }
}

async fn run_watch(mut config: Config, endpoint: Option<String>, matches: Vec<String>) -> Result<()> {
    if let Some(endpoint) = endpoint {
        config.browser.endpoint = endpoint;
    }
    if !matches.is_empty() {
        config.browser.match_urls = matches;
    }

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        for error in &validation.errors {
            error!("{}: {}", error.path, error.message);
        }
        bail!("Invalid configuration");
    }
    discovery::ensure_runnable(&config)?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl-C, shutting down"),
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            }
            shutdown.cancel();
        }
    });

    info!(
        endpoint = %config.browser.endpoint,
        matches = ?config.browser.match_urls,
        "Starting autoquality"
    );
    discovery::run(Arc::new(config), shutdown).await
}

fn pick(config: &Config, labels: &[String]) {
    println!("{}", describe_pick(config, labels));
}

/// One line naming the label the matcher would click, or `none`.
fn describe_pick(config: &Config, labels: &[String]) -> String {
    let matcher = LabelMatcher::new(config.selection.preference_list());
    let offered: Vec<MenuItem<usize>> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| MenuItem::new(label.as_str(), i))
        .collect();

    match matcher.select_best(&offered) {
        Some(found) => format!(
            "{} (menu item {}, preference #{} \"{}\", {:?} match)",
            found.item.label,
            found.item.handle + 1,
            found.rank + 1,
            found.pattern,
            found.kind
        ),
        None => "none".to_string(),
    }
}

async fn run_simulation(config: &Config, delay_step: usize, labels: Option<Vec<String>>) -> Result<()> {
    let labels = labels.unwrap_or_else(|| {
        simulate::DEFAULT_LABELS
            .iter()
            .map(|l| l.to_string())
            .collect()
    });
    let report = simulate::run(config, delay_step, &labels).await?;

    match &report.selected {
        Some(label) => println!("selected: {}", label),
        None => println!("selected: none"),
    }
    println!("attempts: {}", report.attempts);
    println!("mutations: {}", report.mutations);
    println!("plays: {}", report.plays);
    Ok(())
}

fn check_config(path: &std::path::Path, config: &Config) -> Result<()> {
    if !path.exists() {
        println!("{} not found; using defaults", path.display());
    }

    let validation = ConfigValidator::validate(config);
    for error in &validation.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    for warning in &validation.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }

    if !validation.is_valid() {
        bail!(
            "Invalid configuration: {} error(s) in {}",
            validation.errors.len(),
            path.display()
        );
    }
    println!("Configuration OK");
    Ok(())
}
