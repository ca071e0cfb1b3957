//! jobwatch CLI
//!
//! Local execution entry point: one-shot runs, a periodic watch loop,
//! and configuration validation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use jobwatch::{
    error::Result,
    models::{CATEGORIES, Config},
    notify::TelegramNotifier,
    pipeline::{self, DeduplicationStore, DispatchReport, Dispatcher},
    utils::http,
};

/// jobwatch - job listings watcher
#[derive(Parser, Debug)]
#[command(name = "jobwatch", version, about = "Watches a job listings board and pushes alerts")]
struct Cli {
    /// Path to the configuration file (created with defaults if missing)
    #[arg(short, long, default_value = "jobwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline once
    Run {
        /// Qualification category to filter for ("All" for everything)
        #[arg(short = 'C', long, default_value = "All")]
        category: String,

        /// Override the configured recency window
        #[arg(long)]
        lookback_hours: Option<i64>,

        /// Fetch and filter only; print records as JSON instead of
        /// dispatching alerts
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the pipeline repeatedly on a fixed interval
    Watch {
        /// Qualification category to filter for ("All" for everything)
        #[arg(short = 'C', long, default_value = "All")]
        category: String,

        /// Seconds between runs
        #[arg(long, default_value_t = 900)]
        interval_secs: u64,
    },

    /// Validate the configuration file
    Validate,
}

/// Warn when a category is outside the known qualification labels.
/// Unrecognized categories still run as literal substring filters.
fn check_category(category: &str) {
    if !CATEGORIES.iter().any(|c| c.eq_ignore_ascii_case(category)) {
        log::warn!("Unrecognized category {category:?}; treating it as a literal filter");
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("jobwatch starting...");

    let mut config = Config::load_or_init(&cli.config)?;
    config.apply_env();
    config.validate()?;

    match cli.command {
        Command::Run {
            category,
            lookback_hours,
            dry_run,
        } => {
            check_category(&category);
            if let Some(hours) = lookback_hours {
                config.lookback_hours = hours;
            }
            let client = http::create_client(&config.http)?;

            if dry_run {
                run_dry(&config, &client, &category).await?;
            } else {
                config.validate_channel()?;
                let dispatcher = build_dispatcher(&config, &client);
                let mut store = DeduplicationStore::new();

                let report =
                    pipeline::run_once(&config, &client, &dispatcher, &mut store, &category)
                        .await?;
                surface_fetch_error(&config, &dispatcher, &report).await;
            }
        }

        Command::Watch {
            category,
            interval_secs,
        } => {
            check_category(&category);
            config.validate_channel()?;
            let client = http::create_client(&config.http)?;
            let dispatcher = build_dispatcher(&config, &client);

            // The store outlives individual runs: a listing is
            // announced once per process lifetime.
            let mut store = DeduplicationStore::new();

            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            log::info!("Watching every {interval_secs}s; press Ctrl-C to stop");
            loop {
                ticker.tick().await;
                // Each run completes before the next tick is taken, so
                // runs never overlap.
                match pipeline::run_once(&config, &client, &dispatcher, &mut store, &category)
                    .await
                {
                    Ok(report) => surface_fetch_error(&config, &dispatcher, &report).await,
                    Err(e) => log::error!("Run failed: {e}"),
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK ({})", cli.config.display());

            match config.validate_channel() {
                Ok(()) => log::info!("✓ Channel credentials present"),
                Err(e) => log::warn!("Channel credentials incomplete: {e}"),
            }

            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}

/// Build the Telegram-backed dispatcher from configuration.
fn build_dispatcher(config: &Config, client: &reqwest::Client) -> Dispatcher {
    let notifier = Arc::new(TelegramNotifier::new(
        client.clone(),
        &config.telegram.bot_token,
    ));
    Dispatcher::new(notifier, config.telegram.chat_id.clone())
        .with_delete_after(Duration::from_secs(config.delete_after_secs))
        .with_empty_notice(config.notify_when_empty)
}

/// Fetch and filter without dispatching; print the records as JSON.
async fn run_dry(config: &Config, client: &reqwest::Client, category: &str) -> Result<()> {
    let selectors = pipeline::SelectorSet::compile(&config.selectors)?;
    let resolver = pipeline::RecencyResolver::new(Some(&config.date_format));
    let base_url = url::Url::parse(&config.target_url)?;

    match pipeline::fetch::fetch_document(client, &config.target_url).await {
        Ok(html) => {
            let records = pipeline::filter_document(
                &html,
                &selectors,
                &resolver,
                &base_url,
                category,
                chrono::Local::now().naive_local(),
            );
            log::info!("{} records match", records.len());
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Err(error) => {
            log::error!("Fetch failed: {error}");
        }
    }
    Ok(())
}

/// Log a recorded fetch failure and optionally mirror it to the
/// channel.
async fn surface_fetch_error(config: &Config, dispatcher: &Dispatcher, report: &DispatchReport) {
    let Some(error) = &report.fetch_error else {
        return;
    };
    log::error!("Fetch failed this run: {error}");

    if config.alert_on_fetch_failure {
        let text = format!("Listings fetch failed: {error}");
        if let Err(e) = dispatcher.announce(&text).await {
            log::warn!("Could not mirror fetch failure to channel: {e}");
        }
    }
}
