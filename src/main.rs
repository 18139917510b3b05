use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{error, info, Level};

mod config;
mod enrich;
mod hub;
mod model;
mod report;
mod runner;
mod scrape;

use config::Settings;
use hub::HubClient;
use report::NotionPublisher;
use runner::ModelTracker;
use scrape::TrendScraper;

/// AI model trend tracker: scrapes the hub's trending page, enriches the
/// models with commit history and trend reasons, and publishes a narrated
/// daily report to Notion.
#[derive(Parser)]
#[command(name = "trendcast", version, about = "AI model trend tracker")]
struct Cli {
    /// Validate the configuration and exit without running an update
    #[arg(long)]
    check: bool,

    /// Keep running and fire the update at the configured time every day
    #[arg(long)]
    schedule: bool,
}

/// Main entry point.
///
/// Loads settings, wires up logging, and either validates the config
/// (--check), runs the daily loop (--schedule), or performs one immediate
/// update. Any unhandled run error is logged here and exits non-zero.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    // Load settings first; configuration errors are fatal before any work
    let settings = Settings::new()?;

    // Initialize the subscriber before any other work
    let log_dir = settings
        .logging
        .file
        .as_deref()
        .unwrap_or_else(|| Path::new("logs"));
    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        log_dir,
        "trendcast",
    );

    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let level = match settings.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .with_max_level(level)
        .init();

    info!("trendcast starting up...");

    if cli.check {
        info!("Configuration validated");
        return Ok(());
    }

    let tracker = ModelTracker::new(
        TrendScraper::new(&settings.hub)?,
        HubClient::new(&settings.hub)?,
        NotionPublisher::new(
            settings.notion.clone(),
            settings.narration.clone(),
            settings.hub.base_url.clone(),
        )?,
        settings.hub.model_limit,
    );

    let result = if cli.schedule {
        tracker.run_scheduled(&settings.schedule.update_time).await
    } else {
        tracker.run_update().await
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        return Err(e.into());
    }

    Ok(())
}
