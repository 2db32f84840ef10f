//! Chart Harvester - walks a weekly chart one week at a time through a real
//! browser session and checkpoints every row to CSV.
//!
//! Needs a WebDriver endpoint (e.g. `chromedriver --port=4444`). The run
//! pauses after opening the start page so the operator can log in.

use anyhow::{Context, Result};
use chart_harvester::browser::{PageDriver, WebDriverSession};
use chart_harvester::config::{self, DelayRange, HarvestConfig};
use chart_harvester::{run_and_close, Navigator, RunOutcome, ScrapeSession};
use clap::Parser;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about = "Harvest a weekly streaming chart into CSV", long_about = None)]
struct Args {
    /// First chart week to load; must end in /YYYY-MM-DD
    #[arg(long, default_value = config::DEFAULT_START_URL)]
    start_url: String,

    /// Number of weeks to harvest
    #[arg(short = 'n', long, default_value_t = config::DEFAULT_TOTAL_WEEKS)]
    total_weeks: usize,

    /// Rewrite the output file every N weeks
    #[arg(long, default_value_t = 10)]
    checkpoint_every: usize,

    /// Output CSV (default: ~/spotify_weekly_charts_2016-2024.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// WebDriver endpoint (can also use WEBDRIVER_URL env var)
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Seconds to wait for chart rows on each page
    #[arg(long, default_value_t = 15)]
    row_timeout_secs: u64,

    /// Seconds to wait for the week date indicator
    #[arg(long, default_value_t = 10)]
    date_timeout_secs: u64,

    /// Minimum pause after each navigation, in milliseconds
    #[arg(long, default_value_t = 2000)]
    settle_min_ms: u64,

    /// Maximum pause after each navigation, in milliseconds
    #[arg(long, default_value_t = 3000)]
    settle_max_ms: u64,

    /// Minimum pause between finishing a week and moving on, in milliseconds
    #[arg(long, default_value_t = 2000)]
    cooldown_min_ms: u64,

    /// Maximum pause between finishing a week and moving on, in milliseconds
    #[arg(long, default_value_t = 4000)]
    cooldown_max_ms: u64,

    /// Rows a full chart week normally has (logged, not enforced)
    #[arg(long, default_value_t = 200)]
    expected_rows: usize,

    /// Skip the interactive login pause
    #[arg(long, default_value_t = false)]
    no_pause: bool,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn harvest_config(&self) -> HarvestConfig {
        let defaults = HarvestConfig::default();
        HarvestConfig {
            start_url: self.start_url.clone(),
            total_weeks: self.total_weeks,
            checkpoint_every: self.checkpoint_every,
            row_timeout: Duration::from_secs(self.row_timeout_secs),
            date_timeout: Duration::from_secs(self.date_timeout_secs),
            settle_delay: DelayRange::from_millis(self.settle_min_ms, self.settle_max_ms),
            cooldown_delay: DelayRange::from_millis(self.cooldown_min_ms, self.cooldown_max_ms),
            expected_rows: self.expected_rows,
            output_path: self.output.clone().unwrap_or(defaults.output_path),
        }
    }
}

async fn wait_for_operator() -> Result<()> {
    println!("SCRIPT PAUSED: log in, make sure the start week is loaded, then press Enter.");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read from stdin")?;
    Ok(())
}

/// Open the start week and hand over to the operator.
async fn prepare(
    driver: &WebDriverSession,
    config: &HarvestConfig,
    session: &mut ScrapeSession,
    no_pause: bool,
) -> Result<()> {
    let navigator = Navigator::new(driver, config.date_timeout, config.settle_delay);
    navigator
        .open(session, &config.start_url)
        .await
        .context("Failed to open start URL")?;

    if no_pause {
        warn!("Login pause skipped");
    } else {
        wait_for_operator().await?;
    }
    info!("Resuming script. Starting scrape...");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.harvest_config();
    let webdriver_url = args
        .webdriver_url
        .clone()
        .or_else(|| env::var("WEBDRIVER_URL").ok())
        .unwrap_or_else(|| config::DEFAULT_WEBDRIVER_URL.to_string());

    info!("Starting Chart Harvester...");
    info!(
        "Harvesting {} weeks into {}",
        config.total_weeks,
        config.output_path.display()
    );

    let driver = WebDriverSession::connect(&webdriver_url)
        .await
        .with_context(|| format!("Failed to start browser via {}", webdriver_url))?;

    let mut session = ScrapeSession::new();
    if let Err(e) = prepare(&driver, &config, &mut session, args.no_pause).await {
        if let Err(close_err) = driver.close().await {
            warn!("Failed to close browser cleanly: {}", close_err);
        }
        return Err(e);
    }

    let summary = run_and_close(&driver, &config, &mut session)
        .await
        .context("Failed to save harvested records")?;

    if let RunOutcome::Terminated(reason) = &summary.outcome {
        warn!("Harvest stopped early: {}", reason);
    }
    info!("Harvest complete.");

    Ok(())
}
