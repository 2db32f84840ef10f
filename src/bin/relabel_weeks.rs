//! Relabel Weeks - replaces `week_index_N` fallback labels in a harvest CSV
//! with the real week-ending date.
//!
//! Usage:
//!     relabel_weeks ~/spotify_weekly_charts_2016-2024.csv
//!     relabel_weeks charts.csv --start 2016-12-29 --output charts_fixed.csv

use anyhow::{Context, Result};
use chart_harvester::checkpoint::{read_records, CheckpointStore};
use chart_harvester::relabel::relabel_fallback_weeks;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about = "Repair fallback week labels in a harvest CSV", long_about = None)]
struct Args {
    /// Harvest CSV to repair
    input: PathBuf,

    /// Week-ending date of the first harvested week (week_index_0)
    #[arg(short, long, default_value = "2016-12-29")]
    start: NaiveDate,

    /// Where to write the repaired file (default: overwrite the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report what would change without writing
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut records = read_records(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    info!("Loaded {} rows from {}", records.len(), args.input.display());

    let changed = relabel_fallback_weeks(&mut records, args.start);
    info!("Relabelled {} rows (start week {})", changed, args.start);

    if args.dry_run {
        warn!("DRY RUN MODE - nothing written");
        return Ok(());
    }
    if changed == 0 {
        info!("Nothing to repair.");
        return Ok(());
    }

    let output = args.output.unwrap_or(args.input);
    CheckpointStore::new(&output, 0)
        .flush(&records)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {}", output.display());

    Ok(())
}
