//! Week-by-week harvester for a paginated streaming chart leaderboard.
//!
//! A run drives one browser session through a known range of chart weeks:
//! the [`navigator`] positions and advances the page, the [`extractor`]
//! turns table rows into [`ChartRecord`]s, and the [`checkpoint`] store
//! rewrites the accumulated records to disk every few weeks.

use serde::{Deserialize, Serialize};

pub mod browser;
pub mod checkpoint;
pub mod config;
pub mod extractor;
pub mod navigator;
pub mod relabel;
pub mod runner;
pub mod session;

pub use checkpoint::{CheckpointError, CheckpointStore, FinalizeOutcome};
pub use config::{DelayRange, HarvestConfig};
pub use navigator::{NavigationError, Navigator, WeekLabel};
pub use runner::{run_and_close, run_harvest};
pub use session::{RunOutcome, RunSummary, ScrapeSession};

// ============================================================================
// Records
// ============================================================================

/// Artist placeholder for rows whose track cell has no separate artist line.
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// One row of one week's leaderboard, in output column order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChartRecord {
    #[serde(rename = "date_week")]
    pub week_label: String,
    pub title: String,
    pub artist: String,
    #[serde(rename = "weekly_streams")]
    pub streams: Option<u64>,
}
