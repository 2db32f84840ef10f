//! Harvest tunables and the randomized pause helper.

use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;

/// Global weekly chart, starting at the last full week of 2016.
pub const DEFAULT_START_URL: &str =
    "https://charts.spotify.com/charts/view/regional-global-weekly/2016-12-29";

/// 2016-12-29 through 2024-12-26 inclusive.
pub const DEFAULT_TOTAL_WEEKS: usize = 418;

pub const DEFAULT_OUTPUT_FILE: &str = "spotify_weekly_charts_2016-2024.csv";

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// A closed range of pause lengths; each pause draws uniformly from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    pub const fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    pub fn sample(&self) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        if hi <= lo {
            return Duration::from_millis(lo);
        }
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }

    /// Sleep for a sampled duration. A zero range returns immediately.
    pub async fn pause(&self) {
        if self.is_zero() {
            return;
        }
        tokio::time::sleep(self.sample()).await;
    }
}

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub start_url: String,
    pub total_weeks: usize,
    /// Flush after every Nth completed iteration.
    pub checkpoint_every: usize,
    pub row_timeout: Duration,
    pub date_timeout: Duration,
    /// After issuing navigation, before the next harvest.
    pub settle_delay: DelayRange,
    /// After harvesting a week, before reading the URL to advance.
    pub cooldown_delay: DelayRange,
    /// Informational only; never enforced.
    pub expected_rows: usize,
    pub output_path: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            total_weeks: DEFAULT_TOTAL_WEEKS,
            checkpoint_every: 10,
            row_timeout: Duration::from_secs(15),
            date_timeout: Duration::from_secs(10),
            settle_delay: DelayRange::from_millis(2_000, 3_000),
            cooldown_delay: DelayRange::from_millis(2_000, 4_000),
            expected_rows: 200,
            output_path: default_output_path(),
        }
    }
}

/// `$HOME/spotify_weekly_charts_2016-2024.csv`, or the working directory
/// when no home directory can be resolved.
pub fn default_output_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_OUTPUT_FILE)
}
