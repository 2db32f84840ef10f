//! Turning a loaded chart page into [`ChartRecord`]s.
//!
//! Failures are contained per row: a bad row is skipped and logged, the
//! rest of the page is still harvested.

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::browser::{DriverError, Locator, PageDriver};
use crate::{ChartRecord, UNKNOWN_ARTIST};

// ============================================================================
// Page schema
// ============================================================================

/// Data rows only: header rows carry no track link.
pub const ROW_XPATH: &str = "//tr[@data-encore-id='tableRow'][.//a[contains(@href, '/track/')]]";
pub const CELL_SELECTOR: &str = "td";
/// Rows with fewer cells than this are malformed.
pub const MIN_CELLS: usize = 6;
/// Title and artist, separated by a newline.
pub const TITLE_ARTIST_CELL_INDEX: usize = 2;
pub const STREAMS_CELL_INDEX: usize = 6;

pub const THOUSANDS_SEPARATOR: char = ',';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowSkip {
    #[error("row has only {0} cells")]
    TooFewCells(usize),

    #[error("row has no cell at index {0}")]
    MissingCell(usize),

    #[error("row parse error: {0}")]
    Driver(#[from] DriverError),
}

/// Result of harvesting one page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageHarvest {
    pub records: Vec<ChartRecord>,
    pub skipped: usize,
}

/// Split `"Title\nArtist"` on the first newline. Without one, the whole text
/// is the title and the artist is [`UNKNOWN_ARTIST`].
pub fn split_title_artist(text: &str) -> (String, String) {
    match text.split_once('\n') {
        Some((title, artist)) => (title.trim().to_string(), artist.trim().to_string()),
        None => (text.trim().to_string(), UNKNOWN_ARTIST.to_string()),
    }
}

/// `"1,234,567"` → `Some(1234567)`. Anything that is not purely digits once
/// separators and surrounding whitespace are removed is `None`.
pub fn parse_streams(raw: &str) -> Option<u64> {
    let cleaned: String = raw.chars().filter(|c| *c != THOUSANDS_SEPARATOR).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

pub struct Extractor<'d, D: PageDriver> {
    driver: &'d D,
    row_timeout: Duration,
    expected_rows: usize,
}

impl<'d, D: PageDriver> Extractor<'d, D> {
    pub fn new(driver: &'d D, row_timeout: Duration, expected_rows: usize) -> Self {
        Self {
            driver,
            row_timeout,
            expected_rows,
        }
    }

    /// Data rows on the current page. Empty, with a warning, when none show
    /// up within the row timeout.
    pub async fn wait_for_rows(&self) -> Vec<D::Element> {
        let locator = Locator::XPath(ROW_XPATH);
        if let Err(e) = self.driver.wait_for(locator, self.row_timeout).await {
            warn!("No song rows found for this week: {}", e);
            return Vec::new();
        }
        match self.driver.find_all(locator).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("No song rows found for this week: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn extract_row(
        &self,
        row: &D::Element,
        week_label: &str,
    ) -> Result<ChartRecord, RowSkip> {
        let cells = self
            .driver
            .find_children(row, Locator::Css(CELL_SELECTOR))
            .await?;
        if cells.len() < MIN_CELLS {
            return Err(RowSkip::TooFewCells(cells.len()));
        }

        let track_info = self.cell_text(&cells, TITLE_ARTIST_CELL_INDEX).await?;
        let streams = self.cell_text(&cells, STREAMS_CELL_INDEX).await?;

        let (title, artist) = split_title_artist(&track_info);
        Ok(ChartRecord {
            week_label: week_label.to_string(),
            title,
            artist,
            streams: parse_streams(&streams),
        })
    }

    async fn cell_text(&self, cells: &[D::Element], index: usize) -> Result<String, RowSkip> {
        let cell = cells.get(index).ok_or(RowSkip::MissingCell(index))?;
        Ok(self.driver.text(cell).await?.trim().to_string())
    }

    /// Extract every row, skipping the ones that fail.
    pub async fn harvest(&self, rows: &[D::Element], week_label: &str) -> PageHarvest {
        info!("Scraping {} songs for week: {}", rows.len(), week_label);
        if rows.len() != self.expected_rows {
            debug!(
                "Row count {} differs from the usual {}",
                rows.len(),
                self.expected_rows
            );
        }

        let mut harvest = PageHarvest::default();
        for (i, row) in rows.iter().enumerate() {
            match self.extract_row(row, week_label).await {
                Ok(record) => harvest.records.push(record),
                Err(e) => {
                    debug!("Skipping row {}: {}", i, e);
                    harvest.skipped += 1;
                }
            }
        }
        harvest
    }
}
