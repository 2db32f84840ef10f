//! Run-scoped state, owned by the harvest loop and lent out per step.

use chrono::NaiveDate;
use std::fmt;

use crate::ChartRecord;

/// State of one harvest run.
///
/// `current_page_date` is written only by [`crate::Navigator::advance`];
/// `collected` only grows.
#[derive(Debug, Default, Clone)]
pub struct ScrapeSession {
    pub current_page_date: Option<NaiveDate>,
    pub iteration_index: usize,
    pub collected: Vec<ChartRecord>,
}

impl ScrapeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with records, e.g. for flushing a known state.
    pub fn with_records(collected: Vec<ChartRecord>) -> Self {
        Self {
            collected,
            ..Self::default()
        }
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ChartRecord>) {
        self.collected.extend(records);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// Stopped early on a navigation failure; carries the reason.
    Terminated(String),
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed => write!(f, "completed"),
            RunOutcome::Terminated(reason) => write!(f, "terminated early ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub weeks_attempted: usize,
    pub weeks_empty: usize,
    pub rows_seen: usize,
    pub rows_skipped: usize,
    pub records: usize,
    pub flushes: usize,
    pub fallback_labels: usize,
    pub outcome: RunOutcome,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            weeks_attempted: 0,
            weeks_empty: 0,
            rows_seen: 0,
            rows_skipped: 0,
            records: 0,
            flushes: 0,
            fallback_labels: 0,
            outcome: RunOutcome::Completed,
        }
    }
}
