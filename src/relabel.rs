//! Repairing fallback week labels after a run.
//!
//! A `week_index_N` label stands for the Nth week of the run, so its real
//! date is `start + 7 * N`.

use chrono::{Duration, NaiveDate};

use crate::navigator::FALLBACK_PREFIX;
use crate::ChartRecord;

/// Index encoded in a fallback label, if `label` is one.
pub fn fallback_index(label: &str) -> Option<i64> {
    label.strip_prefix(FALLBACK_PREFIX)?.parse().ok()
}

pub fn week_date(start: NaiveDate, index: i64) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::try_weeks(index)?)
}

/// Rewrite fallback labels in place. Returns how many records changed.
pub fn relabel_fallback_weeks(records: &mut [ChartRecord], start: NaiveDate) -> usize {
    let mut changed = 0;
    for record in records.iter_mut() {
        let Some(date) = fallback_index(&record.week_label).and_then(|i| week_date(start, i)) else {
            continue;
        };
        record.week_label = date.format("%Y-%m-%d").to_string();
        changed += 1;
    }
    changed
}
