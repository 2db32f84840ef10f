//! The harvest loop: position, extract, checkpoint, advance.

use tracing::{debug, error, info, warn};

use crate::browser::PageDriver;
use crate::checkpoint::{CheckpointError, CheckpointStore, FinalizeOutcome};
use crate::config::HarvestConfig;
use crate::extractor::Extractor;
use crate::navigator::Navigator;
use crate::session::{RunOutcome, RunSummary, ScrapeSession};

/// Harvest `config.total_weeks` weeks starting from the page the browser is
/// on now.
///
/// Row and page problems are absorbed; a navigation failure ends the loop
/// early. Either way the collected records get one final save. Only write
/// failures are returned as errors.
pub async fn run_harvest<D: PageDriver>(
    driver: &D,
    config: &HarvestConfig,
    session: &mut ScrapeSession,
) -> Result<RunSummary, CheckpointError> {
    let navigator = Navigator::new(driver, config.date_timeout, config.settle_delay);
    let extractor = Extractor::new(driver, config.row_timeout, config.expected_rows);
    let store = CheckpointStore::new(&config.output_path, config.checkpoint_every);
    let mut summary = RunSummary::default();

    for i in 0..config.total_weeks {
        session.iteration_index = i;
        info!("Scraping week {} of {}...", i + 1, config.total_weeks);

        let rows = extractor.wait_for_rows().await;
        let label = navigator.current_identity(i).await;
        if label.is_fallback() {
            summary.fallback_labels += 1;
        }

        let page = extractor.harvest(&rows, &label.to_string()).await;
        summary.weeks_attempted += 1;
        summary.rows_seen += rows.len();
        summary.rows_skipped += page.skipped;
        if rows.is_empty() {
            summary.weeks_empty += 1;
        }
        session.extend(page.records);

        // No header-only files: nothing is written until a record exists.
        if store.is_due(i + 1) && !session.collected.is_empty() {
            store.flush(&session.collected)?;
            summary.flushes += 1;
        }

        if i + 1 == config.total_weeks {
            break;
        }

        debug!("Scrape complete for this week, sleeping briefly.");
        config.cooldown_delay.pause().await;

        if let Err(e) = navigator.advance(session).await {
            error!("{}. Stopping scrape.", e);
            summary.outcome = RunOutcome::Terminated(e.to_string());
            break;
        }
    }

    summary.records = session.collected.len();
    if let FinalizeOutcome::Written(_) = store.finalize(&session.collected)? {
        summary.flushes += 1;
    }

    log_summary(&summary);
    Ok(summary)
}

/// [`run_harvest`], then close the browser whatever the result.
pub async fn run_and_close<D: PageDriver>(
    driver: &D,
    config: &HarvestConfig,
    session: &mut ScrapeSession,
) -> Result<RunSummary, CheckpointError> {
    let result = run_harvest(driver, config, session).await;
    if let Err(e) = driver.close().await {
        warn!("Failed to close browser cleanly: {}", e);
    }
    result
}

fn log_summary(summary: &RunSummary) {
    info!("=== Harvest Summary ===");
    info!("Outcome: {}", summary.outcome);
    info!("Weeks attempted: {}", summary.weeks_attempted);
    info!("Weeks with no rows: {}", summary.weeks_empty);
    info!("Rows seen: {}", summary.rows_seen);
    info!("Rows skipped: {}", summary.rows_skipped);
    info!("Records collected: {}", summary.records);
    info!("Fallback week labels: {}", summary.fallback_labels);
    info!("Flushes: {}", summary.flushes);
}
