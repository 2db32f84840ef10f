mod support;

use chart_harvester::checkpoint::read_records;
use chart_harvester::runner::{run_and_close, run_harvest};
use chart_harvester::{RunOutcome, ScrapeSession};
use support::{chart_row, fast_config, short_row, week_url, FakeDriver, FakePage};

#[tokio::test]
async fn single_week_with_one_malformed_row() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("charts.csv");
    let url = week_url("2016-12-29");
    let driver = FakeDriver::new(&url).with_page(
        &url,
        FakePage::with_rows(vec![
            chart_row("Starboy\nThe Weeknd", "25,734,078"),
            short_row(4),
            chart_row("Closer\nThe Chainsmokers", "23,519,705"),
        ])
        .dated("12/29/2016"),
    );
    let mut session = ScrapeSession::new();

    let summary = run_harvest(&driver, &fast_config(1, &output), &mut session)
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.rows_seen, 3);
    assert_eq!(summary.rows_skipped, 1);
    assert_eq!(session.collected.len(), 2);
    assert!(session
        .collected
        .iter()
        .all(|r| r.week_label == "2016-12-29"));
    // The final week never navigates onward.
    assert!(driver.navigations().is_empty());
    assert_eq!(read_records(&output).unwrap(), session.collected);
}

#[tokio::test]
async fn weeks_advance_and_checkpoint_periodically() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("charts.csv");
    let dates = ["2016-12-29", "2017-01-05", "2017-01-12", "2017-01-19", "2017-01-26"];
    let mut driver = FakeDriver::new(&week_url(dates[0]));
    for (i, d) in dates.iter().enumerate() {
        let page = if i == 2 {
            // Rows never render this week.
            FakePage::default()
        } else {
            FakePage::with_rows(vec![
                chart_row(&format!("Hit {}\nBand", i), "1,000"),
                chart_row(&format!("B-side {}\nBand", i), "500"),
            ])
        };
        driver = driver.with_page(&week_url(d), page);
    }
    let mut config = fast_config(dates.len(), &output);
    config.checkpoint_every = 2;
    let mut session = ScrapeSession::new();

    let summary = run_harvest(&driver, &config, &mut session).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.weeks_attempted, 5);
    assert_eq!(summary.weeks_empty, 1);
    assert_eq!(summary.records, 8);
    // After weeks 2 and 4, then the final save.
    assert_eq!(summary.flushes, 3);
    assert_eq!(summary.fallback_labels, 0);
    assert_eq!(session.iteration_index, 4);
    assert_eq!(
        driver.navigations(),
        dates[1..].iter().map(|d| week_url(d)).collect::<Vec<_>>()
    );

    let labels: Vec<_> = session
        .collected
        .iter()
        .map(|r| r.week_label.as_str())
        .collect();
    assert_eq!(
        labels,
        [
            "2016-12-29",
            "2016-12-29",
            "2017-01-05",
            "2017-01-05",
            "2017-01-19",
            "2017-01-19",
            "2017-01-26",
            "2017-01-26"
        ]
    );
    assert_eq!(read_records(&output).unwrap().len(), 8);
}

#[tokio::test]
async fn missing_url_date_stops_run_and_saves_once() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("charts.csv");
    let url = "https://charts.example.test/charts/view/regional-global-weekly/latest";
    let driver = FakeDriver::new(url).with_page(
        url,
        FakePage::with_rows(vec![chart_row("Only\nOne", "7")]),
    );
    let mut session = ScrapeSession::new();

    let summary = run_harvest(&driver, &fast_config(418, &output), &mut session)
        .await
        .unwrap();

    assert!(matches!(summary.outcome, RunOutcome::Terminated(_)));
    assert_eq!(summary.weeks_attempted, 1);
    assert_eq!(summary.flushes, 1);
    assert_eq!(summary.fallback_labels, 1);
    assert_eq!(session.collected[0].week_label, "week_index_0");
    assert_eq!(read_records(&output).unwrap(), session.collected);
}

#[tokio::test]
async fn navigation_failure_keeps_partial_progress() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("charts.csv");
    let url = week_url("2016-12-29");
    let driver = FakeDriver::new(&url)
        .with_page(&url, FakePage::with_rows(vec![chart_row("A\nB", "1")]))
        .failing_navigation();
    let mut session = ScrapeSession::new();

    let summary = run_and_close(&driver, &fast_config(10, &output), &mut session)
        .await
        .unwrap();

    assert!(matches!(summary.outcome, RunOutcome::Terminated(_)));
    assert_eq!(read_records(&output).unwrap().len(), 1);
    assert_eq!(driver.closes(), 1);
}

#[tokio::test]
async fn empty_run_writes_nothing_and_still_closes() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("charts.csv");
    let driver = FakeDriver::new(&week_url("2016-12-29"));
    let mut session = ScrapeSession::new();

    let summary = run_and_close(&driver, &fast_config(3, &output), &mut session)
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.weeks_empty, 3);
    assert_eq!(summary.flushes, 0);
    assert!(!output.exists());
    assert_eq!(driver.closes(), 1);
}

#[tokio::test]
async fn empty_weeks_never_leave_a_checkpoint_behind() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("charts.csv");
    let driver = FakeDriver::new(&week_url("2016-12-29"));
    let mut config = fast_config(12, &output);
    config.checkpoint_every = 5;
    let mut session = ScrapeSession::new();

    let summary = run_harvest(&driver, &config, &mut session).await.unwrap();

    assert_eq!(summary.weeks_attempted, 12);
    assert_eq!(summary.weeks_empty, 12);
    assert_eq!(summary.records, 0);
    assert_eq!(summary.flushes, 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn checkpointing_starts_once_records_arrive() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("charts.csv");
    let dates = ["2016-12-29", "2017-01-05", "2017-01-12", "2017-01-19"];
    // Only the last week renders rows.
    let driver = FakeDriver::new(&week_url(dates[0])).with_page(
        &week_url(dates[3]),
        FakePage::with_rows(vec![chart_row("Late\nBloomer", "9")]),
    );
    let mut config = fast_config(dates.len(), &output);
    config.checkpoint_every = 2;
    let mut session = ScrapeSession::new();

    let summary = run_harvest(&driver, &config, &mut session).await.unwrap();

    // Week 2 had nothing to save; week 4 and the final save both write.
    assert_eq!(summary.flushes, 2);
    assert_eq!(read_records(&output).unwrap().len(), 1);
}
