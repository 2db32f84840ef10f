//! In-memory browser used by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chart_harvester::browser::{DriverError, Locator, PageDriver};
use chart_harvester::extractor::{CELL_SELECTOR, ROW_XPATH};
use chart_harvester::navigator::WEEK_END_DATE_ID;
use chart_harvester::{DelayRange, HarvestConfig};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub const CHART_BASE: &str = "https://charts.example.test/charts/view/regional-global-weekly";

pub fn week_url(date: &str) -> String {
    format!("{}/{}", CHART_BASE, date)
}

/// Cells of a well-formed chart row: rank, change, track, peak, prev, weeks, streams.
pub fn chart_row(track: &str, streams: &str) -> Vec<String> {
    vec![
        "1".to_string(),
        "=".to_string(),
        track.to_string(),
        "1".to_string(),
        "1".to_string(),
        "3".to_string(),
        streams.to_string(),
    ]
}

pub fn short_row(cells: usize) -> Vec<String> {
    (0..cells).map(|i| format!("cell {}", i)).collect()
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub date_value: Option<String>,
    pub rows: Vec<Vec<String>>,
}

impl FakePage {
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            date_value: None,
            rows,
        }
    }

    pub fn dated(mut self, value: &str) -> Self {
        self.date_value = Some(value.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeElement {
    Row(usize),
    Cell(usize, usize),
    DateInput,
}

#[derive(Default)]
struct State {
    pages: HashMap<String, FakePage>,
    current_url: String,
    navigations: Vec<String>,
    closes: usize,
    fail_navigation: bool,
}

impl State {
    fn page(&self) -> FakePage {
        self.pages.get(&self.current_url).cloned().unwrap_or_default()
    }
}

#[derive(Default)]
pub struct FakeDriver {
    state: Mutex<State>,
}

impl FakeDriver {
    pub fn new(start_url: &str) -> Self {
        let driver = Self::default();
        driver.state.lock().unwrap().current_url = start_url.to_string();
        driver
    }

    pub fn with_page(self, url: &str, page: FakePage) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), page);
        self
    }

    pub fn failing_navigation(self) -> Self {
        self.state.lock().unwrap().fail_navigation = true;
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn url(&self) -> String {
        self.state.lock().unwrap().current_url.clone()
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_navigation {
            return Err(DriverError::Command("net::ERR_CONNECTION_RESET".to_string()));
        }
        state.navigations.push(url.to_string());
        state.current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.url())
    }

    async fn wait_for(
        &self,
        locator: Locator<'_>,
        timeout: Duration,
    ) -> Result<FakeElement, DriverError> {
        let page = self.state.lock().unwrap().page();
        match locator {
            Locator::XPath(ROW_XPATH) if !page.rows.is_empty() => Ok(FakeElement::Row(0)),
            Locator::Id(WEEK_END_DATE_ID) if page.date_value.is_some() => {
                Ok(FakeElement::DateInput)
            }
            _ => Err(DriverError::Timeout(timeout)),
        }
    }

    async fn find_all(&self, locator: Locator<'_>) -> Result<Vec<FakeElement>, DriverError> {
        let page = self.state.lock().unwrap().page();
        match locator {
            Locator::XPath(ROW_XPATH) => Ok((0..page.rows.len()).map(FakeElement::Row).collect()),
            other => Err(DriverError::NoSuchElement(other.to_string())),
        }
    }

    async fn find_children(
        &self,
        element: &FakeElement,
        locator: Locator<'_>,
    ) -> Result<Vec<FakeElement>, DriverError> {
        let page = self.state.lock().unwrap().page();
        match (element, locator) {
            (FakeElement::Row(r), Locator::Css(CELL_SELECTOR)) => {
                let cells = page
                    .rows
                    .get(*r)
                    .ok_or_else(|| DriverError::Command("stale element reference".to_string()))?;
                Ok((0..cells.len()).map(|c| FakeElement::Cell(*r, c)).collect())
            }
            _ => Err(DriverError::NoSuchElement(locator.to_string())),
        }
    }

    async fn text(&self, element: &FakeElement) -> Result<String, DriverError> {
        let page = self.state.lock().unwrap().page();
        match element {
            FakeElement::Cell(r, c) => page
                .rows
                .get(*r)
                .and_then(|row| row.get(*c))
                .cloned()
                .ok_or_else(|| DriverError::Command("stale element reference".to_string())),
            _ => Ok(String::new()),
        }
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let page = self.state.lock().unwrap().page();
        match (element, name) {
            (FakeElement::DateInput, "value") => Ok(page.date_value),
            _ => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Config with no pauses, writing into `output`.
pub fn fast_config(total_weeks: usize, output: &Path) -> HarvestConfig {
    HarvestConfig {
        start_url: week_url("2016-12-29"),
        total_weeks,
        checkpoint_every: 10,
        row_timeout: Duration::from_millis(10),
        date_timeout: Duration::from_millis(10),
        settle_delay: DelayRange::none(),
        cooldown_delay: DelayRange::none(),
        expected_rows: 200,
        output_path: output.to_path_buf(),
    }
}
