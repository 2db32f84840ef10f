//! Week identity: reading it from the loaded page and advancing it.
//!
//! The next week is always derived from the URL the browser is actually on,
//! never from a loop counter.

use chrono::{Duration as ChronoDuration, NaiveDate};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::browser::{DriverError, Locator, PageDriver};
use crate::config::DelayRange;
use crate::session::ScrapeSession;

/// Element holding the chart's week-ending date.
pub const WEEK_END_DATE_ID: &str = "weekly_end_date";

const URL_DATE_FORMAT: &str = "%Y-%m-%d";
const WEEK_STEP_DAYS: i64 = 7;

fn trailing_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/(\d{4}-\d{2}-\d{2})$").expect("valid trailing date regex"))
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Could not find date in URL: {url}")]
    NoDateInUrl { url: String },

    #[error("URL date token is not a calendar date: {token}")]
    InvalidDate { token: String },

    #[error("Failed to navigate to next week: {0}")]
    Driver(#[from] DriverError),
}

/// Label attached to every record harvested in one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekLabel {
    /// Read from the page's date indicator. Recognised date formats are
    /// normalised to ISO; anything else is kept as presented.
    Page(String),
    /// Read from the trailing date of the current URL.
    Url(NaiveDate),
    /// Nothing readable; synthetic label from the iteration index.
    Fallback(usize),
}

impl WeekLabel {
    pub fn is_fallback(&self) -> bool {
        matches!(self, WeekLabel::Fallback(_))
    }
}

impl fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekLabel::Page(s) => write!(f, "{}", s),
            WeekLabel::Url(d) => write!(f, "{}", d.format(URL_DATE_FORMAT)),
            WeekLabel::Fallback(i) => write!(f, "{}{}", FALLBACK_PREFIX, i),
        }
    }
}

pub const FALLBACK_PREFIX: &str = "week_index_";

/// Indicator formats seen on chart pages, tried in order.
const INDICATOR_DATE_FORMATS: [&str; 3] = [URL_DATE_FORMAT, "%m/%d/%Y", "%b %d, %Y"];

/// `12/29/2016` → `2016-12-29`, so page and URL labels share one format.
/// Unrecognised values are returned trimmed but otherwise untouched.
pub fn canonical_week_date(value: &str) -> String {
    let value = value.trim();
    INDICATOR_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|d| d.format(URL_DATE_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Trailing `/YYYY-MM-DD` of a URL, if present and a real date.
pub fn parse_url_date(url: &str) -> Result<NaiveDate, NavigationError> {
    let caps = trailing_date_re()
        .captures(url)
        .ok_or_else(|| NavigationError::NoDateInUrl {
            url: url.to_string(),
        })?;
    let token = &caps[1];
    NaiveDate::parse_from_str(token, URL_DATE_FORMAT).map_err(|_| NavigationError::InvalidDate {
        token: token.to_string(),
    })
}

/// Pure part of `advance`: the next week's date and URL.
pub fn next_week_url(url: &str) -> Result<(NaiveDate, String), NavigationError> {
    let current = parse_url_date(url)?;
    let next = current + ChronoDuration::days(WEEK_STEP_DAYS);
    let replacement = format!("/{}", next.format(URL_DATE_FORMAT));
    let next_url = trailing_date_re()
        .replace(url, regex::NoExpand(&replacement))
        .into_owned();
    Ok((next, next_url))
}

pub struct Navigator<'d, D: PageDriver> {
    driver: &'d D,
    date_timeout: Duration,
    settle_delay: DelayRange,
}

impl<'d, D: PageDriver> Navigator<'d, D> {
    pub fn new(driver: &'d D, date_timeout: Duration, settle_delay: DelayRange) -> Self {
        Self {
            driver,
            date_timeout,
            settle_delay,
        }
    }

    /// Load the first week of the run.
    pub async fn open(
        &self,
        session: &mut ScrapeSession,
        url: &str,
    ) -> Result<(), NavigationError> {
        self.driver.navigate(url).await?;
        session.current_page_date = parse_url_date(url).ok();
        info!("Navigated to start URL: {}", url);
        Ok(())
    }

    /// Identity of the loaded week.
    ///
    /// Tries the date indicator first, then the URL's trailing date. Never
    /// fails: with neither readable the label falls back to the iteration
    /// index.
    pub async fn current_identity(&self, iteration: usize) -> WeekLabel {
        match self.read_date_indicator().await {
            Ok(value) => return WeekLabel::Page(canonical_week_date(&value)),
            Err(e) => debug!("Date indicator unreadable: {}", e),
        }

        match self.driver.current_url().await.map(|u| parse_url_date(&u)) {
            Ok(Ok(date)) => {
                debug!("Using URL date {} as week label", date);
                return WeekLabel::Url(date);
            }
            Ok(Err(e)) => debug!("URL has no usable date: {}", e),
            Err(e) => debug!("Could not read current URL: {}", e),
        }

        warn!(
            "Week date unavailable, using fallback label {}{}",
            FALLBACK_PREFIX, iteration
        );
        WeekLabel::Fallback(iteration)
    }

    async fn read_date_indicator(&self) -> Result<String, DriverError> {
        let element = self
            .driver
            .wait_for(Locator::Id(WEEK_END_DATE_ID), self.date_timeout)
            .await?;
        let value = self
            .driver
            .attribute(&element, "value")
            .await?
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        if value.is_empty() {
            return Err(DriverError::NoSuchElement(format!(
                "{} has no value",
                WEEK_END_DATE_ID
            )));
        }
        Ok(value)
    }

    /// Move the browser one week forward, based on the URL it is on now.
    ///
    /// Any error here is fatal to the run.
    pub async fn advance(
        &self,
        session: &mut ScrapeSession,
    ) -> Result<NaiveDate, NavigationError> {
        let current_url = self.driver.current_url().await?;
        let (next_date, next_url) = next_week_url(&current_url)?;

        info!("Navigating to next week: {}", next_date);
        self.driver.navigate(&next_url).await?;
        session.current_page_date = Some(next_date);

        self.settle_delay.pause().await;
        Ok(next_date)
    }
}
