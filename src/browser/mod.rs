//! Browser capability consumed by the navigator and extractor.
//!
//! The harvesting core only ever talks to a [`PageDriver`]; the WebDriver
//! backend lives in [`webdriver`] and tests plug in an in-memory fake.

pub mod webdriver;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use webdriver::WebDriverSession;

/// Errors surfaced by a browser driver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Timed out after {0:?} waiting for element")]
    Timeout(Duration),

    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Browser command failed: {0}")]
    Command(String),

    #[error("Browser session error: {0}")]
    Session(String),
}

/// How to find an element on the loaded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator<'a> {
    Css(&'a str),
    XPath(&'a str),
    Id(&'a str),
}

impl std::fmt::Display for Locator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
            Locator::Id(s) => write!(f, "id={}", s),
        }
    }
}

/// Navigate / wait-for / find-all / read-text / read-attribute.
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    /// Poll until an element matching `locator` is present, up to `timeout`.
    async fn wait_for(
        &self,
        locator: Locator<'_>,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError>;

    async fn find_all(&self, locator: Locator<'_>) -> Result<Vec<Self::Element>, DriverError>;

    async fn find_children(
        &self,
        element: &Self::Element,
        locator: Locator<'_>,
    ) -> Result<Vec<Self::Element>, DriverError>;

    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// End the browser session. Called once, at the end of the run.
    async fn close(&self) -> Result<(), DriverError>;
}
