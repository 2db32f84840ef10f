//! WebDriver-backed [`PageDriver`] built on fantoccini.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, info};

use super::{DriverError, Locator, PageDriver};

/// One exclusively-owned browser session.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Connect to a running WebDriver endpoint (chromedriver, geckodriver, ...).
    pub async fn connect(webdriver_url: &str) -> Result<Self, DriverError> {
        let client = ClientBuilder::native()
            .connect(webdriver_url)
            .await
            .map_err(|e| DriverError::Session(e.to_string()))?;

        if let Err(e) = client.maximize_window().await {
            debug!("Could not maximize browser window: {}", e);
        }

        info!("Browser opened via {}", webdriver_url);
        Ok(Self { client })
    }
}

fn to_fantoccini(locator: Locator<'_>) -> fantoccini::Locator<'_> {
    match locator {
        Locator::Css(s) => fantoccini::Locator::Css(s),
        Locator::XPath(s) => fantoccini::Locator::XPath(s),
        Locator::Id(s) => fantoccini::Locator::Id(s),
    }
}

fn map_cmd_error(
    err: CmdError,
    locator: Option<Locator<'_>>,
    timeout: Option<Duration>,
) -> DriverError {
    match (&err, timeout) {
        (CmdError::WaitTimeout, Some(t)) => DriverError::Timeout(t),
        _ if err.is_no_such_element() => DriverError::NoSuchElement(
            locator.map(|l| l.to_string()).unwrap_or_else(|| err.to_string()),
        ),
        _ => DriverError::Command(err.to_string()),
    }
}

#[async_trait]
impl PageDriver for WebDriverSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        debug!("Navigating to {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| map_cmd_error(e, None, None))
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| map_cmd_error(e, None, None))
    }

    async fn wait_for(
        &self,
        locator: Locator<'_>,
        timeout: Duration,
    ) -> Result<Element, DriverError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(to_fantoccini(locator))
            .await
            .map_err(|e| map_cmd_error(e, Some(locator), Some(timeout)))
    }

    async fn find_all(&self, locator: Locator<'_>) -> Result<Vec<Element>, DriverError> {
        self.client
            .find_all(to_fantoccini(locator))
            .await
            .map_err(|e| map_cmd_error(e, Some(locator), None))
    }

    async fn find_children(
        &self,
        element: &Element,
        locator: Locator<'_>,
    ) -> Result<Vec<Element>, DriverError> {
        element
            .find_all(to_fantoccini(locator))
            .await
            .map_err(|e| map_cmd_error(e, Some(locator), None))
    }

    async fn text(&self, element: &Element) -> Result<String, DriverError> {
        element.text().await.map_err(|e| map_cmd_error(e, None, None))
    }

    async fn attribute(
        &self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        // Form inputs keep their live value in the DOM property, not the attribute.
        let prop = element
            .prop(name)
            .await
            .map_err(|e| map_cmd_error(e, None, None))?;
        if prop.is_some() {
            return Ok(prop);
        }
        element
            .attr(name)
            .await
            .map_err(|e| map_cmd_error(e, None, None))
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| DriverError::Session(e.to_string()))?;
        info!("Browser closed");
        Ok(())
    }
}
