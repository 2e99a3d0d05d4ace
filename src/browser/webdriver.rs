use crate::browser::{Driver, PageNode};
use crate::config::HarvestConfig;
use crate::error::DriverError;
use crate::parsers::html;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::wd::{Capabilities, TimeoutConfiguration};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;

/// Well-known WebDriver endpoints tried after the configured one
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Poll interval while waiting for `document.readyState`
const READY_POLL: Duration = Duration::from_millis(100);

/// A WebDriver session driven through fantoccini
pub struct WebDriverSession {
    client: Client,
}

/// An element of a [`WebDriverSession`]
#[derive(Clone)]
pub struct WebDriverNode {
    element: Element,
}

impl From<fantoccini::error::CmdError> for DriverError {
    fn from(error: fantoccini::error::CmdError) -> Self {
        DriverError::Command(error.to_string())
    }
}

/// Chrome capabilities for the configured browser mode
fn capabilities(config: &HarvestConfig) -> Capabilities {
    let mut args = vec![
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
    ];
    if config.browser.headless {
        args.push("--headless=new".to_string());
    }
    if let Some(user_agent) = &config.browser.user_agent {
        args.push(format!("--user-agent={}", user_agent));
    }

    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// Connects to the WebDriver instance
///
/// Tries the configured URL first, then the common local endpoints. Each
/// round is repeated up to `max_retries` times with `retry_delay_ms` between
/// rounds; crawl-level failures are never retried.
pub async fn connect(config: &HarvestConfig) -> Result<WebDriverSession, DriverError> {
    let mut endpoints = vec![config.webdriver_url.as_str()];
    for url in FALLBACK_WEBDRIVER_URLS {
        if !endpoints.contains(&url) {
            endpoints.push(url);
        }
    }

    let attempts = config.crawling.max_retries.max(1);
    let mut last_error = String::from("no endpoint tried");

    for attempt in 1..=attempts {
        for url in &endpoints {
            let mut builder = ClientBuilder::native();
            builder.capabilities(capabilities(config));
            match builder.connect(url).await {
                Ok(client) => {
                    ::log::debug!("Connected to WebDriver at {} (attempt {})", url, attempt);
                    let session = WebDriverSession { client };
                    if let Err(e) = session.apply_timeouts(config.browser.timeout()).await {
                        if let Err(close_err) = session.close().await {
                            ::log::warn!("Failed to close WebDriver session: {}", close_err);
                        }
                        return Err(e);
                    }
                    return Ok(session);
                }
                Err(e) => {
                    ::log::debug!("WebDriver at {} unavailable: {}", url, e);
                    last_error = format!("{}: {}", url, e);
                }
            }
        }

        if attempt < attempts {
            ::log::warn!(
                "Could not reach any WebDriver server (attempt {}/{}), retrying",
                attempt,
                attempts
            );
            tokio::time::sleep(config.crawling.retry_delay()).await;
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(DriverError::Session(last_error))
}

impl WebDriverSession {
    async fn apply_timeouts(&self, timeout: Duration) -> Result<(), DriverError> {
        let timeouts = TimeoutConfiguration::new(Some(timeout), Some(timeout), None);
        self.client.update_timeouts(timeouts).await?;
        Ok(())
    }
}

#[async_trait]
impl Driver for WebDriverSession {
    type Node = WebDriverNode;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn wait_for_load(&self, timeout: Duration) -> Result<(), DriverError> {
        let ready = async {
            loop {
                let state = self
                    .client
                    .execute("return document.readyState", vec![])
                    .await?;
                if state.as_str() == Some("complete") {
                    return Ok::<(), DriverError>(());
                }
                tokio::time::sleep(READY_POLL).await;
            }
        };

        match tokio::time::timeout(timeout, ready).await {
            Ok(result) => result,
            Err(_) => Err(DriverError::Timeout {
                timeout,
                what: "document.readyState".to_string(),
            }),
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<WebDriverNode>, DriverError> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(elements
            .into_iter()
            .map(|element| WebDriverNode { element })
            .collect())
    }

    async fn close(self) -> Result<(), DriverError> {
        self.client.close().await?;
        Ok(())
    }
}

#[async_trait]
impl PageNode for WebDriverNode {
    async fn text(&self) -> Result<String, DriverError> {
        // innerHTML rather than the rendered text, so collapsed panels still read
        let inner = self.element.html(true).await?;
        Ok(html::text_content(&inner))
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, DriverError> {
        Ok(self.element.attr(name).await?)
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.element.click().await?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<WebDriverNode>, DriverError> {
        let elements = self.element.find_all(Locator::Css(selector)).await?;
        Ok(elements
            .into_iter()
            .map(|element| WebDriverNode { element })
            .collect())
    }
}
