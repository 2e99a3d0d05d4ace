// Re-export modules
pub mod browser;
pub mod classify;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod observer;
pub mod output;
pub mod parsers;
pub mod processor;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::HarvestConfig;
pub use error::HarvestError;
pub use observer::{HarvestObserver, LogObserver};
pub use results::{CrawlResult, CrawlSummary, FaqItem, ProcessedItem, SummaryStats};

use crawlers::FaqCrawler;
use processor::DataProcessor;
use std::future::Future;
use std::sync::Arc;

/// Outcome of a completed crawl
#[derive(Debug, Clone)]
pub struct HarvestRun {
    /// Raw capture, in crawl order
    pub items: CrawlResult,
    pub summary: CrawlSummary,
}

/// Main builder for a harvest run
pub struct Harvest {
    config: HarvestConfig,
    observer: Arc<dyn HarvestObserver>,
}

impl Harvest {
    /// Create a builder for the given listing URL
    ///
    /// Settings start from their defaults, with `WEBDRIVER_URL` applied.
    pub fn new(target_url: &str) -> Self {
        let mut config = HarvestConfig::new(target_url);
        config.apply_env();
        Self::from_config(config)
    }

    /// Create a builder from a complete configuration, used as is
    pub fn from_config(config: HarvestConfig) -> Self {
        Self {
            config,
            observer: Arc::new(LogObserver),
        }
    }

    /// Load configuration from a file, keeping the target URL
    pub fn with_config_file(
        self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = HarvestConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string, keeping the target URL
    pub fn with_config_str(self, config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = HarvestConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    fn with_config(mut self, mut config: HarvestConfig) -> Self {
        config.target_url = std::mem::take(&mut self.config.target_url);
        self.config = config;
        self
    }

    pub fn with_webdriver_url(mut self, url: &str) -> Self {
        self.config.webdriver_url = url.to_string();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.browser.headless = headless;
        self
    }

    /// Set the delay between categories and after category clicks
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.crawling.delay_between_requests_ms = delay_ms;
        self
    }

    /// Send crawl and reconciliation events somewhere other than the log
    pub fn with_observer(mut self, observer: Arc<dyn HarvestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Connect to WebDriver and crawl every category and page
    ///
    /// When `shutdown` resolves first, the session is closed and
    /// [`HarvestError::Interrupted`] carries whatever was captured.
    pub async fn run<S>(&self, shutdown: S) -> Result<HarvestRun, HarvestError>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let session = tokio::select! {
            session = browser::webdriver::connect(&self.config) => {
                session.map_err(|e| HarvestError::Connect(e.to_string()))?
            }
            _ = &mut shutdown => return Err(HarvestError::Interrupted { partial: Vec::new() }),
        };

        let mut crawler = FaqCrawler::new(Arc::new(self.config.clone()), Arc::clone(&self.observer));
        let items = crawler.run(session, shutdown).await?;
        Ok(HarvestRun {
            items,
            summary: crawler.summary(),
        })
    }

    /// Reconcile a raw capture with the configured category rules
    pub fn process(&self, raw: &[FaqItem]) -> Result<(Vec<ProcessedItem>, SummaryStats), HarvestError> {
        let mut processor = DataProcessor::new(&self.config, Arc::clone(&self.observer))?;
        let items = processor.process(raw);
        Ok((items, processor.summary_stats()))
    }
}
