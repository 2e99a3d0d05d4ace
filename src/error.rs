use crate::results::FaqItem;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single browser command.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("browser command failed: {0}")]
    Command(String),

    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { timeout: Duration, what: String },

    #[error("could not start a WebDriver session: {0}")]
    Session(String),
}

/// Failure to load the target page. Fatal for a run.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("loading {url} did not complete within {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("category index {ordinal} out of range ({count} controls)")]
    IndexOutOfRange { ordinal: usize, count: usize },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("page {requested} out of range (total {total})")]
    OutOfRange { requested: u32, total: u32 },

    #[error("page {requested} cannot be reached from page {current}")]
    NotReachable { requested: u32, current: u32 },

    #[error("page {requested} not reached after {steps} next-clicks")]
    StepLimitExceeded { requested: u32, steps: u32 },

    #[error("next control did not advance past page {page}")]
    Stalled { page: u32 },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Per-item failure; the orchestrator skips the item.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("item has no question text")]
    MissingQuestion,

    #[error("item has no answer text")]
    MissingAnswer,

    #[error("answer panel did not attach within {0:?}")]
    ExpandTimeout(Duration),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Failure at a category or page boundary.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Activation(#[from] ActivationError),

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Run-level errors surfaced to the caller.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to connect to WebDriver: {0}")]
    Connect(String),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("crawl interrupted after capturing {} items", partial.len())]
    Interrupted { partial: Vec<FaqItem> },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
