//! Browser session abstraction.
//!
//! `Driver` is one live browser tab; `PageNode` is a handle to an element in
//! it. Handles are only valid until the next navigation or click that
//! re-renders the listing, so callers query them right before use and never
//! keep them across such an operation.

pub mod webdriver;

#[cfg(test)]
pub(crate) mod mock;

use crate::error::DriverError;
use async_trait::async_trait;
use std::time::Duration;

/// A single browser session (one tab)
#[async_trait]
pub trait Driver: Send + Sync {
    type Node: PageNode;

    /// Navigate the tab to `url`
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// Wait until the document reports it has finished loading
    async fn wait_for_load(&self, timeout: Duration) -> Result<(), DriverError>;

    /// All elements matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Node>, DriverError>;

    /// First element matching a CSS selector
    async fn find(&self, selector: &str) -> Result<Option<Self::Node>, DriverError> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    /// End the session
    async fn close(self) -> Result<(), DriverError>
    where
        Self: Sized;
}

/// An element handle inside the current page
#[async_trait]
pub trait PageNode: Send + Sync + Sized {
    /// Full text content, including hidden descendants
    async fn text(&self) -> Result<String, DriverError>;

    async fn attr(&self, name: &str) -> Result<Option<String>, DriverError>;

    async fn click(&self) -> Result<(), DriverError>;

    /// Descendants matching a CSS selector
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, DriverError>;

    async fn find(&self, selector: &str) -> Result<Option<Self>, DriverError> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }
}
