//! Event sink shared by the navigator, extractor, orchestrator and processor.
//!
//! Components never log on their own; they report here. Every method has an
//! empty default so an observer only implements what it cares about.

use crate::error::{CrawlError, DriverError, ExtractionError};
use crate::results::{Category, CrawlSummary, FaqItem, PaginationState};
use std::fmt;

/// Why reconciliation rejected an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    QuestionTooShort,
    AnswerTooShort,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::QuestionTooShort => write!(f, "question too short"),
            RejectReason::AnswerTooShort => write!(f, "answer too short"),
        }
    }
}

pub trait HarvestObserver: Send + Sync {
    fn page_opened(&self, _url: &str) {}

    fn categories_discovered(&self, _categories: &[Category]) {}

    /// The category controls could not be read; the crawl ends empty
    fn categories_unavailable(&self, _error: &DriverError) {}

    fn category_started(&self, _category: &Category, _position: usize, _total: usize) {}

    fn category_finished(&self, _category: &Category, _captured: usize, _pages: u32) {}

    fn category_failed(&self, _category: &Category, _error: &CrawlError) {}

    fn pagination_detected(&self, _category: &Category, _state: &PaginationState) {}

    /// Reading the pagination controls failed; the category is treated as single-page
    fn pagination_probe_failed(&self, _error: &DriverError) {}

    fn page_started(&self, _category: &Category, _page: u32, _total: u32) {}

    fn page_finished(&self, _category: &Category, _page: u32, _captured: usize) {}

    fn page_failed(&self, _category: &Category, _page: u32, _error: &CrawlError) {}

    fn item_captured(&self, _item: &FaqItem) {}

    fn item_skipped(&self, _category: &Category, _page: u32, _index: usize, _error: &ExtractionError) {}

    fn crawl_finished(&self, _summary: &CrawlSummary) {}

    fn session_close_failed(&self, _error: &DriverError) {}

    fn duplicates_removed(&self, _before: usize, _after: usize) {}

    fn item_rejected(&self, _reason: RejectReason, _text: &str) {}

    fn validation_finished(&self, _before: usize, _after: usize) {}
}

/// Observer that forwards every event to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl HarvestObserver for LogObserver {
    fn page_opened(&self, url: &str) {
        ::log::info!("Opened {}", url);
    }

    fn categories_discovered(&self, categories: &[Category]) {
        ::log::info!("Discovered {} categories", categories.len());
        for category in categories {
            ::log::debug!("  [{}] {} ({})", category.ordinal, category.name, category.id);
        }
    }

    fn categories_unavailable(&self, error: &DriverError) {
        ::log::error!("Could not read category controls: {}", error);
    }

    fn category_started(&self, category: &Category, position: usize, total: usize) {
        ::log::info!(
            "Processing category ({}/{}): {}",
            position + 1,
            total,
            category.name
        );
    }

    fn category_finished(&self, category: &Category, captured: usize, pages: u32) {
        ::log::info!(
            "Category '{}' done: {} items over {} pages",
            category.name,
            captured,
            pages
        );
    }

    fn category_failed(&self, category: &Category, error: &CrawlError) {
        ::log::error!("Category '{}' failed: {}", category.name, error);
    }

    fn pagination_detected(&self, category: &Category, state: &PaginationState) {
        ::log::info!(
            "Category '{}': page {} of {}",
            category.name,
            state.current_page,
            state.total_pages
        );
    }

    fn pagination_probe_failed(&self, error: &DriverError) {
        ::log::warn!("Could not read pagination, assuming a single page: {}", error);
    }

    fn page_started(&self, category: &Category, page: u32, total: u32) {
        ::log::debug!("Category '{}': page {}/{}", category.name, page, total);
    }

    fn page_finished(&self, category: &Category, page: u32, captured: usize) {
        ::log::debug!(
            "Category '{}': page {} yielded {} items",
            category.name,
            page,
            captured
        );
    }

    fn page_failed(&self, category: &Category, page: u32, error: &CrawlError) {
        ::log::warn!(
            "Category '{}': page {} skipped: {}",
            category.name,
            page,
            error
        );
    }

    fn item_captured(&self, item: &FaqItem) {
        let preview: String = item.question.chars().take(50).collect();
        ::log::trace!("Captured {} (page {}): {}", item.question_id, item.page_number, preview);
    }

    fn item_skipped(&self, category: &Category, page: u32, index: usize, error: &ExtractionError) {
        ::log::warn!(
            "Item skipped (category: {}, page: {}, index: {}): {}",
            category.name,
            page,
            index,
            error
        );
    }

    fn crawl_finished(&self, summary: &CrawlSummary) {
        ::log::info!(
            "Crawl complete: {} items from {} categories",
            summary.total_faqs,
            summary.total_categories
        );
    }

    fn session_close_failed(&self, error: &DriverError) {
        ::log::warn!("Failed to close browser session: {}", error);
    }

    fn duplicates_removed(&self, before: usize, after: usize) {
        ::log::info!("Deduplicated: {} -> {}", before, after);
    }

    fn item_rejected(&self, reason: RejectReason, text: &str) {
        ::log::warn!("Rejected item ({}): {}", reason, text);
    }

    fn validation_finished(&self, before: usize, after: usize) {
        ::log::info!("Validated: {} -> {}", before, after);
    }
}
