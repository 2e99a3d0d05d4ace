//! Browser-driven crawl of a paginated, categorized FAQ listing.

pub mod extractor;
pub mod navigator;
pub mod orchestrator;

#[cfg(test)]
mod tests;

pub use extractor::{Extractor, ItemFragment};
pub use navigator::Navigator;
pub use orchestrator::{CrawlState, FaqCrawler};
