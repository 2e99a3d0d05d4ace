use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A category control discovered on the listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Deterministic id, `category_<ordinal+1>`
    pub id: String,

    /// Trimmed label of the control
    pub name: String,

    /// Zero-based position among all category controls at discovery time
    pub ordinal: usize,
}

impl Category {
    /// Create a category whose id is derived from its ordinal
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            id: crate::utils::category_id(ordinal),
            name: name.into(),
            ordinal,
        }
    }
}

/// An outbound link found inside an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub text: String,
    pub url: String,
}

impl LinkRef {
    /// Builds a link only when both text and href are non-empty
    pub fn from_parts(text: &str, href: Option<&str>) -> Option<Self> {
        let text = text.trim();
        let url = href.unwrap_or_default();
        if text.is_empty() || url.trim().is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            url: url.to_string(),
        })
    }
}

/// One captured question/answer pair.
///
/// Everything except `question` and `answer` is optional on input so a raw
/// capture written by an older run, or edited by hand, still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub category_id: String,

    pub question: String,

    pub answer: String,

    #[serde(default)]
    pub links: Vec<LinkRef>,

    #[serde(default)]
    pub question_id: String,

    #[serde(default)]
    pub page_number: u32,

    #[serde(default)]
    pub created_at: String,
}

/// Pagination controls as currently rendered. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub has_pagination: bool,
    pub total_pages: u32,
    pub current_page: u32,
}

impl PaginationState {
    /// State of a category that fits on a single page
    pub fn single_page() -> Self {
        Self {
            has_pagination: false,
            total_pages: 1,
            current_page: 1,
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::single_page()
    }
}

/// Raw output of one crawl, preserved unmodified as an audit artifact
pub type CrawlResult = Vec<FaqItem>;

/// Item after reconciliation, with the flattened link rendering used by CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedItem {
    pub category: String,
    pub category_id: String,
    pub question: String,
    pub answer: String,
    pub links: Vec<LinkRef>,
    pub links_text: String,
    pub question_id: String,
    pub page_number: u32,
    pub created_at: String,
}

/// Summary of a crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub total_categories: usize,
    pub total_faqs: usize,
    pub categories: Vec<String>,
    pub crawled_at: String,
}

/// Aggregate statistics over the validated dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_items: usize,
    pub total_categories: usize,
    pub avg_question_length: f64,
    pub avg_answer_length: f64,
    pub items_with_links: usize,
    pub category_distribution: BTreeMap<String, usize>,
}
