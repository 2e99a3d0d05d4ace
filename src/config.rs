use crate::classify::{self, CategoryRule};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// FAQ listing page to crawl
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Human-readable source name written into artifact metadata
    #[serde(default = "default_source_name")]
    pub source_name: String,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default)]
    pub selectors: SelectorConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub crawling: CrawlingConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Ordered keyword table used to backfill missing categories
    #[serde(default = "classify::default_rules")]
    pub category_rules: Vec<CategoryRule>,

    /// Label for items no rule matches
    #[serde(default = "default_category")]
    pub default_category: String,
}

/// CSS selectors describing the FAQ markup
///
/// Item-scoped selectors (`question`, `answer`, `answer_links`,
/// `expand_button`, `answer_panel`) are evaluated inside one item element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_category_selector")]
    pub category: String,

    #[serde(default = "default_item_selector")]
    pub item: String,

    #[serde(default = "default_question_selector")]
    pub question: String,

    #[serde(default = "default_answer_selector")]
    pub answer: String,

    #[serde(default = "default_answer_links_selector")]
    pub answer_links: String,

    /// Control carrying the expand/collapse state attribute
    #[serde(default = "default_expand_button_selector")]
    pub expand_button: String,

    /// Attribute read on `expand_button`; "false" means collapsed
    #[serde(default = "default_expand_state_attribute")]
    pub expand_state_attribute: String,

    /// Element that must attach after expanding
    #[serde(default = "default_answer_panel_selector")]
    pub answer_panel: String,

    #[serde(default)]
    pub pagination: PaginationSelectors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationSelectors {
    #[serde(default = "default_pagination_container")]
    pub container: String,

    #[serde(default = "default_page_numbers")]
    pub page_numbers: String,

    #[serde(default = "default_next_button")]
    pub next_button: String,

    #[serde(default = "default_current_page")]
    pub current_page: String,
}

/// Browser session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Navigation and page-load timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Pacing and bounded waits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlingConfig {
    /// Delay after a category click and between categories
    #[serde(default = "default_delay_between_requests_ms")]
    pub delay_between_requests_ms: u64,

    /// Delay between pages of one category
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Delay after clicking a page control, before waiting for load
    #[serde(default = "default_page_change_delay_ms")]
    pub page_change_delay_ms: u64,

    /// Delay after the initial load for client-side rendering
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Delay after an answer panel attaches
    #[serde(default = "default_expand_settle_ms")]
    pub expand_settle_ms: u64,

    /// Upper bound for an answer panel to attach after expanding
    #[serde(default = "default_expand_timeout_ms")]
    pub expand_timeout_ms: u64,

    /// WebDriver connection attempts per endpoint
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between connection attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Where artifacts are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_raw_dir")]
    pub raw_dir: String,

    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl HarvestConfig {
    /// Create a configuration with default values for the given target
    pub fn new(target_url: &str) -> Self {
        Self {
            target_url: target_url.to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            source_name: default_source_name(),
            webdriver_url: default_webdriver_url(),
            selectors: SelectorConfig::default(),
            browser: BrowserConfig::default(),
            crawling: CrawlingConfig::default(),
            output: OutputConfig::default(),
            category_rules: classify::default_rules(),
            default_category: default_category(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            category: default_category_selector(),
            item: default_item_selector(),
            question: default_question_selector(),
            answer: default_answer_selector(),
            answer_links: default_answer_links_selector(),
            expand_button: default_expand_button_selector(),
            expand_state_attribute: default_expand_state_attribute(),
            answer_panel: default_answer_panel_selector(),
            pagination: PaginationSelectors::default(),
        }
    }
}

impl Default for PaginationSelectors {
    fn default() -> Self {
        Self {
            container: default_pagination_container(),
            page_numbers: default_page_numbers(),
            next_button: default_next_button(),
            current_page: default_current_page(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            timeout_ms: default_timeout_ms(),
            user_agent: None,
        }
    }
}

impl BrowserConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CrawlingConfig {
    fn default() -> Self {
        Self {
            delay_between_requests_ms: default_delay_between_requests_ms(),
            page_delay_ms: default_page_delay_ms(),
            page_change_delay_ms: default_page_change_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            expand_settle_ms: default_expand_settle_ms(),
            expand_timeout_ms: default_expand_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl CrawlingConfig {
    /// Configuration with every delay set to zero, for simulated sites
    pub fn without_delays() -> Self {
        Self {
            delay_between_requests_ms: 0,
            page_delay_ms: 0,
            page_change_delay_ms: 0,
            settle_delay_ms: 0,
            expand_settle_ms: 0,
            retry_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn delay_between_requests(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn page_change_delay(&self) -> Duration {
        Duration::from_millis(self.page_change_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn expand_settle(&self) -> Duration {
        Duration::from_millis(self.expand_settle_ms)
    }

    pub fn expand_timeout(&self) -> Duration {
        Duration::from_millis(self.expand_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            raw_dir: default_raw_dir(),
            reports_dir: default_reports_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_target_url() -> String {
    "https://www.kia.com/kr/customer-service/center/faq".to_string()
}

fn default_source_name() -> String {
    "기아자동차 FAQ".to_string()
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_category() -> String {
    classify::DEFAULT_CATEGORY.to_string()
}

fn default_category_selector() -> String {
    "span.name".to_string()
}

fn default_item_selector() -> String {
    ".cmp-accordion__item".to_string()
}

fn default_question_selector() -> String {
    "span.cmp-accordion__title".to_string()
}

fn default_answer_selector() -> String {
    "div.cmp-accordion__panel p".to_string()
}

fn default_answer_links_selector() -> String {
    "div.cmp-accordion__panel a".to_string()
}

fn default_expand_button_selector() -> String {
    "button.cmp-accordion__button".to_string()
}

fn default_expand_state_attribute() -> String {
    "aria-expanded".to_string()
}

fn default_answer_panel_selector() -> String {
    "div.cmp-accordion__panel".to_string()
}

fn default_pagination_container() -> String {
    ".cmp-pagination__wrap".to_string()
}

fn default_page_numbers() -> String {
    ".paging-list li a".to_string()
}

fn default_next_button() -> String {
    ".cmp-pagination__next".to_string()
}

fn default_current_page() -> String {
    ".paging-list li.is-active a".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_delay_between_requests_ms() -> u64 {
    1_000
}

fn default_page_delay_ms() -> u64 {
    500
}

fn default_page_change_delay_ms() -> u64 {
    1_000
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

fn default_expand_settle_ms() -> u64 {
    500
}

fn default_expand_timeout_ms() -> u64 {
    5_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

fn default_output_dir() -> String {
    "data/processed".to_string()
}

fn default_raw_dir() -> String {
    "data/raw".to_string()
}

fn default_reports_dir() -> String {
    "data/reports".to_string()
}

fn default_file_prefix() -> String {
    "kia_faq".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = HarvestConfig::from_json("{}").unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.selectors.item, ".cmp-accordion__item");
        assert_eq!(config.selectors.pagination.next_button, ".cmp-pagination__next");
        assert!(config.browser.headless);
        assert_eq!(config.crawling.delay_between_requests(), Duration::from_secs(1));
        assert_eq!(config.category_rules.len(), 8);
        assert_eq!(config.default_category, "기타");
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "target_url": "https://example.com/faq",
            "selectors": { "item": "li.faq", "pagination": { "next_button": "a.next" } },
            "crawling": { "page_delay_ms": 0 },
            "category_rules": [ { "pattern": "(?i)battery", "label": "Battery" } ]
        }"#;
        let config = HarvestConfig::from_json(json).unwrap();
        assert_eq!(config.target_url, "https://example.com/faq");
        assert_eq!(config.selectors.item, "li.faq");
        assert_eq!(config.selectors.question, "span.cmp-accordion__title");
        assert_eq!(config.selectors.pagination.next_button, "a.next");
        assert_eq!(config.selectors.pagination.container, ".cmp-pagination__wrap");
        assert_eq!(config.crawling.page_delay_ms, 0);
        assert_eq!(config.crawling.max_retries, 3);
        assert_eq!(config.category_rules, vec![CategoryRule::new("(?i)battery", "Battery")]);
    }

    #[test]
    fn test_without_delays() {
        let crawling = CrawlingConfig::without_delays();
        assert_eq!(crawling.page_delay(), Duration::ZERO);
        assert_eq!(crawling.settle_delay(), Duration::ZERO);
        assert_eq!(crawling.expand_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.json");
        let config = HarvestConfig::from_file(path).unwrap();
        let defaults = HarvestConfig::default();
        assert_eq!(config.target_url, defaults.target_url);
        assert_eq!(config.selectors.answer_panel, defaults.selectors.answer_panel);
        assert_eq!(config.crawling.expand_timeout_ms, defaults.crawling.expand_timeout_ms);
        assert_eq!(config.output.file_prefix, "kia_faq");
        assert_eq!(config.category_rules, defaults.category_rules);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(HarvestConfig::from_json("{ not json").is_err());
    }
}
