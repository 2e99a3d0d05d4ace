use crate::browser::{Driver, PageNode};
use crate::config::{CrawlingConfig, HarvestConfig, SelectorConfig};
use crate::error::{DriverError, ExtractionError};
use crate::parsers::text;
use crate::results::LinkRef;
use std::time::Duration;

/// Poll interval while waiting for an answer panel to attach
const PANEL_POLL: Duration = Duration::from_millis(50);

/// The content of one item, before category and ids are attached
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFragment {
    pub question: String,
    pub answer: String,
    pub links: Vec<LinkRef>,
}

/// Reads question, answer and links out of item elements
pub struct Extractor {
    selectors: SelectorConfig,
    crawling: CrawlingConfig,
}

impl Extractor {
    pub fn new(config: &HarvestConfig) -> Self {
        Self {
            selectors: config.selectors.clone(),
            crawling: config.crawling.clone(),
        }
    }

    /// Item elements of the page currently shown
    pub async fn list_items<D: Driver>(&self, driver: &D) -> Result<Vec<D::Node>, DriverError> {
        driver.find_all(&self.selectors.item).await
    }

    /// Extract one item, expanding it first when it is collapsed
    pub async fn extract<N: PageNode>(&self, item: &N) -> Result<ItemFragment, ExtractionError> {
        let question_node = item
            .find(&self.selectors.question)
            .await?
            .ok_or(ExtractionError::MissingQuestion)?;
        let question = text::clean_text(&question_node.text().await?);
        if question.is_empty() {
            return Err(ExtractionError::MissingQuestion);
        }

        if self.is_collapsed(item).await? {
            question_node.click().await?;
            self.wait_for_panel(item).await?;
            tokio::time::sleep(self.crawling.expand_settle()).await;
        }

        let mut fragments = Vec::new();
        for node in item.find_all(&self.selectors.answer).await? {
            fragments.push(text::clean_text(&node.text().await?));
        }
        let answer = text::join_fragments(fragments);
        if answer.is_empty() {
            return Err(ExtractionError::MissingAnswer);
        }

        let mut links = Vec::new();
        for node in item.find_all(&self.selectors.answer_links).await? {
            let label = node.text().await?;
            let href = node.attr("href").await?;
            if let Some(link) = LinkRef::from_parts(&text::clean_text(&label), href.as_deref()) {
                links.push(link);
            }
        }

        Ok(ItemFragment {
            question,
            answer,
            links,
        })
    }

    async fn is_collapsed<N: PageNode>(&self, item: &N) -> Result<bool, DriverError> {
        let Some(button) = item.find(&self.selectors.expand_button).await? else {
            return Ok(false);
        };
        let state = button.attr(&self.selectors.expand_state_attribute).await?;
        Ok(state.as_deref() == Some("false"))
    }

    async fn wait_for_panel<N: PageNode>(&self, item: &N) -> Result<(), ExtractionError> {
        let timeout = self.crawling.expand_timeout();
        let attached = async {
            loop {
                if item.find(&self.selectors.answer_panel).await?.is_some() {
                    return Ok::<(), DriverError>(());
                }
                tokio::time::sleep(PANEL_POLL).await;
            }
        };

        match tokio::time::timeout(timeout, attached).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ExtractionError::ExpandTimeout(timeout)),
        }
    }
}
