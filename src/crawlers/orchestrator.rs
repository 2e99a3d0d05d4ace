use crate::browser::Driver;
use crate::config::HarvestConfig;
use crate::crawlers::{Extractor, Navigator};
use crate::error::{CrawlError, DriverError, HarvestError, NavigationError, PaginationError};
use crate::observer::HarvestObserver;
use crate::results::{Category, CrawlResult, CrawlSummary, FaqItem};
use crate::utils;
use std::future::Future;
use std::sync::Arc;

/// Lifecycle of a [`FaqCrawler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    BrowserReady,
    PageLoaded,
    Crawling,
    Done,
    Failed,
}

/// Walks every category and page of the listing and collects items
///
/// Failures are contained at the smallest granularity that makes sense: a
/// bad item is skipped, a page that cannot be reached is skipped, a
/// category that cannot be activated is skipped. Only failing to open the
/// listing ends the run.
pub struct FaqCrawler {
    config: Arc<HarvestConfig>,
    observer: Arc<dyn HarvestObserver>,
    state: CrawlState,
    categories: Vec<Category>,
    items: CrawlResult,
}

impl FaqCrawler {
    pub fn new(config: Arc<HarvestConfig>, observer: Arc<dyn HarvestObserver>) -> Self {
        Self {
            config,
            observer,
            state: CrawlState::Idle,
            categories: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Categories discovered by the last run
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Items captured so far
    pub fn items(&self) -> &[FaqItem] {
        &self.items
    }

    /// Crawl with `driver` until done or until `shutdown` resolves
    ///
    /// The session is closed on every path before this returns. When
    /// `shutdown` wins, the items captured so far travel in
    /// [`HarvestError::Interrupted`].
    pub async fn run<D, S>(&mut self, driver: D, shutdown: S) -> Result<CrawlResult, HarvestError>
    where
        D: Driver,
        S: Future<Output = ()>,
    {
        self.categories.clear();
        self.items.clear();
        self.state = CrawlState::BrowserReady;

        let navigator = Navigator::new(driver, &self.config, Arc::clone(&self.observer));
        let outcome = tokio::select! {
            result = self.crawl(&navigator) => Some(result),
            _ = shutdown => None,
        };

        if let Err(e) = navigator.into_driver().close().await {
            self.observer.session_close_failed(&e);
        }

        match outcome {
            Some(Ok(())) => {
                self.state = CrawlState::Done;
                self.observer.crawl_finished(&self.summary());
                Ok(self.items.clone())
            }
            Some(Err(e)) => {
                self.state = CrawlState::Failed;
                Err(e.into())
            }
            None => {
                self.state = CrawlState::Failed;
                Err(HarvestError::Interrupted {
                    partial: self.items.clone(),
                })
            }
        }
    }

    /// Summary of the last run
    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            total_categories: self.categories.len(),
            total_faqs: self.items.len(),
            categories: self.categories.iter().map(|c| c.name.clone()).collect(),
            crawled_at: utils::format_timestamp(),
        }
    }

    async fn crawl<D: Driver>(&mut self, navigator: &Navigator<D>) -> Result<(), NavigationError> {
        navigator.open(&self.config.target_url).await?;
        self.state = CrawlState::PageLoaded;

        let categories = match navigator.list_categories().await {
            Ok(categories) => categories,
            Err(e) => {
                self.observer.categories_unavailable(&e);
                Vec::new()
            }
        };
        self.observer.categories_discovered(&categories);
        self.categories = categories.clone();
        self.state = CrawlState::Crawling;

        let extractor = Extractor::new(&self.config);
        let total = categories.len();
        for (position, category) in categories.iter().enumerate() {
            self.observer.category_started(category, position, total);

            match self.crawl_category(navigator, &extractor, category).await {
                Ok((captured, pages)) => {
                    self.observer.category_finished(category, captured, pages)
                }
                Err(e) => self.observer.category_failed(category, &e),
            }

            if position + 1 < total {
                tokio::time::sleep(self.config.crawling.delay_between_requests()).await;
            }
        }

        Ok(())
    }

    /// Returns the number of items captured and pages seen
    async fn crawl_category<D: Driver>(
        &mut self,
        navigator: &Navigator<D>,
        extractor: &Extractor,
        category: &Category,
    ) -> Result<(usize, u32), CrawlError> {
        navigator.activate_category(category.ordinal).await?;

        let pagination = navigator.pagination_state().await;
        self.observer.pagination_detected(category, &pagination);

        let total = pagination.total_pages;
        let start = self.items.len();
        // Numbering runs across pages
        let mut sequence = 0;

        for page in 1..=total {
            self.observer.page_started(category, page, total);

            if page > 1 {
                if let Err(e) = navigator.goto_page(page).await {
                    let past_end = matches!(e, PaginationError::OutOfRange { .. });
                    self.observer.page_failed(category, page, &e.into());
                    if past_end {
                        break;
                    }
                    continue;
                }
            }

            match self
                .crawl_page(navigator, extractor, category, page, &mut sequence)
                .await
            {
                Ok(captured) => self.observer.page_finished(category, page, captured),
                Err(e) => self.observer.page_failed(category, page, &e.into()),
            }

            if page < total {
                tokio::time::sleep(self.config.crawling.page_delay()).await;
            }
        }

        Ok((self.items.len() - start, total))
    }

    async fn crawl_page<D: Driver>(
        &mut self,
        navigator: &Navigator<D>,
        extractor: &Extractor,
        category: &Category,
        page: u32,
        sequence: &mut usize,
    ) -> Result<usize, DriverError> {
        let nodes = extractor.list_items(navigator.driver()).await?;
        let mut captured = 0;

        for (index, node) in nodes.iter().enumerate() {
            match extractor.extract(node).await {
                Ok(fragment) => {
                    let item = FaqItem {
                        category: category.name.clone(),
                        category_id: category.id.clone(),
                        question: fragment.question,
                        answer: fragment.answer,
                        links: fragment.links,
                        question_id: utils::question_id(category.ordinal, *sequence),
                        page_number: page,
                        created_at: utils::format_timestamp(),
                    };
                    *sequence += 1;
                    captured += 1;
                    self.observer.item_captured(&item);
                    self.items.push(item);
                }
                Err(e) => self.observer.item_skipped(category, page, index, &e),
            }
        }

        Ok(captured)
    }
}
