use crate::browser::{Driver, PageNode};
use crate::config::{CrawlingConfig, HarvestConfig, SelectorConfig};
use crate::error::{ActivationError, DriverError, NavigationError, PaginationError};
use crate::observer::HarvestObserver;
use crate::parsers::text;
use crate::results::{Category, PaginationState};
use crate::utils;
use std::sync::Arc;
use std::time::Duration;

/// Owns the browser session and moves it between categories and pages
pub struct Navigator<D: Driver> {
    driver: D,
    selectors: SelectorConfig,
    crawling: CrawlingConfig,
    timeout: Duration,
    observer: Arc<dyn HarvestObserver>,
}

impl<D: Driver> Navigator<D> {
    pub fn new(driver: D, config: &HarvestConfig, observer: Arc<dyn HarvestObserver>) -> Self {
        Self {
            driver,
            selectors: config.selectors.clone(),
            crawling: config.crawling.clone(),
            timeout: config.browser.timeout(),
            observer,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Give the session back, e.g. to close it
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Load the listing page and let client-side rendering settle
    pub async fn open(&self, url: &str) -> Result<(), NavigationError> {
        if !utils::validate_url(url) {
            return Err(NavigationError::InvalidUrl(url.to_string()));
        }

        let load = async {
            self.driver.goto(url).await?;
            self.driver.wait_for_load(self.timeout).await
        };
        match tokio::time::timeout(self.timeout, load).await {
            Ok(Ok(())) => {}
            Ok(Err(DriverError::Timeout { .. })) | Err(_) => {
                return Err(NavigationError::Timeout {
                    url: url.to_string(),
                    timeout: self.timeout,
                });
            }
            Ok(Err(e)) => return Err(e.into()),
        }

        tokio::time::sleep(self.crawling.settle_delay()).await;
        self.observer.page_opened(url);
        Ok(())
    }

    /// Category controls currently rendered, blank labels skipped
    pub async fn list_categories(&self) -> Result<Vec<Category>, DriverError> {
        let controls = self.driver.find_all(&self.selectors.category).await?;
        let mut categories = Vec::with_capacity(controls.len());
        for (ordinal, control) in controls.iter().enumerate() {
            let name = text::clean_text(&control.text().await?);
            if !name.is_empty() {
                categories.push(Category::new(name, ordinal));
            }
        }
        Ok(categories)
    }

    /// Click the category control at `ordinal` and wait for the listing
    pub async fn activate_category(&self, ordinal: usize) -> Result<(), ActivationError> {
        let controls = self.driver.find_all(&self.selectors.category).await?;
        let count = controls.len();
        let control = controls
            .into_iter()
            .nth(ordinal)
            .ok_or(ActivationError::IndexOutOfRange { ordinal, count })?;

        control.click().await?;
        tokio::time::sleep(self.crawling.delay_between_requests()).await;
        self.driver.wait_for_load(self.timeout).await?;
        Ok(())
    }

    /// Read the pagination controls; any failure means "single page"
    pub async fn pagination_state(&self) -> PaginationState {
        match self.probe_pagination().await {
            Ok(state) => state,
            Err(e) => {
                self.observer.pagination_probe_failed(&e);
                PaginationState::single_page()
            }
        }
    }

    async fn probe_pagination(&self) -> Result<PaginationState, DriverError> {
        let pagination = &self.selectors.pagination;
        if self.driver.find(&pagination.container).await?.is_none() {
            return Ok(PaginationState::single_page());
        }

        let labels = self.driver.find_all(&pagination.page_numbers).await?;
        if labels.is_empty() {
            return Ok(PaginationState::single_page());
        }

        let current_page = match self.driver.find(&pagination.current_page).await? {
            Some(node) => parse_page(&node.text().await?).unwrap_or(1),
            None => 1,
        };

        let mut total_pages = 1;
        for label in &labels {
            if let Some(page) = parse_page(&label.text().await?) {
                total_pages = total_pages.max(page);
            }
        }

        Ok(PaginationState {
            has_pagination: true,
            total_pages: total_pages.max(current_page),
            current_page,
        })
    }

    /// Move to page `page` of the active category
    ///
    /// Clicks the page's numeric label when it is rendered. Otherwise steps
    /// forward with the "next" control, at most `total_pages` times, and
    /// requires every step to advance. Succeeds only on the requested page.
    pub async fn goto_page(&self, page: u32) -> Result<(), PaginationError> {
        let state = self.pagination_state().await;
        if !state.has_pagination || page == state.current_page {
            return Ok(());
        }
        if page < 1 || page > state.total_pages {
            return Err(PaginationError::OutOfRange {
                requested: page,
                total: state.total_pages,
            });
        }

        if let Some(label) = self.find_page_label(page).await? {
            label.click().await?;
            self.wait_page_change().await?;
            return Ok(());
        }

        let mut current = state.current_page;
        let mut steps = 0;
        while current != page {
            if current > page {
                return Err(PaginationError::NotReachable {
                    requested: page,
                    current,
                });
            }
            if steps >= state.total_pages {
                return Err(PaginationError::StepLimitExceeded {
                    requested: page,
                    steps,
                });
            }

            let next = self
                .driver
                .find(&self.selectors.pagination.next_button)
                .await?
                .ok_or(PaginationError::NotReachable {
                    requested: page,
                    current,
                })?;
            next.click().await?;
            steps += 1;
            self.wait_page_change().await?;

            let after = self.pagination_state().await.current_page;
            if after <= current {
                return Err(PaginationError::Stalled { page: current });
            }
            current = after;

            // A numeric label may have come into view, also after overshooting
            if current != page {
                if let Some(label) = self.find_page_label(page).await? {
                    label.click().await?;
                    self.wait_page_change().await?;
                    current = self.pagination_state().await.current_page;
                    if current != page {
                        return Err(PaginationError::NotReachable {
                            requested: page,
                            current,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    async fn find_page_label(&self, page: u32) -> Result<Option<D::Node>, DriverError> {
        let labels = self
            .driver
            .find_all(&self.selectors.pagination.page_numbers)
            .await?;
        for label in labels {
            if parse_page(&label.text().await?) == Some(page) {
                return Ok(Some(label));
            }
        }
        Ok(None)
    }

    async fn wait_page_change(&self) -> Result<(), DriverError> {
        tokio::time::sleep(self.crawling.page_change_delay()).await;
        self.driver.wait_for_load(self.timeout).await
    }
}

fn parse_page(label: &str) -> Option<u32> {
    label.trim().parse().ok()
}
