//! In-memory FAQ site implementing the browser traits for tests.
//!
//! The site understands exactly the selectors of a [`SelectorConfig`]. Item
//! handles go stale when the active category or page changes, like real
//! WebDriver element references do.

use crate::browser::{Driver, PageNode};
use crate::config::SelectorConfig;
use crate::error::{CrawlError, DriverError, ExtractionError};
use crate::observer::{HarvestObserver, RejectReason};
use crate::results::Category;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub(crate) struct MockItem {
    pub question: Option<String>,
    pub answers: Vec<String>,
    pub links: Vec<(String, Option<String>)>,
    pub collapsed: bool,
    /// Panel never attaches when expanded
    pub never_expands: bool,
    /// Every query inside the item fails
    pub broken: bool,
}

impl MockItem {
    pub fn new(question: &str, answer: &str) -> Self {
        Self {
            question: Some(question.to_string()),
            answers: vec![answer.to_string()],
            ..Self::default()
        }
    }

    pub fn collapsed(mut self) -> Self {
        self.collapsed = true;
        self
    }

    pub fn with_link(mut self, text: &str, href: Option<&str>) -> Self {
        self.links.push((text.to_string(), href.map(str::to_string)));
        self
    }

    pub fn without_answer(mut self) -> Self {
        self.answers.clear();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockCategory {
    pub name: String,
    pub pages: Vec<Vec<MockItem>>,
    /// Clicking the control fails
    pub broken: bool,
}

impl MockCategory {
    pub fn new(name: &str, pages: Vec<Vec<MockItem>>) -> Self {
        Self {
            name: name.to_string(),
            pages,
            broken: false,
        }
    }

    fn total_pages(&self) -> u32 {
        self.pages.len().max(1) as u32
    }
}

/// How page-number labels are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PagerStyle {
    /// Every page number plus a non-numeric "›" label
    Full,
    /// Only the current and last page numbers
    Windowed,
}

#[derive(Debug)]
struct SiteState {
    categories: Vec<MockCategory>,
    active: usize,
    page: u32,
    expanded: HashSet<(usize, u32, usize)>,
    pager: PagerStyle,
    next_clicks: usize,
    stuck_next: bool,
    next_jump: u32,
    load_delay: Option<Duration>,
    fail_goto: bool,
    fail_pagination: bool,
    visited: Vec<String>,
    closed: bool,
}

#[derive(Clone)]
pub(crate) struct MockSite {
    state: Arc<Mutex<SiteState>>,
    selectors: Arc<SelectorConfig>,
}

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    Category(usize),
    Item(Location),
    Question(Location),
    ExpandButton(Location),
    Panel(Location),
    Answer(Location, usize),
    Link(Location, usize),
    PageNumber(String),
    CurrentPage(u32),
    NextButton,
    Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Location {
    category: usize,
    page: u32,
    index: usize,
}

#[derive(Clone)]
pub(crate) struct MockNode {
    site: MockSite,
    kind: NodeKind,
}

fn fail(what: &str) -> DriverError {
    DriverError::Command(what.to_string())
}

impl MockSite {
    pub fn new(categories: Vec<MockCategory>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SiteState {
                categories,
                active: 0,
                page: 1,
                expanded: HashSet::new(),
                pager: PagerStyle::Full,
                next_clicks: 0,
                stuck_next: false,
                next_jump: 1,
                load_delay: None,
                fail_goto: false,
                fail_pagination: false,
                visited: Vec::new(),
                closed: false,
            })),
            selectors: Arc::new(SelectorConfig::default()),
        }
    }

    pub fn with_pager(self, pager: PagerStyle) -> Self {
        self.state.lock().unwrap().pager = pager;
        self
    }

    pub fn with_stuck_next(self) -> Self {
        self.state.lock().unwrap().stuck_next = true;
        self
    }

    /// "next" advances `pages` pages per click
    pub fn with_next_jump(self, pages: u32) -> Self {
        self.state.lock().unwrap().next_jump = pages;
        self
    }

    /// Every page load takes `delay`
    pub fn with_load_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().load_delay = Some(delay);
        self
    }

    /// Queries for the pagination container fail
    pub fn with_failing_pagination(self) -> Self {
        self.state.lock().unwrap().fail_pagination = true;
        self
    }

    pub fn with_failing_goto(self) -> Self {
        self.state.lock().unwrap().fail_goto = true;
        self
    }

    pub fn next_clicks(&self) -> usize {
        self.state.lock().unwrap().next_clicks
    }

    pub fn current_page(&self) -> u32 {
        self.state.lock().unwrap().page
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    fn node(&self, kind: NodeKind) -> MockNode {
        MockNode {
            site: self.clone(),
            kind,
        }
    }

    fn check_open(state: &SiteState) -> Result<(), DriverError> {
        if state.closed {
            return Err(fail("session closed"));
        }
        Ok(())
    }

    fn page_labels(state: &SiteState) -> Vec<String> {
        let total = state.categories[state.active].total_pages();
        match state.pager {
            PagerStyle::Full => {
                let mut labels: Vec<String> = (1..=total).map(|n| n.to_string()).collect();
                labels.push("›".to_string());
                labels
            }
            PagerStyle::Windowed => {
                let mut labels = vec![state.page.to_string()];
                if state.page != total {
                    labels.push(total.to_string());
                }
                labels
            }
        }
    }
}

#[async_trait]
impl Driver for MockSite {
    type Node = MockNode;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_open(&state)?;
        if state.fail_goto {
            return Err(fail("net::ERR_NAME_NOT_RESOLVED"));
        }
        state.visited.push(url.to_string());
        Ok(())
    }

    async fn wait_for_load(&self, _timeout: Duration) -> Result<(), DriverError> {
        let delay = {
            let state = self.state.lock().unwrap();
            Self::check_open(&state)?;
            state.load_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<MockNode>, DriverError> {
        let state = self.state.lock().unwrap();
        Self::check_open(&state)?;
        let sel = &self.selectors;
        let pagination = &sel.pagination;
        let category = state.categories.get(state.active);
        let total = category.map(MockCategory::total_pages).unwrap_or(1);

        let kinds: Vec<NodeKind> = if selector == sel.category {
            (0..state.categories.len()).map(NodeKind::Category).collect()
        } else if selector == sel.item {
            let items = category
                .and_then(|c| c.pages.get(state.page as usize - 1))
                .map(Vec::len)
                .unwrap_or(0);
            (0..items)
                .map(|index| {
                    NodeKind::Item(Location {
                        category: state.active,
                        page: state.page,
                        index,
                    })
                })
                .collect()
        } else if selector == pagination.container {
            if state.fail_pagination {
                return Err(fail("stale element reference"));
            }
            if total > 1 { vec![NodeKind::Container] } else { Vec::new() }
        } else if selector == pagination.page_numbers {
            if total > 1 {
                Self::page_labels(&state).into_iter().map(NodeKind::PageNumber).collect()
            } else {
                Vec::new()
            }
        } else if selector == pagination.current_page {
            if total > 1 { vec![NodeKind::CurrentPage(state.page)] } else { Vec::new() }
        } else if selector == pagination.next_button {
            if state.page < total { vec![NodeKind::NextButton] } else { Vec::new() }
        } else {
            Vec::new()
        };

        drop(state);
        Ok(kinds.into_iter().map(|kind| self.node(kind)).collect())
    }

    async fn close(self) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        Self::check_open(&state)?;
        state.closed = true;
        Ok(())
    }
}

impl MockNode {
    fn item<'a>(state: &'a SiteState, loc: &Location) -> Result<&'a MockItem, DriverError> {
        if state.active != loc.category || state.page != loc.page {
            return Err(fail("stale element reference"));
        }
        let item = state.categories[loc.category].pages[loc.page as usize - 1]
            .get(loc.index)
            .ok_or_else(|| fail("stale element reference"))?;
        if item.broken {
            return Err(fail("element is not reachable"));
        }
        Ok(item)
    }

    fn panel_attached(state: &SiteState, loc: &Location, item: &MockItem) -> bool {
        !item.collapsed || state.expanded.contains(&(loc.category, loc.page, loc.index))
    }
}

#[async_trait]
impl PageNode for MockNode {
    async fn text(&self) -> Result<String, DriverError> {
        let state = self.site.state.lock().unwrap();
        MockSite::check_open(&state)?;
        let text = match &self.kind {
            NodeKind::Category(i) => state.categories[*i].name.clone(),
            NodeKind::Question(loc) => Self::item(&state, loc)?.question.clone().unwrap_or_default(),
            NodeKind::Answer(loc, i) => Self::item(&state, loc)?.answers[*i].clone(),
            NodeKind::Link(loc, i) => Self::item(&state, loc)?.links[*i].0.clone(),
            NodeKind::PageNumber(label) => label.clone(),
            NodeKind::CurrentPage(page) => page.to_string(),
            _ => String::new(),
        };
        Ok(text)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, DriverError> {
        let state = self.site.state.lock().unwrap();
        MockSite::check_open(&state)?;
        let value = match &self.kind {
            NodeKind::ExpandButton(loc) if name == self.site.selectors.expand_state_attribute => {
                let item = Self::item(&state, loc)?;
                Some(Self::panel_attached(&state, loc, item).to_string())
            }
            NodeKind::Link(loc, i) if name == "href" => Self::item(&state, loc)?.links[*i].1.clone(),
            _ => None,
        };
        Ok(value)
    }

    async fn click(&self) -> Result<(), DriverError> {
        let mut state = self.site.state.lock().unwrap();
        MockSite::check_open(&state)?;
        match &self.kind {
            NodeKind::Category(i) => {
                if state.categories[*i].broken {
                    return Err(fail("element click intercepted"));
                }
                state.active = *i;
                state.page = 1;
            }
            NodeKind::Question(loc) => {
                let item = Self::item(&state, loc)?;
                if !item.never_expands {
                    state.expanded.insert((loc.category, loc.page, loc.index));
                }
            }
            NodeKind::PageNumber(label) => {
                let page: u32 = label.parse().map_err(|_| fail("not a page label"))?;
                state.page = page;
            }
            NodeKind::NextButton => {
                state.next_clicks += 1;
                let total = state.categories[state.active].total_pages();
                if !state.stuck_next && state.page < total {
                    state.page = (state.page + state.next_jump).min(total);
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<MockNode>, DriverError> {
        let state = self.site.state.lock().unwrap();
        MockSite::check_open(&state)?;
        let sel = &self.site.selectors;
        let NodeKind::Item(loc) = &self.kind else {
            return Ok(Vec::new());
        };
        let loc = *loc;
        let item = Self::item(&state, &loc)?;
        let attached = Self::panel_attached(&state, &loc, item);

        let kinds: Vec<NodeKind> = if selector == sel.question {
            item.question.iter().map(|_| NodeKind::Question(loc)).collect()
        } else if selector == sel.expand_button {
            vec![NodeKind::ExpandButton(loc)]
        } else if selector == sel.answer_panel {
            if attached { vec![NodeKind::Panel(loc)] } else { Vec::new() }
        } else if selector == sel.answer {
            if attached {
                (0..item.answers.len()).map(|i| NodeKind::Answer(loc, i)).collect()
            } else {
                Vec::new()
            }
        } else if selector == sel.answer_links {
            if attached {
                (0..item.links.len()).map(|i| NodeKind::Link(loc, i)).collect()
            } else {
                Vec::new()
            }
        } else {
            Vec::new()
        };

        drop(state);
        Ok(kinds
            .into_iter()
            .map(|kind| self.site.node(kind))
            .collect())
    }
}

/// Observer that records events as short strings
#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(prefix)).count()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl HarvestObserver for RecordingObserver {
    fn category_started(&self, category: &Category, _position: usize, _total: usize) {
        self.push(format!("category_started {}", category.name));
    }

    fn category_failed(&self, category: &Category, error: &CrawlError) {
        self.push(format!("category_failed {}: {}", category.name, error));
    }

    fn page_failed(&self, category: &Category, page: u32, error: &CrawlError) {
        self.push(format!("page_failed {} {}: {}", category.name, page, error));
    }

    fn item_skipped(&self, category: &Category, page: u32, index: usize, error: &ExtractionError) {
        self.push(format!("item_skipped {} {} {}: {}", category.name, page, index, error));
    }

    fn duplicates_removed(&self, before: usize, after: usize) {
        self.push(format!("duplicates_removed {} {}", before, after));
    }

    fn pagination_probe_failed(&self, error: &DriverError) {
        self.push(format!("pagination_probe_failed: {}", error));
    }

    fn item_rejected(&self, reason: RejectReason, text: &str) {
        self.push(format!("item_rejected {}: {}", reason, text));
    }
}
