//! Reconciliation of a raw capture: clean, deduplicate, categorize, validate.

use crate::classify::CategoryClassifier;
use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::observer::{HarvestObserver, RejectReason};
use crate::parsers::{html, text};
use crate::results::{FaqItem, LinkRef, ProcessedItem, SummaryStats};
use crate::utils;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Characters of question and answer that make up the duplicate key
const DEDUP_PREFIX: usize = 100;

const MIN_QUESTION_CHARS: usize = 5;
const MIN_ANSWER_CHARS: usize = 10;

/// Strip tag-like markup and collapse whitespace
pub fn clean_text_data(input: &str) -> String {
    text::clean_text(&html::strip_tags(input))
}

/// Render links as `text (url) | text (url)`
pub fn format_links(links: &[LinkRef]) -> String {
    links
        .iter()
        .filter(|link| !link.text.is_empty() && !link.url.is_empty())
        .map(|link| format!("{} ({})", link.text, link.url))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub struct DataProcessor {
    classifier: CategoryClassifier,
    observer: Arc<dyn HarvestObserver>,
    processed: Vec<ProcessedItem>,
    category_stats: BTreeMap<String, usize>,
}

impl DataProcessor {
    /// Build a processor using the configured category rule table
    pub fn new(config: &HarvestConfig, observer: Arc<dyn HarvestObserver>) -> Result<Self, HarvestError> {
        let classifier = CategoryClassifier::new(&config.category_rules, &config.default_category)
            .map_err(|e| HarvestError::Config(format!("invalid category rule: {}", e)))?;
        Ok(Self::with_classifier(classifier, observer))
    }

    pub fn with_classifier(classifier: CategoryClassifier, observer: Arc<dyn HarvestObserver>) -> Self {
        Self {
            classifier,
            observer,
            processed: Vec::new(),
            category_stats: BTreeMap::new(),
        }
    }

    /// Run the full pipeline over a raw capture
    ///
    /// The capture is only read; results of the previous run are discarded.
    pub fn process(&mut self, raw: &[FaqItem]) -> Vec<ProcessedItem> {
        self.category_stats.clear();

        let cleaned = raw.iter().map(Self::clean).collect();
        let unique = self.deduplicate(cleaned);
        let categorized = self.categorize(unique);
        let validated = self.validate(categorized);

        self.processed = validated.clone();
        validated
    }

    pub fn clean(item: &FaqItem) -> ProcessedItem {
        ProcessedItem {
            category: item.category.clone(),
            category_id: item.category_id.clone(),
            question: clean_text_data(&item.question),
            answer: clean_text_data(&item.answer),
            links: item.links.clone(),
            links_text: format_links(&item.links),
            question_id: item.question_id.clone(),
            page_number: item.page_number,
            created_at: item.created_at.clone(),
        }
    }

    /// Keep the first item of every question/answer prefix pair
    pub fn deduplicate(&self, items: Vec<ProcessedItem>) -> Vec<ProcessedItem> {
        let before = items.len();
        let mut seen = HashSet::with_capacity(before);
        let unique: Vec<ProcessedItem> = items
            .into_iter()
            .filter(|item| {
                seen.insert(format!(
                    "{}_{}",
                    text::prefix_chars(&item.question, DEDUP_PREFIX),
                    text::prefix_chars(&item.answer, DEDUP_PREFIX)
                ))
            })
            .collect();

        self.observer.duplicates_removed(before, unique.len());
        unique
    }

    /// Fill in missing categories and ids, and count items per category
    pub fn categorize(&mut self, items: Vec<ProcessedItem>) -> Vec<ProcessedItem> {
        items
            .into_iter()
            .map(|mut item| {
                if item.category.trim().is_empty() {
                    let combined = format!("{} {}", item.question, item.answer);
                    item.category = self.classifier.classify(&combined).to_string();
                }
                *self.category_stats.entry(item.category.clone()).or_insert(0) += 1;

                if item.question_id.is_empty() {
                    item.question_id = utils::generate_id(&item.question);
                }
                if item.category_id.is_empty() {
                    item.category_id = utils::generate_id(&item.category);
                }
                item
            })
            .collect()
    }

    /// Drop items whose question or answer is too short to be useful
    pub fn validate(&self, items: Vec<ProcessedItem>) -> Vec<ProcessedItem> {
        let before = items.len();
        let mut valid = Vec::with_capacity(before);

        for mut item in items {
            let question = clean_text_data(&item.question);
            let answer = clean_text_data(&item.answer);

            if text::char_len(&question) < MIN_QUESTION_CHARS {
                self.observer.item_rejected(RejectReason::QuestionTooShort, &question);
                continue;
            }
            if text::char_len(&answer) < MIN_ANSWER_CHARS {
                self.observer.item_rejected(RejectReason::AnswerTooShort, &answer);
                continue;
            }

            item.question = question;
            item.answer = answer;
            valid.push(item);
        }

        self.observer.validation_finished(before, valid.len());
        valid
    }

    /// Items kept by the last run
    pub fn processed(&self) -> &[ProcessedItem] {
        &self.processed
    }

    /// Per-category counts, taken before validation
    pub fn category_stats(&self) -> &BTreeMap<String, usize> {
        &self.category_stats
    }

    pub fn summary_stats(&self) -> SummaryStats {
        if self.processed.is_empty() {
            return SummaryStats::default();
        }

        let total = self.processed.len() as f64;
        let question_chars: usize = self.processed.iter().map(|i| text::char_len(&i.question)).sum();
        let answer_chars: usize = self.processed.iter().map(|i| text::char_len(&i.answer)).sum();

        SummaryStats {
            total_items: self.processed.len(),
            total_categories: self.category_stats.len(),
            avg_question_length: round2(question_chars as f64 / total),
            avg_answer_length: round2(answer_chars as f64 / total),
            items_with_links: self.processed.iter().filter(|i| !i.links.is_empty()).count(),
            category_distribution: self.category_stats.clone(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
