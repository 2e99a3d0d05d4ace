//! Artifacts written after a run, and loading a saved raw capture.

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::results::{FaqItem, ProcessedItem, SummaryStats};
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const FORMAT_VERSION: &str = "1.0";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const CSV_COLUMNS: [&str; 8] = [
    "category",
    "question",
    "answer",
    "category_id",
    "question_id",
    "links_text",
    "page_number",
    "created_at",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub created_at: String,
    pub total_items: usize,
    pub source: String,
    pub version: String,
}

/// Processed JSON artifact
#[derive(Debug, Serialize)]
struct Document<'a> {
    metadata: Metadata,
    data: &'a [ProcessedItem],
}

/// A saved capture is either a bare list or a document with metadata
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedCapture {
    Bare(Vec<FaqItem>),
    Wrapped { data: Vec<FaqItem> },
}

/// Writes run artifacts into the configured directories
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
    raw_dir: PathBuf,
    reports_dir: PathBuf,
    file_prefix: String,
    source: String,
}

impl OutputWriter {
    pub fn new(config: &HarvestConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.output.output_dir),
            raw_dir: PathBuf::from(&config.output.raw_dir),
            reports_dir: PathBuf::from(&config.output.reports_dir),
            file_prefix: utils::sanitize_filename(&config.output.file_prefix),
            source: config.source_name.clone(),
        }
    }

    /// Create the output, raw and report directories if missing
    pub fn ensure_directories(&self) -> Result<(), HarvestError> {
        for dir in [&self.output_dir, &self.raw_dir, &self.reports_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// `{metadata, data}` document of reconciled items
    pub fn save_processed_json(&self, items: &[ProcessedItem], stamp: &str) -> Result<PathBuf, HarvestError> {
        let path = self.output_dir.join(format!("{}_{}.json", self.file_prefix, stamp));
        let document = Document {
            metadata: Metadata {
                created_at: utils::format_timestamp(),
                total_items: items.len(),
                source: self.source.clone(),
                version: FORMAT_VERSION.to_string(),
            },
            data: items,
        };

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;
        Ok(path)
    }

    /// CSV of reconciled items, with a BOM so spreadsheet tools detect UTF-8
    pub fn save_csv(&self, items: &[ProcessedItem], stamp: &str) -> Result<PathBuf, HarvestError> {
        let path = self.output_dir.join(format!("{}_{}.csv", self.file_prefix, stamp));
        let mut file = File::create(&path)?;
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(CSV_COLUMNS)?;
        for item in items {
            let page_number = item.page_number.to_string();
            writer.write_record([
                item.category.as_str(),
                item.question.as_str(),
                item.answer.as_str(),
                item.category_id.as_str(),
                item.question_id.as_str(),
                item.links_text.as_str(),
                page_number.as_str(),
                item.created_at.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// The capture exactly as crawled
    pub fn save_raw(&self, items: &[FaqItem], stamp: &str) -> Result<PathBuf, HarvestError> {
        let path = self.raw_dir.join(format!("{}_raw_{}.json", self.file_prefix, stamp));
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, items)?;
        writer.flush()?;
        Ok(path)
    }

    pub fn save_report(&self, stats: &SummaryStats, stamp: &str) -> Result<PathBuf, HarvestError> {
        let path = self.reports_dir.join(format!("{}_report_{}.txt", self.file_prefix, stamp));
        fs::write(&path, render_report(stats, &self.source))?;
        Ok(path)
    }
}

/// Plain-text report; categories are listed by count, largest first
pub fn render_report(stats: &SummaryStats, source: &str) -> String {
    let rule = "=".repeat(60);
    let mut report = String::new();
    report.push_str(&format!("{}\n{} 크롤링 리포트\n{}\n", rule, source, rule));
    report.push_str(&format!("생성일시: {}\n", utils::format_timestamp()));
    report.push_str(&format!("총 수집 항목: {}개\n", stats.total_items));
    report.push_str(&format!("총 카테고리: {}개\n", stats.total_categories));
    report.push_str(&format!("평균 질문 길이: {}자\n", stats.avg_question_length));
    report.push_str(&format!("평균 답변 길이: {}자\n", stats.avg_answer_length));
    report.push_str(&format!("링크 포함 항목: {}개\n\n", stats.items_with_links));

    report.push_str("카테고리별 분포:\n");
    report.push_str(&format!("{}\n", "-".repeat(30)));
    let mut distribution: Vec<(&String, &usize)> = stats.category_distribution.iter().collect();
    distribution.sort_by(|a, b| b.1.cmp(a.1));
    for (category, count) in distribution {
        report.push_str(&format!("{}: {}개\n", category, count));
    }
    report.push_str(&format!("\n{}\n", rule));
    report
}

/// Load a raw capture, or the data part of a processed document
pub fn load_raw<P: AsRef<Path>>(path: P) -> Result<Vec<FaqItem>, HarvestError> {
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    let capture: SavedCapture = serde_json::from_str(&contents)?;
    Ok(match capture {
        SavedCapture::Bare(items) => items,
        SavedCapture::Wrapped { data } => data,
    })
}
