//! Crawl outcomes and batch statistics.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Article;

/// Why a single source's crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// Target count reached
    Completed,
    /// Feed ended (consecutive empty pages)
    Exhausted,
    /// An item outside the window stopped the crawl
    OutOfWindowStop,
    /// An item older than the whole window appeared after at least one accept
    WindowPassed,
    /// Fetch budget spent before any other stop condition
    MaxAttemptsExceeded,
    /// Cancellation was requested between iterations
    Cancelled,
}

impl CrawlOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlOutcome::Completed => "completed",
            CrawlOutcome::Exhausted => "exhausted",
            CrawlOutcome::OutOfWindowStop => "out-of-window-stop",
            CrawlOutcome::WindowPassed => "window-passed",
            CrawlOutcome::MaxAttemptsExceeded => "max-attempts-exceeded",
            CrawlOutcome::Cancelled => "cancelled",
        }
    }

    /// Whether the crawl ended on its own terms rather than being cut short.
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            CrawlOutcome::MaxAttemptsExceeded | CrawlOutcome::Cancelled
        )
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of crawling one source. Articles are valid even when the
/// outcome is not a success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub source: String,
    pub articles: Vec<Article>,
    pub outcome: CrawlOutcome,
    /// Page fetch calls issued, failed ones included
    pub attempts: u32,
}

/// Per-source line of a batch summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: String,
    pub outcome: CrawlOutcome,
    pub accepted: usize,
    pub attempts: u32,
}

impl From<&CrawlReport> for SourceReport {
    fn from(report: &CrawlReport) -> Self {
        Self {
            source: report.source.clone(),
            outcome: report.outcome,
            accepted: report.articles.len(),
            attempts: report.attempts,
        }
    }
}

/// Aggregate statistics of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_sources: usize,
    /// Sources with at least one accepted article
    pub updated: usize,
    /// Sources with no accepted article
    pub not_updated: usize,
    pub run_date: NaiveDate,
    #[serde(default)]
    pub sources: Vec<SourceReport>,
    /// Articles dropped because a previous report already listed them
    #[serde(default)]
    pub filtered_existing: usize,
}

impl BatchStats {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            total_sources: 0,
            updated: 0,
            not_updated: 0,
            run_date,
            sources: Vec::new(),
            filtered_existing: 0,
        }
    }

    /// Record one finished source.
    pub fn record(&mut self, report: &CrawlReport) {
        self.total_sources += 1;
        if report.articles.is_empty() {
            self.not_updated += 1;
        } else {
            self.updated += 1;
        }
        self.sources.push(SourceReport::from(report));
    }

    /// One-line human summary.
    pub fn message(&self) -> String {
        format!(
            "{} source(s) crawled on {}: {} updated, {} not updated, {} already reported",
            self.total_sources,
            self.run_date.format("%Y-%m-%d"),
            self.updated,
            self.not_updated,
            self.filtered_existing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(source: &str, count: usize, outcome: CrawlOutcome) -> CrawlReport {
        let articles = (0..count)
            .map(|i| Article {
                source: source.to_string(),
                title: format!("Article {}", i),
                link: format!("https://example.com/{}/{}", source, i),
                raw_time: "2026-02-02".to_string(),
                published: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                content_length: None,
                keyword_counts: None,
                score: 0.0,
            })
            .collect();
        CrawlReport {
            source: source.to_string(),
            articles,
            outcome,
            attempts: 3,
        }
    }

    #[test]
    fn test_record_classifies_sources() {
        let mut stats = BatchStats::new(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
        stats.record(&report("a", 2, CrawlOutcome::Completed));
        stats.record(&report("b", 0, CrawlOutcome::MaxAttemptsExceeded));
        stats.record(&report("c", 1, CrawlOutcome::MaxAttemptsExceeded));

        assert_eq!(stats.total_sources, 3);
        assert_eq!(stats.updated, 2);
        assert_eq!(stats.not_updated, 1);
        assert_eq!(stats.sources[1].outcome, CrawlOutcome::MaxAttemptsExceeded);
        assert_eq!(stats.sources[2].accepted, 1);
    }

    #[test]
    fn test_outcome_tags() {
        assert_eq!(CrawlOutcome::OutOfWindowStop.to_string(), "out-of-window-stop");
        assert!(CrawlOutcome::WindowPassed.is_success());
        assert!(!CrawlOutcome::Cancelled.is_success());
    }
}
