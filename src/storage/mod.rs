//! Report persistence.
//!
//! One JSON report per run date:
//!
//! ```text
//! {output_dir}/
//! ├── reports/
//! │   └── YYYY-MM-DD.json
//! ├── history/
//! │   └── {source}_YYYY-MM-DD.json
//! └── search/
//!     └── {source}_YYYY-MM-DD.json
//! ```
//!
//! The report of the previous day is what cross-run deduplication reads.
//! History and search listings are never filtered against it.

pub mod local;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Article, BatchStats, CrawlReport};

pub use local::LocalStorage;

/// Everything persisted for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub stats: BatchStats,
    pub articles: Vec<Article>,
}

impl Report {
    pub fn new(stats: BatchStats, articles: Vec<Article>) -> Self {
        Self {
            generated_at: Utc::now(),
            stats,
            articles,
        }
    }

    pub fn run_date(&self) -> NaiveDate {
        self.stats.run_date
    }

    pub fn titles(&self) -> HashSet<String> {
        self.articles.iter().map(|a| a.title.trim().to_string()).collect()
    }
}

/// Single-source result sets kept apart from the dated reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    History,
    Search,
}

impl Listing {
    pub fn dir(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Search => "search",
        }
    }
}

/// Trait for report storage backends.
#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// Persist a report under its run date, replacing any earlier one.
    /// Returns where it was written.
    async fn write_report(&self, report: &Report) -> Result<String>;

    /// Persist one source's history or search result, dated `date`.
    async fn write_listing(
        &self,
        listing: Listing,
        date: NaiveDate,
        report: &CrawlReport,
    ) -> Result<String>;

    /// Load the report of `date`, if one exists.
    async fn load_report(&self, date: NaiveDate) -> Result<Option<Report>>;

    /// Titles listed by the report of `date`; empty when there is none.
    async fn load_titles(&self, date: NaiveDate) -> Result<HashSet<String>> {
        Ok(self
            .load_report(date)
            .await?
            .map(|r| r.titles())
            .unwrap_or_default())
    }
}
