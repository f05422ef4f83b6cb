// src/pipeline/batch.rs

//! Multi-source batch runs.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use futures::stream::{self, StreamExt};
use log::{error, info};

use crate::error::{AppError, Result};
use crate::models::{Article, BatchStats, CrawlOutcome, CrawlReport, CrawlerConfig, KeywordSpec};
use crate::pipeline::{
    CrawlRequest, DateWindow, KeywordScorer, PaginationCrawler, Pause, filter_existing,
};

/// Articles of a batch in source order, plus its statistics.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub articles: Vec<Article>,
    pub stats: BatchStats,
}

impl BatchOutput {
    fn from_reports(reports: Vec<CrawlReport>, run_date: NaiveDate) -> Self {
        let mut stats = BatchStats::new(run_date);
        let mut articles = Vec::new();
        for report in reports {
            stats.record(&report);
            articles.extend(report.articles);
        }
        Self { articles, stats }
    }

    /// Drop articles already listed by an earlier report.
    pub fn filter_existing(&mut self, previous_titles: &HashSet<String>) {
        let result = filter_existing(std::mem::take(&mut self.articles), previous_titles);
        self.stats.filtered_existing += result.dropped_count();
        self.articles = result.fresh;
    }
}

/// Runs the crawler over a list of sources and aggregates the results.
pub struct BatchOrchestrator {
    crawler: PaginationCrawler,
    scorer: KeywordScorer,
    max_concurrent_sources: usize,
    out_of_window_tolerance: usize,
}

impl BatchOrchestrator {
    pub fn new(crawler: PaginationCrawler, scorer: KeywordScorer, config: &CrawlerConfig) -> Self {
        Self {
            crawler,
            scorer,
            max_concurrent_sources: config.max_concurrent_sources.max(1),
            out_of_window_tolerance: config.out_of_window_tolerance,
        }
    }

    pub fn crawler(&self) -> &PaginationCrawler {
        &self.crawler
    }

    pub fn scorer(&self) -> &KeywordScorer {
        &self.scorer
    }

    /// Recent articles of every source, dated within the last `days` days.
    pub async fn run_batch(
        &self,
        sources: &[String],
        per_source_target: usize,
        days: u32,
    ) -> Result<BatchOutput> {
        self.run_batch_on(sources, per_source_target, days, Local::now().date_naive())
            .await
    }

    /// [`run_batch`](Self::run_batch) with an explicit "today".
    pub async fn run_batch_on(
        &self,
        sources: &[String],
        per_source_target: usize,
        days: u32,
        today: NaiveDate,
    ) -> Result<BatchOutput> {
        let reports = self
            .crawl_sources(sources, per_source_target, days, today)
            .await?;
        let output = BatchOutput::from_reports(reports, today);
        info!("{}", output.stats.message());
        Ok(output)
    }

    /// Batch crawl, then rank each source's articles on their own.
    ///
    /// Sources keep their order; within a source articles are ordered by
    /// score.
    pub async fn run_and_rank(
        &self,
        sources: &[String],
        per_source_target: usize,
        days: u32,
        spec: &KeywordSpec,
    ) -> Result<BatchOutput> {
        self.run_and_rank_on(sources, per_source_target, days, spec, Local::now().date_naive())
            .await
    }

    pub async fn run_and_rank_on(
        &self,
        sources: &[String],
        per_source_target: usize,
        days: u32,
        spec: &KeywordSpec,
        today: NaiveDate,
    ) -> Result<BatchOutput> {
        self.scorer.ensure_ready()?;
        let reports = self
            .crawl_sources(sources, per_source_target, days, today)
            .await?;

        let mut ranked = Vec::with_capacity(reports.len());
        for mut report in reports {
            let articles = std::mem::take(&mut report.articles);
            report.articles = self.scorer.rank(articles, spec).await?;
            ranked.push(report);
        }

        let output = BatchOutput::from_reports(ranked, today);
        info!("{}", output.stats.message());
        Ok(output)
    }

    /// Full recent history of one source, ranked by keyword score.
    pub async fn search_source(
        &self,
        source: &str,
        max_articles: usize,
        spec: &KeywordSpec,
    ) -> Result<CrawlReport> {
        self.scorer.ensure_ready()?;
        let mut report = self.crawler.crawl_history(source, max_articles).await?;
        let articles = std::mem::take(&mut report.articles);
        report.articles = self.scorer.rank(articles, spec).await?;
        Ok(report)
    }

    async fn crawl_sources(
        &self,
        sources: &[String],
        per_source_target: usize,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<CrawlReport>> {
        if sources.is_empty() {
            return Err(AppError::validation("source list is empty"));
        }
        if let Some(i) = sources.iter().position(|s| s.trim().is_empty()) {
            return Err(AppError::validation(format!("source #{} is blank", i + 1)));
        }
        if days == 0 {
            return Err(AppError::validation("days must be at least 1"));
        }
        if per_source_target == 0 {
            return Err(AppError::validation("per-source target must be at least 1"));
        }
        self.crawler.ensure_ready()?;

        let window = DateWindow::recent(today, days);
        let request = CrawlRequest::recent(per_source_target, self.crawler.max_attempts(), window)
            .with_tolerance(self.out_of_window_tolerance);
        info!(
            "Batch of {} source(s): up to {} article(s) each from the last {} day(s)",
            sources.len(),
            per_source_target,
            days
        );

        let total = sources.len();
        let request = &request;
        let reports: Vec<CrawlReport> = stream::iter(sources.iter().enumerate())
            .map(|(i, source)| async move {
                if i > 0 {
                    self.crawler.pacer().pause(Pause::BetweenSources).await;
                }
                info!("Source {}/{}: {}", i + 1, total, source);
                self.crawl_one(source, request).await
            })
            .buffered(self.max_concurrent_sources)
            .collect()
            .await;
        Ok(reports)
    }

    /// A source that errors out is reported as having collected nothing.
    async fn crawl_one(&self, source: &str, request: &CrawlRequest) -> CrawlReport {
        match self.crawler.crawl(source, request).await {
            Ok(report) => report,
            Err(e) => {
                error!("'{}' failed: {}", source, e);
                CrawlReport {
                    source: source.trim().to_string(),
                    articles: Vec::new(),
                    outcome: CrawlOutcome::MaxAttemptsExceeded,
                    attempts: 0,
                }
            }
        }
    }
}
