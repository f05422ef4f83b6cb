// src/pipeline/crawl.rs

//! Paginated, date-windowed crawl of a single source.
//!
//! The loop fetches one page at a time, resolves each new entry's publish
//! date, and keeps the entries the request accepts. It ends on the first of:
//! target reached, feed exhausted, an out-of-window stop, the window being
//! passed, the fetch budget running out, or cancellation.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::{Article, CrawlOutcome, CrawlReport, CrawlerConfig, RawItem};
use crate::pipeline::{DateWindow, OffsetPolicy, PageOutcome, Pacer, Pause};
use crate::services::{ContentFetcher, PageFetcher};

/// Predicate deciding whether a resolved publish date is acceptable.
pub type AcceptFn = Arc<dyn Fn(NaiveDate) -> bool + Send + Sync>;

/// Parameters of one source crawl.
#[derive(Clone)]
pub struct CrawlRequest {
    /// Articles to collect before stopping
    pub target: usize,
    /// Page fetch calls allowed, failed ones included
    pub max_attempts: u32,
    /// Dates an article must fall on, if any
    pub window: Option<DateWindow>,
    /// Extra date predicate, checked before the window
    pub accept: Option<AcceptFn>,
    /// Stop instead of skipping when an item is rejected by date
    pub stop_on_out_of_window: bool,
    /// Rejected items tolerated before the stop fires
    pub out_of_window_tolerance: usize,
}

impl CrawlRequest {
    /// No date constraint at all.
    pub fn history(target: usize, max_attempts: u32) -> Self {
        Self {
            target,
            max_attempts,
            window: None,
            accept: None,
            stop_on_out_of_window: false,
            out_of_window_tolerance: 0,
        }
    }

    /// Articles inside `window`, stopping at the first item outside it.
    pub fn recent(target: usize, max_attempts: u32, window: DateWindow) -> Self {
        Self {
            window: Some(window),
            stop_on_out_of_window: true,
            ..Self::history(target, max_attempts)
        }
    }

    pub fn with_accept(mut self, accept: impl Fn(NaiveDate) -> bool + Send + Sync + 'static) -> Self {
        self.accept = Some(Arc::new(accept));
        self
    }

    pub fn with_stop_on_out_of_window(mut self, stop: bool) -> Self {
        self.stop_on_out_of_window = stop;
        self
    }

    pub fn with_tolerance(mut self, tolerance: usize) -> Self {
        self.out_of_window_tolerance = tolerance;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.target == 0 {
            return Err(AppError::validation("target must be at least 1"));
        }
        if self.max_attempts == 0 {
            return Err(AppError::validation("max_attempts must be at least 1"));
        }
        Ok(())
    }
}

impl fmt::Debug for CrawlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlRequest")
            .field("target", &self.target)
            .field("max_attempts", &self.max_attempts)
            .field("window", &self.window)
            .field("accept", &self.accept.as_ref().map(|_| "<fn>"))
            .field("stop_on_out_of_window", &self.stop_on_out_of_window)
            .field("out_of_window_tolerance", &self.out_of_window_tolerance)
            .finish()
    }
}

/// Mutable state of one crawl, owned by the loop.
#[derive(Debug, Default)]
struct CrawlRun {
    offset: usize,
    attempts: u32,
    empty_streak: u32,
    consecutive_failures: u32,
    failed_fetches: u32,
    rejected: usize,
    seen: HashSet<String>,
    /// Links rejected by date; never resolved again
    skipped: HashSet<String>,
    articles: Vec<Article>,
    stop: Option<CrawlOutcome>,
}

impl CrawlRun {
    fn into_report(self, source: &str, outcome: CrawlOutcome) -> CrawlReport {
        CrawlReport {
            source: source.to_string(),
            articles: self.articles,
            outcome,
            attempts: self.attempts,
        }
    }
}

/// Verdict on one resolved item.
enum Verdict {
    Accept,
    Skip,
    Stop(CrawlOutcome),
}

/// Crawls one source page by page.
#[derive(Clone)]
pub struct PaginationCrawler {
    pages: Arc<dyn PageFetcher>,
    contents: Arc<dyn ContentFetcher>,
    pacer: Arc<dyn Pacer>,
    policy: OffsetPolicy,
    page_size: usize,
    empty_page_limit: u32,
    max_attempts: u32,
    cancel: CancellationToken,
}

impl PaginationCrawler {
    pub fn new(
        pages: Arc<dyn PageFetcher>,
        contents: Arc<dyn ContentFetcher>,
        pacer: Arc<dyn Pacer>,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            pages,
            contents,
            pacer,
            policy: OffsetPolicy::for_page_size(config.page_size),
            page_size: config.page_size,
            empty_page_limit: config.empty_page_limit.max(1),
            max_attempts: config.max_attempts,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between iterations once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn pacer(&self) -> &Arc<dyn Pacer> {
        &self.pacer
    }

    /// Fail fast when the upstream session cannot issue requests.
    pub fn ensure_ready(&self) -> Result<()> {
        if !self.pages.is_ready() {
            return Err(AppError::not_ready("page fetcher is not initialized"));
        }
        if !self.contents.is_ready() {
            return Err(AppError::not_ready("content fetcher is not initialized"));
        }
        Ok(())
    }

    /// Up to `max_articles` of the most recent articles, whatever their date.
    pub async fn crawl_history(&self, source: &str, max_articles: usize) -> Result<CrawlReport> {
        let request = CrawlRequest::history(max_articles, self.max_attempts);
        self.crawl(source, &request).await
    }

    /// Crawl `source` until one of the stop conditions holds.
    ///
    /// Only malformed requests and a missing session are errors; upstream
    /// failures are retried within the budget and end the crawl with
    /// [`CrawlOutcome::MaxAttemptsExceeded`], keeping what was collected.
    pub async fn crawl(&self, source: &str, request: &CrawlRequest) -> Result<CrawlReport> {
        let source = source.trim();
        if source.is_empty() {
            return Err(AppError::validation("source identifier is empty"));
        }
        request.validate()?;
        self.ensure_ready()?;

        info!("Crawling '{}' (target {})", source, request.target);
        let mut run = CrawlRun::default();
        self.pacer.pause(Pause::BeforeSource).await;

        let outcome = loop {
            if run.articles.len() >= request.target {
                break CrawlOutcome::Completed;
            }
            if let Some(stop) = run.stop {
                break stop;
            }
            if self.cancel.is_cancelled() {
                break CrawlOutcome::Cancelled;
            }
            if run.attempts >= request.max_attempts {
                break CrawlOutcome::MaxAttemptsExceeded;
            }

            run.attempts += 1;
            let page = match self
                .pages
                .fetch_page(source, run.offset, self.page_size)
                .await
            {
                Ok(page) => {
                    run.consecutive_failures = 0;
                    page
                }
                Err(e) => {
                    run.consecutive_failures += 1;
                    run.failed_fetches += 1;
                    warn!(
                        "'{}': page fetch at offset {} failed ({}/{}): {}",
                        source, run.offset, run.attempts, request.max_attempts, e
                    );
                    if run.attempts < request.max_attempts {
                        self.pacer
                            .pause(Pause::Backoff {
                                failures: run.consecutive_failures,
                            })
                            .await;
                    }
                    continue;
                }
            };

            if page.is_empty() {
                run.empty_streak += 1;
                debug!(
                    "'{}': empty page at offset {} ({}/{})",
                    source, run.offset, run.empty_streak, self.empty_page_limit
                );
                if run.empty_streak >= self.empty_page_limit {
                    break CrawlOutcome::Exhausted;
                }
                run.offset += self.policy.delta(PageOutcome::Empty);
                self.pacer.pause(Pause::EmptyPage).await;
                continue;
            }
            run.empty_streak = 0;

            let accepted = self.process_page(source, &page, request, &mut run).await;
            let page_outcome = if accepted > 0 {
                PageOutcome::Accepted
            } else {
                PageOutcome::NoneAccepted
            };
            run.offset += self.policy.delta(page_outcome);

            if run.stop.is_none() && run.articles.len() < request.target {
                self.pacer
                    .pause(Pause::BetweenPages {
                        progressed: accepted > 0,
                        failures: run.failed_fetches,
                    })
                    .await;
            }
        };

        info!(
            "'{}': {} article(s), {} after {} attempt(s)",
            source,
            run.articles.len(),
            outcome,
            run.attempts
        );
        Ok(run.into_report(source, outcome))
    }

    /// Resolve and filter the items of one page. Returns how many were accepted.
    async fn process_page(
        &self,
        source: &str,
        page: &[RawItem],
        request: &CrawlRequest,
        run: &mut CrawlRun,
    ) -> usize {
        let mut accepted = 0;

        for item in page {
            if self.cancel.is_cancelled() {
                run.stop = Some(CrawlOutcome::Cancelled);
                break;
            }
            if !item.has_link() {
                debug!("'{}': skipping entry without link: {}", source, item.title());
                continue;
            }
            let link = item.link();
            if run.seen.contains(link) || run.skipped.contains(link) {
                continue;
            }

            self.pacer.pause(Pause::BeforeContent).await;
            let content = match self.contents.fetch_content(link).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("'{}': skipping {}: {}", source, link, e);
                    continue;
                }
            };

            match self.judge(content.published, request, run) {
                Verdict::Accept => {}
                Verdict::Skip => {
                    debug!(
                        "'{}': {} dated {} is outside the window",
                        source, link, content.published
                    );
                    run.skipped.insert(link.to_string());
                    continue;
                }
                Verdict::Stop(outcome) => {
                    info!(
                        "'{}': {} dated {} ends the crawl ({})",
                        source, link, content.published, outcome
                    );
                    run.stop = Some(outcome);
                    break;
                }
            }

            run.seen.insert(link.to_string());
            run.articles.push(Article {
                source: source.to_string(),
                title: item.title().to_string(),
                link: link.to_string(),
                raw_time: content.raw_time,
                published: content.published,
                content_length: None,
                keyword_counts: None,
                score: 0.0,
            });
            accepted += 1;
            info!(
                "'{}' [{}/{}] {} ({})",
                source,
                run.articles.len(),
                request.target,
                item.title(),
                content.published
            );

            if run.articles.len() >= request.target {
                break;
            }
        }

        accepted
    }

    fn judge(&self, published: NaiveDate, request: &CrawlRequest, run: &mut CrawlRun) -> Verdict {
        if let Some(accept) = &request.accept {
            if !accept(published) {
                return self.reject(request, run);
            }
        }
        if let Some(window) = &request.window {
            if !window.contains(published) {
                if request.stop_on_out_of_window {
                    return self.reject(request, run);
                }
                if window.is_before(published) && !run.articles.is_empty() {
                    return Verdict::Stop(CrawlOutcome::WindowPassed);
                }
                return Verdict::Skip;
            }
        }
        Verdict::Accept
    }

    /// Count a rejected item and decide whether it ends the crawl.
    fn reject(&self, request: &CrawlRequest, run: &mut CrawlRun) -> Verdict {
        if !request.stop_on_out_of_window {
            return Verdict::Skip;
        }
        run.rejected += 1;
        if run.rejected > request.out_of_window_tolerance {
            Verdict::Stop(CrawlOutcome::OutOfWindowStop)
        } else {
            Verdict::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::NoPacer;
    use crate::testing::{
        FeedBuilder, MapContents, RecordingPacer, ScriptedPages, date, days_ago, link,
    };

    const SOURCE: &str = "acct";

    fn today() -> NaiveDate {
        date(2026, 3, 10)
    }

    fn config() -> CrawlerConfig {
        CrawlerConfig::default()
    }

    fn crawler(pages: Arc<ScriptedPages>, contents: MapContents) -> PaginationCrawler {
        PaginationCrawler::new(pages, Arc::new(contents), Arc::new(NoPacer), &config())
    }

    fn links(report: &CrawlReport) -> Vec<String> {
        report.articles.iter().map(|a| a.link.clone()).collect()
    }

    fn assert_unique(report: &CrawlReport) {
        let unique: HashSet<_> = report.articles.iter().map(|a| &a.link).collect();
        assert_eq!(unique.len(), report.articles.len());
    }

    #[tokio::test]
    async fn test_completes_with_exact_target() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .articles(20, today())
            .build();
        let pages = Arc::new(ScriptedPages::new().with_feed(SOURCE, feed));
        let request = CrawlRequest::recent(7, 10, DateWindow::recent(today(), 2));

        let report = crawler(pages.clone(), contents)
            .crawl(SOURCE, &request)
            .await
            .unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Completed);
        assert_eq!(report.articles.len(), 7);
        assert_unique(&report);
        let expected: Vec<_> = (0..7).map(|i| link(SOURCE, i)).collect();
        assert_eq!(links(&report), expected);
        // half-page advance on progress
        assert_eq!(pages.offsets(SOURCE), vec![0, 2]);
    }

    #[tokio::test]
    async fn test_exhausted_after_empty_pages() {
        let pages = Arc::new(ScriptedPages::new());
        let report = crawler(pages.clone(), MapContents::new())
            .crawl_history(SOURCE, 10)
            .await
            .unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert!(report.articles.is_empty());
        assert_eq!(report.attempts, 3);
        assert_eq!(pages.offsets(SOURCE), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_stops_at_first_out_of_window_item() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .articles(4, today())
            .article(days_ago(today(), 10))
            .articles(5, today())
            .build();
        let pages = Arc::new(ScriptedPages::new().with_feed(SOURCE, feed));
        let request = CrawlRequest::recent(10, 10, DateWindow::recent(today(), 2));

        let report = crawler(pages, contents).crawl(SOURCE, &request).await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::OutOfWindowStop);
        let expected: Vec<_> = (0..4).map(|i| link(SOURCE, i)).collect();
        assert_eq!(links(&report), expected);
    }

    #[tokio::test]
    async fn test_tolerance_skips_stray_items() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .article(today())
            .article(days_ago(today(), 30))
            .articles(2, today())
            .article(days_ago(today(), 30))
            .articles(3, today())
            .build();
        let pages = Arc::new(ScriptedPages::new().with_feed(SOURCE, feed));
        let request =
            CrawlRequest::recent(10, 10, DateWindow::recent(today(), 2)).with_tolerance(1);

        let report = crawler(pages, contents).crawl(SOURCE, &request).await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::OutOfWindowStop);
        assert_eq!(
            links(&report),
            vec![link(SOURCE, 0), link(SOURCE, 2), link(SOURCE, 3)]
        );
    }

    #[tokio::test]
    async fn test_tolerated_item_on_overlapping_pages_counts_once() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .articles(4, today())
            .article(days_ago(today(), 30))
            .articles(5, today())
            .build();
        let pages = Arc::new(ScriptedPages::new().with_feed(SOURCE, feed));
        let request =
            CrawlRequest::recent(20, 10, DateWindow::recent(today(), 2)).with_tolerance(1);

        let contents = Arc::new(contents);
        let crawler =
            PaginationCrawler::new(pages.clone(), contents.clone(), Arc::new(NoPacer), &config());

        let report = crawler.crawl(SOURCE, &request).await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        let expected: Vec<_> = (0..10).filter(|&i| i != 4).map(|i| link(SOURCE, i)).collect();
        assert_eq!(links(&report), expected);
        let stray = link(SOURCE, 4);
        assert_eq!(contents.calls().iter().filter(|l| **l == stray).count(), 1);
        // pages at 0, 2 and 4 all contain the stray item
        assert_eq!(pages.offsets(SOURCE), vec![0, 2, 4, 6, 8, 9, 10, 11, 12]);
    }

    #[tokio::test]
    async fn test_window_passed_without_stop() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .article(days_ago(today(), 9))
            .article(today())
            .article(date(2026, 3, 12))
            .article(days_ago(today(), 1))
            .article(days_ago(today(), 5))
            .articles(3, today())
            .build();
        let pages = Arc::new(ScriptedPages::new().with_feed(SOURCE, feed));
        let request = CrawlRequest::recent(10, 10, DateWindow::recent(today(), 2))
            .with_stop_on_out_of_window(false);

        let report = crawler(pages, contents).crawl(SOURCE, &request).await.unwrap();

        // the stale lead item is skipped, the future one too
        assert_eq!(report.outcome, CrawlOutcome::WindowPassed);
        assert_eq!(links(&report), vec![link(SOURCE, 1), link(SOURCE, 3)]);
        let window = DateWindow::recent(today(), 2);
        assert!(report.articles.iter().all(|a| window.contains(a.published)));
    }

    #[tokio::test]
    async fn test_accept_predicate() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .article(today())
            .article(days_ago(today(), 3))
            .article(today())
            .build();
        let pages = Arc::new(ScriptedPages::new().with_feed(SOURCE, feed));
        let cutoff = days_ago(today(), 1);
        let request = CrawlRequest::history(5, 10).with_accept(move |d| d >= cutoff);

        let report = crawler(pages, contents).crawl(SOURCE, &request).await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(links(&report), vec![link(SOURCE, 0), link(SOURCE, 2)]);
    }

    #[tokio::test]
    async fn test_duplicates_are_never_returned() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .articles(3, today())
            .repeat(1)
            .repeat(0)
            .articles(4, today())
            .build();
        let pages = Arc::new(ScriptedPages::new().with_feed(SOURCE, feed));

        let report = crawler(pages, contents)
            .crawl_history(SOURCE, 20)
            .await
            .unwrap();

        assert_unique(&report);
        assert_eq!(report.articles.len(), 7);
        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
    }

    #[tokio::test]
    async fn test_offset_advances_by_one_without_progress() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .articles(5, today())
            .build();
        // second call comes back empty, then the feed resumes
        let pages = Arc::new(ScriptedPages::new().with_feed(SOURCE, feed).empty_call(1));

        let report = crawler(pages.clone(), contents)
            .crawl_history(SOURCE, 20)
            .await
            .unwrap();

        assert_eq!(report.articles.len(), 5);
        // 0: five new (+2), 2: empty (+1), 3: duplicates only (+1), 4: (+1), 5..: empty
        assert_eq!(pages.offsets(SOURCE), vec![0, 2, 3, 4, 5, 6, 7]);
        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
    }

    #[tokio::test]
    async fn test_retries_failed_fetch_at_same_offset() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .articles(3, today())
            .build();
        let pages = Arc::new(
            ScriptedPages::new()
                .with_feed(SOURCE, feed)
                .failing_call(0)
                .failing_call(1),
        );
        let pacer = Arc::new(RecordingPacer::new());
        let crawler = PaginationCrawler::new(
            pages.clone(),
            Arc::new(contents),
            pacer.clone(),
            &config(),
        );

        let report = crawler.crawl_history(SOURCE, 3).await.unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Completed);
        assert_eq!(report.attempts, 3);
        assert_eq!(pages.offsets(SOURCE), vec![0, 0, 0]);
        let backoffs: Vec<_> = pacer
            .pauses()
            .into_iter()
            .filter(|p| matches!(p, Pause::Backoff { .. }))
            .collect();
        assert_eq!(
            backoffs,
            vec![Pause::Backoff { failures: 1 }, Pause::Backoff { failures: 2 }]
        );
        assert_eq!(pacer.pauses()[0], Pause::BeforeSource);
    }

    #[tokio::test]
    async fn test_max_attempts_exceeded() {
        let pages = Arc::new(ScriptedPages::new().failing_source(SOURCE));
        let pacer = Arc::new(RecordingPacer::new());
        let crawler = PaginationCrawler::new(
            pages.clone(),
            Arc::new(MapContents::new()),
            pacer.clone(),
            &config(),
        );

        let report = crawler
            .crawl(SOURCE, &CrawlRequest::history(5, 4))
            .await
            .unwrap();

        assert_eq!(report.outcome, CrawlOutcome::MaxAttemptsExceeded);
        assert!(report.articles.is_empty());
        assert_eq!(pages.calls().len(), 4);
        // no backoff once the budget is spent
        assert_eq!(pacer.count(|p| matches!(p, Pause::Backoff { .. })), 3);
    }

    #[tokio::test]
    async fn test_partial_results_survive_budget_exhaustion() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .articles(10, today())
            .build();
        let pages = Arc::new(
            ScriptedPages::new()
                .with_feed(SOURCE, feed)
                .failing_call(1)
                .failing_call(2),
        );

        let report = crawler(pages, contents)
            .crawl(SOURCE, &CrawlRequest::history(10, 3))
            .await
            .unwrap();

        assert_eq!(report.outcome, CrawlOutcome::MaxAttemptsExceeded);
        assert_eq!(report.articles.len(), 5);
        assert!(!report.outcome.is_success());
    }

    #[tokio::test]
    async fn test_unresolvable_items_are_skipped() {
        let mut contents = MapContents::new();
        let mut feed = FeedBuilder::new(SOURCE, &mut contents)
            .article(today())
            .unresolvable()
            .article(today())
            .build();
        feed.insert(1, RawItem::default());
        let pages = Arc::new(ScriptedPages::new().with_feed(SOURCE, feed));

        let report = crawler(pages, contents)
            .crawl_history(SOURCE, 5)
            .await
            .unwrap();

        assert_eq!(links(&report), vec![link(SOURCE, 0), link(SOURCE, 2)]);
        assert_eq!(report.articles[0].title, format!("{} #0", SOURCE));
    }

    #[tokio::test]
    async fn test_cancellation_between_pages() {
        let mut contents = MapContents::new();
        let feed = FeedBuilder::new(SOURCE, &mut contents)
            .articles(2, today())
            .build();
        let token = CancellationToken::new();
        let pages = Arc::new(
            ScriptedPages::new()
                .with_feed(SOURCE, feed)
                .empty_call(0)
                .cancel_after(1, token.clone()),
        );

        let report = crawler(pages.clone(), contents)
            .with_cancellation(token)
            .crawl_history(SOURCE, 5)
            .await
            .unwrap();

        assert_eq!(report.outcome, CrawlOutcome::Cancelled);
        assert_eq!(pages.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_not_ready_fails_before_any_call() {
        let pages = Arc::new(ScriptedPages::new().not_ready());
        let result = crawler(pages.clone(), MapContents::new())
            .crawl_history(SOURCE, 5)
            .await;

        assert!(matches!(result, Err(AppError::NotReady(_))));
        assert!(pages.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_requests() {
        let pages = Arc::new(ScriptedPages::new());
        let crawler = crawler(pages.clone(), MapContents::new());

        assert!(matches!(
            crawler.crawl("  ", &CrawlRequest::history(5, 3)).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            crawler.crawl(SOURCE, &CrawlRequest::history(0, 3)).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            crawler.crawl(SOURCE, &CrawlRequest::history(5, 0)).await,
            Err(AppError::Validation(_))
        ));
        assert!(pages.calls().is_empty());
    }
}
