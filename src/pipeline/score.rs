// src/pipeline/score.rs

//! Weighted keyword scoring and ranking.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::{Article, KeywordCount, KeywordSpec, ScoringConfig};
use crate::pipeline::{Pacer, Pause};
use crate::services::ContentFetcher;

/// Count case-insensitive, non-overlapping occurrences of every keyword
/// in `text` and combine them into a weighted score.
pub fn score_text(text: &str, spec: &KeywordSpec) -> (Vec<KeywordCount>, f64) {
    let haystack = text.to_lowercase();
    let mut score = 0.0;
    let counts = spec
        .entries()
        .iter()
        .map(|entry| {
            let needle = entry.keyword.to_lowercase();
            let count = haystack.matches(needle.as_str()).count();
            score += count as f64 * entry.weight;
            KeywordCount {
                keyword: entry.keyword.clone(),
                count,
            }
        })
        .collect();
    (counts, score)
}

/// Stable sort by score, highest first.
pub fn sort_by_score(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Fetches article bodies and ranks articles by keyword relevance.
#[derive(Clone)]
pub struct KeywordScorer {
    contents: Arc<dyn ContentFetcher>,
    pacer: Arc<dyn Pacer>,
    max_keywords: usize,
    max_concurrent: usize,
    cancel: CancellationToken,
}

impl KeywordScorer {
    pub fn new(
        contents: Arc<dyn ContentFetcher>,
        pacer: Arc<dyn Pacer>,
        config: &ScoringConfig,
    ) -> Self {
        Self {
            contents,
            pacer,
            max_keywords: config.max_keywords,
            max_concurrent: config.max_concurrent.max(1),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Fail fast when article bodies cannot be fetched.
    pub fn ensure_ready(&self) -> Result<()> {
        if !self.contents.is_ready() {
            return Err(AppError::not_ready("content fetcher is not initialized"));
        }
        Ok(())
    }

    /// Build the keyword specification this scorer honors.
    pub fn spec(&self, keywords: &[String], weights: &[f64]) -> Result<KeywordSpec> {
        KeywordSpec::new(keywords, weights, self.max_keywords)
    }

    /// Score and rank `articles` against `keywords`/`weights`.
    ///
    /// Malformed keyword input fails before any content is fetched.
    pub async fn score(
        &self,
        articles: Vec<Article>,
        keywords: &[String],
        weights: &[f64],
    ) -> Result<Vec<Article>> {
        let spec = self.spec(keywords, weights)?;
        self.rank(articles, &spec).await
    }

    /// Score every article and return them ordered by score, descending.
    ///
    /// Articles whose body cannot be fetched score zero. Equal scores keep
    /// their input order whatever order the fetches complete in.
    pub async fn rank(&self, articles: Vec<Article>, spec: &KeywordSpec) -> Result<Vec<Article>> {
        self.ensure_ready()?;
        if articles.is_empty() {
            return Ok(articles);
        }
        info!(
            "Scoring {} article(s) by {}",
            articles.len(),
            spec.describe()
        );

        let total = articles.len();
        let mut ranked: Vec<Article> = stream::iter(articles.into_iter().enumerate())
            .map(|(i, article)| async move {
                if i > 0 {
                    self.pacer.pause(Pause::BetweenItems).await;
                }
                self.score_one(article, spec, i + 1, total).await
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        sort_by_score(&mut ranked);
        Ok(ranked)
    }

    async fn score_one(
        &self,
        mut article: Article,
        spec: &KeywordSpec,
        position: usize,
        total: usize,
    ) -> Article {
        let text = if self.cancel.is_cancelled() {
            debug!("Scoring cancelled, {} left unscored", article.link);
            String::new()
        } else {
            match self.contents.fetch_text(&article.link).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Could not fetch {} for scoring: {}", article.link, e);
                    String::new()
                }
            }
        };

        let (counts, score) = score_text(&text, spec);
        article.content_length = Some(text.chars().count());
        article.keyword_counts = Some(counts);
        article.score = score;
        debug!(
            "[{}/{}] {} scored {:.2}",
            position, total, article.title, article.score
        );
        article
    }
}
