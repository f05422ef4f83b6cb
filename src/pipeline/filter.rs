//! Cross-run deduplication against an earlier report.
//!
//! Articles are matched by title, since the upstream feed can hand out
//! different links for the same article across days.

use std::collections::HashSet;

use crate::models::Article;

/// Result of filtering a batch against previously reported titles.
#[derive(Debug, Clone, Default)]
pub struct FilterResult {
    /// Articles not seen in the earlier report, input order kept
    pub fresh: Vec<Article>,
    /// Titles that were dropped
    pub dropped: Vec<String>,
}

impl FilterResult {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Drop every article whose title already appeared in `previous_titles`.
pub fn filter_existing(articles: Vec<Article>, previous_titles: &HashSet<String>) -> FilterResult {
    if previous_titles.is_empty() {
        return FilterResult {
            fresh: articles,
            dropped: Vec::new(),
        };
    }

    let (fresh, stale): (Vec<Article>, Vec<Article>) = articles
        .into_iter()
        .partition(|a| !previous_titles.contains(a.title.trim()));

    for article in &stale {
        log::debug!("Already reported: {}", article.title);
    }

    FilterResult {
        fresh,
        dropped: stale.into_iter().map(|a| a.title).collect(),
    }
}
