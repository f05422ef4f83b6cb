//! Service layer: the upstream collaborators the pipeline talks to.
//!
//! - `PageFetcher`: one page of an account's article feed (`MpPageFetcher`)
//! - `ContentFetcher`: publish time and body text of one article
//!   (`HttpContentFetcher`)

mod content;
mod mp_client;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::RawItem;

pub use content::{HttpContentFetcher, extract_body_text, extract_publish_time, parse_publish_date};
pub use mp_client::MpPageFetcher;

/// Publish time and body text of one article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub published: NaiveDate,
    /// Time string exactly as found on the page
    pub raw_time: String,
    pub text: String,
}

/// Source of paginated feed entries.
///
/// Pages may come back short, empty, or overlapping with earlier pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Whether the session can issue requests at all.
    fn is_ready(&self) -> bool {
        true
    }

    /// Fetch up to `count` entries of `source` starting at zero-based `offset`.
    async fn fetch_page(&self, source: &str, offset: usize, count: usize) -> Result<Vec<RawItem>>;
}

/// Source of per-article content.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    fn is_ready(&self) -> bool {
        true
    }

    /// Fetch an article and resolve its publish date.
    ///
    /// Fails when the page cannot be fetched or no known date format matches.
    async fn fetch_content(&self, link: &str) -> Result<PageContent>;

    /// Fetch only the body text of an article.
    async fn fetch_text(&self, link: &str) -> Result<String> {
        self.fetch_content(link).await.map(|content| content.text)
    }
}
