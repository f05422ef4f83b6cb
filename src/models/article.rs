//! Article data structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder title for feed entries that carry none.
pub const UNTITLED: &str = "(untitled)";

/// Placeholder link for feed entries that carry none.
pub const NO_LINK: &str = "(no link)";

/// A feed entry exactly as one page of the upstream API returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub link: Option<String>,
}

impl RawItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            link: Some(link.into()),
        }
    }

    /// Title, or [`UNTITLED`] when missing or blank.
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
    }

    /// Link, or [`NO_LINK`] when missing or blank.
    pub fn link(&self) -> &str {
        self.link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(NO_LINK)
    }

    /// Whether the entry carries a usable link.
    pub fn has_link(&self) -> bool {
        self.link() != NO_LINK
    }
}

/// Occurrence count of one keyword in an article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// An accepted article.
///
/// Identity is the link, scoped to the source it was harvested from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Account the article was harvested from
    pub source: String,

    /// Article title
    pub title: String,

    /// Full URL to the article
    pub link: String,

    /// Publish time exactly as found on the page
    pub raw_time: String,

    /// Calendar date derived from `raw_time`
    pub published: NaiveDate,

    /// Body length in characters, set by scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,

    /// Per-keyword counts in keyword order, set by scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_counts: Option<Vec<KeywordCount>>,

    /// Weighted keyword score
    #[serde(default)]
    pub score: f64,
}

impl Article {
    /// Count for a keyword, if this article has been scored.
    pub fn count_of(&self, keyword: &str) -> Option<usize> {
        self.keyword_counts
            .as_ref()?
            .iter()
            .find(|kc| kc.keyword == keyword)
            .map(|kc| kc.count)
    }

    /// Format article for display using a template.
    ///
    /// Supported placeholders:
    /// - `{source}`, `{title}`, `{link}`, `{date}`, `{time}`, `{score}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{source}", &self.source)
            .replace("{title}", &self.title)
            .replace("{link}", &self.link)
            .replace("{date}", &self.published.format("%Y-%m-%d").to_string())
            .replace("{time}", &self.raw_time)
            .replace("{score}", &format!("{:.2}", self.score))
    }
}
