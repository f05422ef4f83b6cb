//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `api.cookie`.
pub const COOKIE_ENV: &str = "HARVESTER_COOKIE";

/// Environment variable overriding `api.token`.
pub const TOKEN_ENV: &str = "HARVESTER_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pagination and retry behavior
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Randomized delays between upstream calls
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Keyword ranking settings
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Upstream API endpoint and session
    #[serde(default)]
    pub api: ApiConfig,

    /// Article page extraction rules
    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Replace credentials with values from the environment, when set.
    pub fn apply_env(&mut self) {
        if let Ok(cookie) = std::env::var(COOKIE_ENV) {
            self.api.cookie = cookie;
        }
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            self.api.token = token;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.page_size < 2 {
            return Err(AppError::validation("crawler.page_size must be >= 2"));
        }
        if self.crawler.max_attempts == 0 {
            return Err(AppError::validation("crawler.max_attempts must be > 0"));
        }
        if self.crawler.empty_page_limit == 0 {
            return Err(AppError::validation(
                "crawler.empty_page_limit must be > 0",
            ));
        }
        if self.crawler.max_concurrent_sources == 0 {
            return Err(AppError::validation(
                "crawler.max_concurrent_sources must be > 0",
            ));
        }
        if self.scoring.max_keywords == 0 {
            return Err(AppError::validation("scoring.max_keywords must be > 0"));
        }
        if self.scoring.max_concurrent == 0 {
            return Err(AppError::validation("scoring.max_concurrent must be > 0"));
        }
        if self.content.body_selectors.is_empty() {
            return Err(AppError::validation("No content.body_selectors defined"));
        }
        self.pacing.validate()?;
        url::Url::parse(&self.api.base_url)?;
        Ok(())
    }
}

/// Pagination and retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Items requested per page. Kept below upstream maxima so that a
    /// silently trimmed page loses as little as possible.
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Page fetch budget per source
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Consecutive empty pages treated as end of feed
    #[serde(default = "defaults::empty_page_limit")]
    pub empty_page_limit: u32,

    /// Articles wanted per source in batch mode
    #[serde(default = "defaults::articles_per_source")]
    pub articles_per_source: usize,

    /// Window length in days for batch mode (today included)
    #[serde(default = "defaults::recent_days")]
    pub recent_days: u32,

    /// Article cap for history mode
    #[serde(default = "defaults::history_max")]
    pub history_max: usize,

    /// Sources crawled at the same time
    #[serde(default = "defaults::max_concurrent_sources")]
    pub max_concurrent_sources: usize,

    /// Out-of-window items ignored before a stop is honored
    #[serde(default)]
    pub out_of_window_tolerance: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_size: defaults::page_size(),
            max_attempts: defaults::max_attempts(),
            empty_page_limit: defaults::empty_page_limit(),
            articles_per_source: defaults::articles_per_source(),
            recent_days: defaults::recent_days(),
            history_max: defaults::history_max(),
            max_concurrent_sources: defaults::max_concurrent_sources(),
            out_of_window_tolerance: 0,
        }
    }
}

/// Inclusive millisecond range a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }
}

/// Randomized delays between upstream calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Disable to run without any sleeping
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    #[serde(default = "defaults::before_source")]
    pub before_source: DelayRange,

    #[serde(default = "defaults::between_pages")]
    pub between_pages: DelayRange,

    /// Multiplier applied to `between_pages` after a page with no new article
    #[serde(default = "defaults::idle_factor")]
    pub idle_factor: f64,

    #[serde(default = "defaults::empty_page")]
    pub empty_page: DelayRange,

    /// First error backoff; doubles with every consecutive failure
    #[serde(default = "defaults::backoff")]
    pub backoff: DelayRange,

    #[serde(default = "defaults::max_backoff_ms")]
    pub max_backoff_ms: u64,

    #[serde(default = "defaults::before_content")]
    pub before_content: DelayRange,

    #[serde(default = "defaults::between_items")]
    pub between_items: DelayRange,

    #[serde(default = "defaults::between_sources")]
    pub between_sources: DelayRange,
}

impl PacingConfig {
    fn validate(&self) -> Result<()> {
        let ranges = [
            ("before_source", self.before_source),
            ("between_pages", self.between_pages),
            ("empty_page", self.empty_page),
            ("backoff", self.backoff),
            ("before_content", self.before_content),
            ("between_items", self.between_items),
            ("between_sources", self.between_sources),
        ];
        for (name, range) in ranges {
            if !range.is_valid() {
                return Err(AppError::validation(format!(
                    "pacing.{name}: min_ms must not exceed max_ms"
                )));
            }
        }
        if !self.idle_factor.is_finite() || self.idle_factor < 1.0 {
            return Err(AppError::validation("pacing.idle_factor must be >= 1"));
        }
        Ok(())
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            before_source: defaults::before_source(),
            between_pages: defaults::between_pages(),
            idle_factor: defaults::idle_factor(),
            empty_page: defaults::empty_page(),
            backoff: defaults::backoff(),
            max_backoff_ms: defaults::max_backoff_ms(),
            before_content: defaults::before_content(),
            between_items: defaults::between_items(),
            between_sources: defaults::between_sources(),
        }
    }
}

/// Keyword ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Keywords honored per ranking; the rest are dropped
    #[serde(default = "defaults::max_keywords")]
    pub max_keywords: usize,

    /// Content fetches in flight at the same time
    #[serde(default = "defaults::max_concurrent_fetches")]
    pub max_concurrent: usize,

    /// Keywords used when the command line gives none
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,

    #[serde(default = "defaults::weights")]
    pub weights: Vec<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_keywords: defaults::max_keywords(),
            max_concurrent: defaults::max_concurrent_fetches(),
            keywords: defaults::keywords(),
            weights: defaults::weights(),
        }
    }
}

/// Upstream API endpoint and session credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    #[serde(default)]
    pub cookie: String,

    #[serde(default)]
    pub token: String,
}

impl ApiConfig {
    /// Whether both halves of the session are present.
    pub fn has_credentials(&self) -> bool {
        !self.cookie.trim().is_empty() && !self.token.trim().is_empty()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            cookie: String::new(),
            token: String::new(),
        }
    }
}

// Keeps the cookie out of debug logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("cookie", &if self.cookie.is_empty() { "" } else { "***" })
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .finish()
    }
}

/// Article page extraction rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Selectors tried in order for the article body
    #[serde(default = "defaults::body_selectors")]
    pub body_selectors: Vec<String>,

    /// Selectors tried in order for the publish time element
    #[serde(default = "defaults::time_selectors")]
    pub time_selectors: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            body_selectors: defaults::body_selectors(),
            time_selectors: defaults::time_selectors(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding daily reports
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    /// Plain text file, one account name per line
    #[serde(default = "defaults::sources_file")]
    pub sources_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            sources_file: defaults::sources_file(),
        }
    }
}

mod defaults {
    use super::DelayRange;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn page_size() -> usize {
        5
    }
    pub fn max_attempts() -> u32 {
        10
    }
    pub fn empty_page_limit() -> u32 {
        3
    }
    pub fn articles_per_source() -> usize {
        10
    }
    pub fn recent_days() -> u32 {
        2
    }
    pub fn history_max() -> usize {
        100
    }
    pub fn max_concurrent_sources() -> usize {
        1
    }

    // Pacing defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn before_source() -> DelayRange {
        DelayRange::new(3_000, 8_000)
    }
    pub fn between_pages() -> DelayRange {
        DelayRange::new(5_000, 10_000)
    }
    pub fn idle_factor() -> f64 {
        1.5
    }
    pub fn empty_page() -> DelayRange {
        DelayRange::new(8_000, 15_000)
    }
    pub fn backoff() -> DelayRange {
        DelayRange::new(10_000, 15_000)
    }
    pub fn max_backoff_ms() -> u64 {
        120_000
    }
    pub fn before_content() -> DelayRange {
        DelayRange::new(1_000, 3_000)
    }
    pub fn between_items() -> DelayRange {
        DelayRange::new(2_000, 5_000)
    }
    pub fn between_sources() -> DelayRange {
        DelayRange::new(8_000, 15_000)
    }

    // Scoring defaults
    pub fn max_keywords() -> usize {
        3
    }
    pub fn max_concurrent_fetches() -> usize {
        1
    }
    pub fn keywords() -> Vec<String> {
        vec![
            "人工智能".to_string(),
            "数据科学".to_string(),
            "程序设计".to_string(),
        ]
    }
    pub fn weights() -> Vec<f64> {
        vec![1.5, 1.2, 1.0]
    }

    // API defaults
    pub fn base_url() -> String {
        "https://mp.weixin.qq.com".into()
    }

    // Content defaults
    pub fn body_selectors() -> Vec<String> {
        vec!["#js_content".into(), ".rich_media_content".into()]
    }
    pub fn time_selectors() -> Vec<String> {
        vec!["#publish_time".into(), ".publish_time".into()]
    }

    pub fn log_level() -> String {
        "info".into()
    }

    pub fn output_dir() -> String {
        "output".into()
    }
    pub fn sources_file() -> String {
        "sources.txt".into()
    }
}
