// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod article;
mod config;
mod keyword;
mod stats;

// Re-export all public types
pub use article::{Article, KeywordCount, NO_LINK, RawItem, UNTITLED};
pub use config::{
    ApiConfig, COOKIE_ENV, Config, ContentConfig, CrawlerConfig, DelayRange, LoggingConfig,
    PacingConfig, PathsConfig, ScoringConfig, TOKEN_ENV,
};
pub use keyword::{KeywordSpec, MAX_KEYWORDS, WeightedKeyword};
pub use stats::{BatchStats, CrawlOutcome, CrawlReport, SourceReport};
