// src/services/content.rs

//! Article page fetcher.
//!
//! Downloads an article page and extracts its body text and publish time
//! using configured CSS selectors.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::ContentConfig;
use crate::services::{ContentFetcher, PageContent};

/// Formats carrying a time of day, tried before the date-only ones.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y年%m月%d日 %H:%M"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y年%m月%d日"];

/// Patterns scanned for in the raw page when no time element matches.
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}",
        r"\d{4}-\d{2}-\d{2}",
        r"\d{4}年\d{1,2}月\d{1,2}日 \d{1,2}:\d{1,2}",
        r"\d{4}年\d{1,2}月\d{1,2}日",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Parse a publish time string in any of the supported formats.
pub fn parse_publish_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        })
}

/// Locate the publish time of an article page.
///
/// Time elements are consulted first; otherwise the raw page is scanned
/// for the first parseable date-like string.
pub fn extract_publish_time(html: &str, time_selectors: &[String]) -> Option<(NaiveDate, String)> {
    let document = Html::parse_document(html);
    for selector in parse_selectors(time_selectors) {
        if let Some(element) = document.select(&selector).next() {
            let raw: String = element.text().collect();
            let raw = raw.trim();
            if let Some(date) = parse_publish_date(raw) {
                return Some((date, raw.to_string()));
            }
        }
    }

    DATE_PATTERNS.iter().find_map(|pattern| {
        pattern.find_iter(html).find_map(|m| {
            parse_publish_date(m.as_str()).map(|date| (date, m.as_str().to_string()))
        })
    })
}

/// Extract the article body text, falling back to the whole page.
pub fn extract_body_text(html: &str, body_selectors: &[String]) -> String {
    let document = Html::parse_document(html);
    let body = parse_selectors(body_selectors)
        .into_iter()
        .find_map(|selector| document.select(&selector).next());

    let pieces: Vec<&str> = match body {
        Some(element) => element.text().collect(),
        None => document.root_element().text().collect(),
    };
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

fn parse_selectors(selectors: &[String]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(e) => {
                log::warn!("Ignoring invalid selector '{}': {:?}", s, e);
                None
            }
        })
        .collect()
}

/// Fetches article pages over HTTP.
pub struct HttpContentFetcher {
    client: Client,
    config: ContentConfig,
}

impl HttpContentFetcher {
    pub fn new(client: Client, config: ContentConfig) -> Self {
        Self { client, config }
    }

    async fn fetch_html(&self, link: &str) -> Result<String> {
        let response = self.client.get(link).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(link, format!("HTTP status {status}")));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_content(&self, link: &str) -> Result<PageContent> {
        let html = self.fetch_html(link).await?;
        let (published, raw_time) = extract_publish_time(&html, &self.config.time_selectors)
            .ok_or_else(|| AppError::parse(format!("No publish time found at {link}")))?;
        let text = extract_body_text(&html, &self.config.body_selectors);

        Ok(PageContent {
            published,
            raw_time,
            text,
        })
    }

    async fn fetch_text(&self, link: &str) -> Result<String> {
        let html = self.fetch_html(link).await?;
        Ok(extract_body_text(&html, &self.config.body_selectors))
    }
}
