//! In-memory collaborators shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::RawItem;
use crate::pipeline::{Pacer, Pause};
use crate::services::{ContentFetcher, PageContent, PageFetcher};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn days_ago(today: NaiveDate, n: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(n)).unwrap()
}

pub fn link(source: &str, i: usize) -> String {
    format!("https://mp.example.com/{}/{}", source, i)
}

/// Scripted upstream feed.
///
/// Each source serves a fixed list of entries sliced by offset. Call
/// numbers (zero-based, counted across all sources) can be scripted to
/// fail or to come back empty.
#[derive(Default)]
pub struct ScriptedPages {
    feeds: HashMap<String, Vec<RawItem>>,
    fail_calls: HashSet<usize>,
    empty_calls: HashSet<usize>,
    failing_sources: HashSet<String>,
    cancel_after: Option<(usize, CancellationToken)>,
    not_ready: bool,
    calls: Mutex<Vec<(String, usize)>>,
}

impl ScriptedPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, source: &str, items: Vec<RawItem>) -> Self {
        self.feeds.insert(source.to_string(), items);
        self
    }

    pub fn failing_call(mut self, call: usize) -> Self {
        self.fail_calls.insert(call);
        self
    }

    pub fn empty_call(mut self, call: usize) -> Self {
        self.empty_calls.insert(call);
        self
    }

    pub fn failing_source(mut self, source: &str) -> Self {
        self.failing_sources.insert(source.to_string());
        self
    }

    /// Cancel `token` once `calls` fetches have been served.
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn not_ready(mut self) -> Self {
        self.not_ready = true;
        self
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn offsets(&self, source: &str) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter(|(s, _)| s == source)
            .map(|(_, offset)| offset)
            .collect()
    }
}

#[async_trait]
impl PageFetcher for ScriptedPages {
    fn is_ready(&self) -> bool {
        !self.not_ready
    }

    async fn fetch_page(&self, source: &str, offset: usize, count: usize) -> Result<Vec<RawItem>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((source.to_string(), offset));
            calls.len() - 1
        };
        if let Some((after, token)) = &self.cancel_after {
            if call + 1 >= *after {
                token.cancel();
            }
        }
        if self.fail_calls.contains(&call) || self.failing_sources.contains(source) {
            return Err(AppError::upstream(source, "scripted failure"));
        }
        if self.empty_calls.contains(&call) {
            return Ok(Vec::new());
        }
        let feed = self.feeds.get(source).map(Vec::as_slice).unwrap_or(&[]);
        let start = offset.min(feed.len());
        let end = (offset + count).min(feed.len());
        Ok(feed[start..end].to_vec())
    }
}

/// Article pages keyed by link. Links without an entry fail to resolve.
#[derive(Default)]
pub struct MapContents {
    pages: HashMap<String, PageContent>,
    texts: HashMap<String, String>,
    not_ready: bool,
    calls: Mutex<Vec<String>>,
}

impl MapContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, link: &str, published: NaiveDate, text: &str) {
        self.pages.insert(
            link.to_string(),
            PageContent {
                published,
                raw_time: published.format("%Y-%m-%d").to_string(),
                text: text.to_string(),
            },
        );
    }

    pub fn not_ready(mut self) -> Self {
        self.not_ready = true;
        self
    }

    /// Body text that resolves for scoring but carries no date.
    pub fn insert_text(&mut self, link: &str, text: &str) {
        self.texts.insert(link.to_string(), text.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MapContents {
    fn is_ready(&self) -> bool {
        !self.not_ready
    }

    async fn fetch_content(&self, link: &str) -> Result<PageContent> {
        self.calls.lock().unwrap().push(link.to_string());
        self.pages
            .get(link)
            .cloned()
            .ok_or_else(|| AppError::parse(format!("No publish time found at {link}")))
    }

    async fn fetch_text(&self, link: &str) -> Result<String> {
        self.calls.lock().unwrap().push(link.to_string());
        self.texts
            .get(link)
            .cloned()
            .or_else(|| self.pages.get(link).map(|p| p.text.clone()))
            .ok_or_else(|| AppError::upstream(link, "HTTP status 404"))
    }
}

/// Builds a source's feed and the matching article pages in one go.
pub struct FeedBuilder<'a> {
    source: String,
    items: Vec<RawItem>,
    contents: &'a mut MapContents,
}

impl<'a> FeedBuilder<'a> {
    pub fn new(source: &str, contents: &'a mut MapContents) -> Self {
        Self {
            source: source.to_string(),
            items: Vec::new(),
            contents,
        }
    }

    /// Append an article dated `published`.
    pub fn article(mut self, published: NaiveDate) -> Self {
        let i = self.items.len();
        let l = link(&self.source, i);
        self.contents
            .insert(&l, published, &format!("body of {} #{}", self.source, i));
        self.items.push(RawItem::new(format!("{} #{}", self.source, i), l));
        self
    }

    /// Append `n` articles dated `published`.
    pub fn articles(mut self, n: usize, published: NaiveDate) -> Self {
        for _ in 0..n {
            self = self.article(published);
        }
        self
    }

    /// Append an entry whose page never resolves.
    pub fn unresolvable(mut self) -> Self {
        let i = self.items.len();
        self.items
            .push(RawItem::new(format!("{} #{}", self.source, i), link(&self.source, i)));
        self
    }

    /// Append an exact copy of an earlier entry.
    pub fn repeat(mut self, index: usize) -> Self {
        let item = self.items[index].clone();
        self.items.push(item);
        self
    }

    pub fn build(self) -> Vec<RawItem> {
        self.items
    }
}

/// Pacer that records every requested pause.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Pause>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Pause> {
        self.pauses.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Pause) -> bool) -> usize {
        self.pauses().iter().filter(|p| predicate(p)).count()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, pause: Pause) {
        self.pauses.lock().unwrap().push(pause);
    }
}
