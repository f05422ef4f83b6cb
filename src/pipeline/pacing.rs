//! Request pacing.
//!
//! Every wait between upstream calls goes through a [`Pacer`], so the
//! crawl and scoring loops never sleep inline. Production uses
//! [`JitteredPacer`]; tests inject [`NoPacer`] or a recording pacer.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::models::{DelayRange, PacingConfig};

/// Doublings applied at most by the error backoff.
const MAX_BACKOFF_DOUBLINGS: u32 = 6;

/// Consecutive failures that still slow down inter-page pauses.
const MAX_FAILURE_SLOWDOWN: u32 = 4;

/// The point in a run at which a wait is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// Before the first page of a source
    BeforeSource,
    /// After a processed page
    BetweenPages { progressed: bool, failures: u32 },
    /// After an empty page, before probing the next offset
    EmptyPage,
    /// After a failed fetch; `failures` counts consecutive failures (>= 1)
    Backoff { failures: u32 },
    /// Before resolving one article's page
    BeforeContent,
    /// Between two content fetches of a scoring batch
    BetweenItems,
    /// Between two sources of a batch
    BetweenSources,
}

/// Rate limiter shared by everything that calls upstream.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, pause: Pause);
}

/// Pacer that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self, _pause: Pause) {}
}

/// Sleeps for a random duration drawn from the configured range of each
/// pause kind. A cancelled run cuts any sleep short.
#[derive(Debug, Clone)]
pub struct JitteredPacer {
    config: PacingConfig,
    cancel: CancellationToken,
}

impl JitteredPacer {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Millisecond range a pause is drawn from, after scaling.
    pub fn range_for(&self, pause: Pause) -> DelayRange {
        let c = &self.config;
        match pause {
            Pause::BeforeSource => c.before_source,
            Pause::BetweenPages {
                progressed,
                failures,
            } => {
                let idle = if progressed { 1.0 } else { c.idle_factor };
                let slowdown = 1.0 + 0.5 * failures.min(MAX_FAILURE_SLOWDOWN) as f64;
                scale(c.between_pages, idle * slowdown)
            }
            Pause::EmptyPage => c.empty_page,
            Pause::Backoff { failures } => {
                let doublings = failures.saturating_sub(1).min(MAX_BACKOFF_DOUBLINGS);
                let factor = (1u64 << doublings) as f64;
                let range = scale(c.backoff, factor);
                DelayRange::new(
                    range.min_ms.min(c.max_backoff_ms),
                    range.max_ms.min(c.max_backoff_ms),
                )
            }
            Pause::BeforeContent => c.before_content,
            Pause::BetweenItems => c.between_items,
            Pause::BetweenSources => c.between_sources,
        }
    }

    /// Draw a concrete delay for a pause.
    pub fn delay_for(&self, pause: Pause) -> Duration {
        let range = self.range_for(pause);
        let ms = if range.max_ms <= range.min_ms {
            range.min_ms
        } else {
            rand::rng().random_range(range.min_ms..=range.max_ms)
        };
        Duration::from_millis(ms)
    }
}

fn scale(range: DelayRange, factor: f64) -> DelayRange {
    DelayRange::new(
        (range.min_ms as f64 * factor).round() as u64,
        (range.max_ms as f64 * factor).round() as u64,
    )
}

#[async_trait]
impl Pacer for JitteredPacer {
    async fn pause(&self, pause: Pause) {
        if !self.config.enabled || self.cancel.is_cancelled() {
            return;
        }
        let delay = self.delay_for(pause);
        if delay.is_zero() {
            return;
        }
        log::debug!("Waiting {:.2}s ({:?})", delay.as_secs_f64(), pause);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = self.cancel.cancelled() => log::debug!("Wait cut short ({:?})", pause),
        }
    }
}
