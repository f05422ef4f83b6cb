//! Harvesting pipeline.
//!
//! - `PaginationCrawler`: one source, page by page, within a date window
//! - `KeywordScorer`: weighted keyword ranking of a batch
//! - `BatchOrchestrator`: many sources, aggregated stats, optional ranking

mod batch;
mod crawl;
mod filter;
mod offset;
mod pacing;
mod score;
mod window;

pub use batch::{BatchOrchestrator, BatchOutput};
pub use crawl::{AcceptFn, CrawlRequest, PaginationCrawler};
pub use filter::{FilterResult, filter_existing};
pub use offset::{OffsetPolicy, PageOutcome};
pub use pacing::{JitteredPacer, NoPacer, Pacer, Pause};
pub use score::{KeywordScorer, score_text, sort_by_score};
pub use window::DateWindow;
