//! Offset advancement policy.
//!
//! The upstream feed is offset-based and unreliable near page boundaries:
//! pages can be silently trimmed, shifted by newly published items, or come
//! back empty. The crawler therefore never jumps a full page. After a page
//! that produced new articles it advances by half a page, keeping an
//! overlap that dedup absorbs; after an empty page or a page with nothing
//! new it advances by one, probing for a single skipped item.

/// What a processed page yielded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// At least one article was newly accepted
    Accepted,
    /// Items came back but none was accepted (duplicates or filtered)
    NoneAccepted,
    /// No items came back
    Empty,
}

/// Table mapping a page outcome to an offset delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetPolicy {
    pub on_accepted: usize,
    pub on_none_accepted: usize,
    pub on_empty: usize,
}

impl OffsetPolicy {
    /// Half-page overlap on progress, single steps otherwise.
    pub fn for_page_size(page_size: usize) -> Self {
        Self {
            on_accepted: (page_size / 2).max(1),
            on_none_accepted: 1,
            on_empty: 1,
        }
    }

    pub fn delta(&self, outcome: PageOutcome) -> usize {
        match outcome {
            PageOutcome::Accepted => self.on_accepted,
            PageOutcome::NoneAccepted => self.on_none_accepted,
            PageOutcome::Empty => self.on_empty,
        }
    }
}
