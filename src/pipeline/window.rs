//! Calendar date windows.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

/// A set of calendar dates an article must fall on to be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    dates: BTreeSet<NaiveDate>,
}

impl DateWindow {
    /// The last `days` dates ending at `today`, today included.
    ///
    /// `days == 0` yields an empty window that accepts nothing.
    pub fn recent(today: NaiveDate, days: u32) -> Self {
        let dates = (0..days as u64)
            .filter_map(|i| today.checked_sub_days(Days::new(i)))
            .collect();
        Self { dates }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn earliest(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Whether `date` lies before every date of the window.
    pub fn is_before(&self, date: NaiveDate) -> bool {
        self.earliest().is_some_and(|earliest| date < earliest)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
