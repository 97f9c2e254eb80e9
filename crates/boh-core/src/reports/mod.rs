//! Quarterly reporting.
//!
//! A report is always described by one [`ReportFilter`]: year, quarter
//! selector and chapter selector. The dues preview, the print document and
//! the backend CSV query are all derived from the same filter value, so the
//! on-screen preview and a downloaded CSV for the same filter agree on the
//! month columns and on which members appear in which order.
//!
//! - `window`: quarter selector → month indices and labels
//! - `dues`: status → glyph / print class mapping
//! - `ordering`: chapter filter and report sort order
//! - `preview`: dues preview table and standalone print document
//! - `export`: backend CSV queries, filenames and atomic file writes
//! - `attendance`: attendance tallies and meeting windowing

pub mod attendance;
pub mod dues;
pub mod export;
pub mod ordering;
pub mod preview;
pub mod window;

pub use attendance::{AttendanceTally, MeetingSummary};
pub use dues::StatusStyle;
pub use export::{ReportKind, ReportQuery};
pub use ordering::{report_order, sort_for_report};
pub use preview::{DuesPreview, PreviewRow};
pub use window::{QuarterSelector, MONTH_NAMES};

use chrono::{Datelike, NaiveDate};

use crate::models::ChapterFilter;

/// Number of years offered in the year selector, counting the current one.
pub const YEAR_CHOICES: i32 = 11;

/// The filter tuple shared by preview, print and CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    pub year: i32,
    pub quarter: QuarterSelector,
    pub chapter: ChapterFilter,
}

impl ReportFilter {
    /// Default filter for a given day: that year, that quarter, all chapters.
    pub fn for_date(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            quarter: QuarterSelector::containing(today),
            chapter: ChapterFilter::All,
        }
    }

    /// Year as the string key used in member dues maps and query strings.
    pub fn year_key(&self) -> String {
        self.year.to_string()
    }

    pub fn months(&self) -> Vec<usize> {
        self.quarter.months()
    }

    /// "Q2 (Apr-Jun) 2024"
    pub fn period_label(&self) -> String {
        format!("{} {}", self.quarter.label(), self.year)
    }
}

/// Years offered in the selector: this year and the ten before it, newest first.
pub fn year_choices(current_year: i32) -> Vec<i32> {
    (0..YEAR_CHOICES).map(|i| current_year - i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_date() {
        let filter = ReportFilter::for_date(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
        assert_eq!(filter.year, 2024);
        assert_eq!(filter.quarter, QuarterSelector::Q2);
        assert_eq!(filter.chapter, ChapterFilter::All);
        assert_eq!(filter.period_label(), "Q2 (Apr-Jun) 2024");
    }

    #[test]
    fn test_year_choices() {
        let years = year_choices(2026);
        assert_eq!(years.len(), 11);
        assert_eq!(years.first(), Some(&2026));
        assert_eq!(years.last(), Some(&2016));
    }
}
