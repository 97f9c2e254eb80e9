//! Reports tab: filters, CSV downloads, dues preview and printing.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use tracing::info;

use boh_core::models::{ChapterFilter, Member};
use boh_core::reports::{export, year_choices, DuesPreview, ReportFilter, ReportKind, ReportQuery};
use boh_core::sync::Ticket;

use super::{App, Slot, TaskResult};
use crate::printing::{self, PrintOutcome};

/// Which filter the arrow keys change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    Year,
    Quarter,
    Chapter,
}

impl ReportField {
    pub fn next(&self) -> Self {
        match self {
            ReportField::Year => ReportField::Quarter,
            ReportField::Quarter => ReportField::Chapter,
            ReportField::Chapter => ReportField::Year,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ReportField::Year => ReportField::Chapter,
            ReportField::Quarter => ReportField::Year,
            ReportField::Chapter => ReportField::Quarter,
        }
    }
}

#[derive(Debug)]
pub struct ReportsState {
    /// Shared by preview, print and every CSV download.
    pub filter: ReportFilter,
    pub field: ReportField,
    /// Newest first.
    pub years: Vec<i32>,
    pub members: Vec<Member>,
    pub loading_members: bool,
    pub showing_preview: bool,
    pub preview: Option<DuesPreview>,
    pub downloading: Option<ReportKind>,
    pub printing: bool,
    pub scroll: usize,
}

impl ReportsState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            filter: ReportFilter::for_date(today),
            field: ReportField::Year,
            years: year_choices(today.year()),
            members: Vec::new(),
            loading_members: false,
            showing_preview: false,
            preview: None,
            downloading: None,
            printing: false,
            scroll: 0,
        }
    }

    /// Step the focused filter. `forward` moves right in the selector:
    /// older years, later quarters, the next chapter.
    pub fn adjust(&mut self, forward: bool) {
        match self.field {
            ReportField::Year => {
                let pos = self.years.iter().position(|y| *y == self.filter.year).unwrap_or(0);
                let pos = if forward {
                    (pos + 1).min(self.years.len().saturating_sub(1))
                } else {
                    pos.saturating_sub(1)
                };
                if let Some(year) = self.years.get(pos) {
                    self.filter.year = *year;
                }
            }
            ReportField::Quarter => {
                self.filter.quarter = if forward {
                    self.filter.quarter.next()
                } else {
                    self.filter.quarter.prev()
                };
            }
            ReportField::Chapter => {
                let choices = ChapterFilter::choices();
                let pos = choices.iter().position(|c| *c == self.filter.chapter).unwrap_or(0);
                let len = choices.len();
                let pos = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
                self.filter.chapter = choices[pos].clone();
            }
        }
        self.scroll = 0;
        self.rebuild_preview();
    }

    /// Re-derive the preview table from the members already loaded.
    fn rebuild_preview(&mut self) {
        if self.showing_preview && !self.loading_members {
            self.preview = Some(DuesPreview::build(&self.members, &self.filter));
        }
    }

    pub fn query(&self, kind: ReportKind) -> ReportQuery {
        ReportQuery::new(kind, self.filter.clone())
    }
}

impl App {
    /// Fetch a report CSV for the current filter into the export directory.
    pub fn download_report(&mut self, kind: ReportKind) {
        if self.reports.downloading.is_some() {
            return;
        }
        self.reports.downloading = Some(kind);

        let query = self.reports.query(kind);
        let dir = self.config.export_dir();
        let backend = self.backend.clone();
        info!(kind = ?kind, filename = %query.filename(), "Downloading report");
        self.spawn(async move {
            let result = export::download_report(backend.as_ref(), &query, dir).await;
            TaskResult::ReportSaved(kind, result)
        });
    }

    pub(super) fn on_report_saved(&mut self, kind: ReportKind, result: Result<PathBuf>) {
        self.reports.downloading = None;
        match result {
            Ok(path) => self
                .notifications
                .success(format!("{} ({})", kind.success_message(), path.display())),
            Err(e) => self.report_failure(&e, "Failed to download report"),
        }
    }

    /// Show the dues preview, fetching the member list.
    pub fn load_preview(&mut self) {
        self.reports.showing_preview = true;
        self.reports.loading_members = true;
        self.reports.scroll = 0;

        let ticket = self.tracker.issue(Slot::Members);
        let backend = self.backend.clone();
        self.spawn(async move { TaskResult::Members(ticket, backend.list_members().await) });
    }

    pub(super) fn on_members(&mut self, ticket: Ticket<Slot>, result: Result<Vec<Member>>) {
        if !self.is_current(&ticket) {
            return;
        }
        self.reports.loading_members = false;
        match result {
            Ok(members) => {
                info!(count = members.len(), "Members loaded for preview");
                self.reports.members = members;
                self.reports.rebuild_preview();
            }
            Err(e) => {
                self.reports.preview = None;
                self.report_failure(&e, "Failed to load preview");
            }
        }
    }

    pub fn close_preview(&mut self) {
        self.reports.showing_preview = false;
        self.reports.preview = None;
        self.reports.scroll = 0;
    }

    /// Save the preview as a print document and send it to the spooler.
    pub fn print_preview(&mut self) {
        if self.reports.printing {
            return;
        }
        let Some(preview) = self.reports.preview.as_ref() else {
            self.notifications.info("Open the dues preview first");
            return;
        };
        self.reports.printing = true;

        let html = preview.to_print_html();
        let filename = preview.print_filename();
        let dir = self.config.export_dir();
        let command = self.print_command.clone();
        self.spawn(async move {
            TaskResult::Printed(printing::print_document(dir, filename, html, command).await)
        });
    }

    pub(super) fn on_printed(&mut self, result: Result<PrintOutcome>) {
        self.reports.printing = false;
        match result {
            Ok(outcome) if outcome.spooled => self
                .notifications
                .success(format!("Dues report sent to printer ({})", outcome.path.display())),
            Ok(outcome) => self
                .notifications
                .info(format!("No print spooler available. Saved {}", outcome.path.display())),
            Err(e) => self.report_failure(&e, "Failed to print dues report"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake::{test_app, Failure, FakeBackend};
    use super::super::Level;
    use super::*;
    use boh_core::models::{Chapter, DuesStatus};
    use boh_core::reports::QuarterSelector;

    fn members() -> Vec<Member> {
        serde_json::from_str(
            r#"[
            {"id":"1","handle":"wrench","name":"W","chapter":"HS","dues":{"2024":[true,true,true,{"status":"late"}]}},
            {"id":"2","handle":"Axle","name":"A","chapter":"HA","dues":{"2024":[true,true,true,true,true,true]}},
            {"id":"3","handle":"","name":"Ghost","chapter":"National","dues":{}}
        ]"#,
        )
        .expect("Failed to parse member JSON")
    }

    #[test]
    fn test_filter_defaults_to_current_quarter() {
        let state = ReportsState::new(NaiveDate::from_ymd_opt(2024, 5, 15).expect("valid date"));
        assert_eq!(state.filter.year, 2024);
        assert_eq!(state.filter.quarter, QuarterSelector::Q2);
        assert_eq!(state.years.len(), 11);
    }

    #[test]
    fn test_adjust_filters() {
        let mut state = ReportsState::new(NaiveDate::from_ymd_opt(2024, 5, 15).expect("valid date"));
        state.adjust(false);
        assert_eq!(state.filter.year, 2024, "newest year is the upper bound");
        state.adjust(true);
        assert_eq!(state.filter.year, 2023);

        state.field = ReportField::Quarter;
        state.adjust(true);
        assert_eq!(state.filter.quarter, QuarterSelector::Q3);

        state.field = ReportField::Chapter;
        state.adjust(true);
        assert_eq!(state.filter.chapter, ChapterFilter::Only(Chapter::National));
        state.adjust(false);
        state.adjust(false);
        assert_eq!(state.filter.chapter, ChapterFilter::Only(Chapter::Hs));
    }

    #[tokio::test]
    async fn test_preview_uses_report_filter() {
        let fake = FakeBackend::with(|s| s.members = members());
        let (mut app, _dir) = test_app(&fake, Some("member"));

        app.load_preview();
        app.settle().await;

        let preview = app.reports.preview.as_ref().expect("preview built");
        assert_eq!(preview.month_headers(), vec!["Apr", "May", "Jun"]);
        let labels: Vec<&str> = preview.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Ghost", "Axle", "wrench"]);
        assert_eq!(preview.rows[2].cells[0], DuesStatus::Late);

        // Changing the chapter re-derives rows without another fetch
        app.reports.field = ReportField::Chapter;
        app.reports.adjust(true);
        app.reports.adjust(true);
        app.reports.adjust(true);
        let preview = app.reports.preview.as_ref().expect("preview rebuilt");
        assert_eq!(preview.rows.len(), 1);
        assert_eq!(preview.rows[0].chapter, Chapter::Ha);
        assert_eq!(fake.call_count("list_members"), 1);

        app.download_report(ReportKind::Dues);
        app.settle().await;
        assert_eq!(fake.lock().reports, vec!["dues_Q2_2024_HA.csv".to_string()]);
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let fake = FakeBackend::with(|s| s.report_bytes = b"member,jan\n".to_vec());
        let (mut app, dir) = test_app(&fake, Some("member"));

        app.download_report(ReportKind::Prospects);
        assert_eq!(app.reports.downloading, Some(ReportKind::Prospects));
        app.settle().await;

        let path = dir.path().join("exports").join("prospects_attendance_Q2_2024.csv");
        assert_eq!(std::fs::read(&path).expect("report saved"), b"member,jan\n");
        assert!(app.reports.downloading.is_none());
        let note = app.notifications.latest().expect("notification");
        assert_eq!(note.level, Level::Success);
        assert!(note.message.starts_with("Prospects report downloaded"));
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_file() {
        let fake = FakeBackend::new();
        fake.fail("download_report", Failure::Server);
        let (mut app, dir) = test_app(&fake, Some("member"));

        app.download_report(ReportKind::Attendance);
        app.settle().await;

        assert!(!dir.path().join("exports").exists());
        assert_eq!(app.notifications.len(), 1);
        let note = app.notifications.latest().expect("notification");
        assert_eq!(note.level, Level::Error);
        assert_eq!(note.message, "Failed to download report");
    }

    #[tokio::test]
    async fn test_preview_failure() {
        let fake = FakeBackend::new();
        fake.fail("list_members", Failure::Transport);
        let (mut app, _dir) = test_app(&fake, Some("member"));

        app.load_preview();
        app.settle().await;

        assert!(app.reports.preview.is_none());
        assert!(!app.reports.loading_members);
        assert_eq!(app.notifications.count(Level::Error), 1);
        assert_eq!(app.notifications.latest().map(|n| n.message.as_str()), Some("Failed to load preview"));
    }

    #[tokio::test]
    async fn test_print_saves_document() {
        let fake = FakeBackend::with(|s| s.members = members());
        let (mut app, dir) = test_app(&fake, Some("member"));

        app.print_preview();
        assert_eq!(app.notifications.latest().map(|n| n.level), Some(Level::Info));
        assert!(!app.is_busy());

        app.load_preview();
        app.settle().await;
        app.print_preview();
        app.settle().await;

        let saved = dir.path().join("exports").join("dues_report_Q2_2024.html");
        let html = std::fs::read_to_string(saved).expect("print document saved");
        assert!(html.contains("Q2 (Apr-Jun) 2024 - All Chapters"));
        assert!(!app.reports.printing);
    }
}
