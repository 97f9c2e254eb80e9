//! Archived members: search, restore, permanent delete and CSV export.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use boh_core::models::ArchivedMember;
use boh_core::reports::export;
use boh_core::sync::Ticket;

use super::form::MAX_LINE_LENGTH;
use super::{step_selection, App, AppState, ConfirmAction, Slot, TaskResult};

#[derive(Debug, Default)]
pub struct ArchivedState {
    pub members: Vec<ArchivedMember>,
    pub loading: bool,
    pub loaded: bool,
    pub search: String,
    /// Index into `filtered()`.
    pub selection: usize,
    pub exporting: bool,
}

impl ArchivedState {
    pub fn filtered(&self) -> Vec<&ArchivedMember> {
        self.members.iter().filter(|m| m.matches_search(&self.search)).collect()
    }

    pub fn selected(&self) -> Option<&ArchivedMember> {
        self.filtered().get(self.selection).copied()
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.filtered().len();
        self.selection = step_selection(self.selection, len, delta);
    }

    pub fn push_search(&mut self, c: char) {
        if self.search.chars().count() < MAX_LINE_LENGTH {
            self.search.push(c);
            self.selection = 0;
        }
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.selection = 0;
    }
}

impl App {
    pub fn load_archived(&mut self) {
        self.archived.loading = true;
        let ticket = self.tracker.issue(Slot::Archived);
        let backend = self.backend.clone();
        self.spawn(async move { TaskResult::Archived(ticket, backend.list_archived().await) });
    }

    pub(super) fn on_archived(&mut self, ticket: Ticket<Slot>, result: Result<Vec<ArchivedMember>>) {
        if !self.is_current(&ticket) {
            return;
        }
        self.archived.loading = false;
        self.archived.loaded = true;
        match result {
            Ok(members) => {
                info!(count = members.len(), "Archived members loaded");
                self.archived.members = members;
            }
            Err(e) => {
                self.archived.members.clear();
                self.report_failure(&e, "Failed to load archived members");
            }
        }
        self.archived.move_selection(0);
    }

    pub fn start_archived_search(&mut self) {
        self.state = AppState::Searching;
    }

    /// Leave search mode. `clear` also drops the query.
    pub fn end_archived_search(&mut self, clear: bool) {
        if clear {
            self.archived.search.clear();
            self.archived.selection = 0;
        }
        self.state = AppState::Normal;
    }

    fn confirm_selected_archived(&mut self, build: fn(String, String) -> ConfirmAction) {
        if !self.require_admin() {
            return;
        }
        if let Some(member) = self.archived.selected() {
            let action = build(member.id.clone(), member.name.clone());
            self.request_confirm(action);
        }
    }

    pub fn request_restore_archived(&mut self) {
        self.confirm_selected_archived(|id, name| ConfirmAction::RestoreArchived { id, name });
    }

    pub fn request_delete_archived(&mut self) {
        self.confirm_selected_archived(|id, name| ConfirmAction::DeleteArchived { id, name });
    }

    pub(super) fn restore_archived(&mut self, id: String) {
        let backend = self.backend.clone();
        info!(member_id = %id, "Restoring archived member");
        self.spawn(async move { TaskResult::ArchivedRestored(backend.restore_archived(&id).await) });
    }

    pub(super) fn on_archived_restored(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                self.notifications.success("Member restored successfully");
                self.load_archived();
            }
            Err(e) => self.report_failure_with_detail(&e, "Failed to restore member"),
        }
    }

    pub(super) fn delete_archived(&mut self, id: String) {
        let backend = self.backend.clone();
        info!(member_id = %id, "Permanently deleting archived member");
        self.spawn(async move { TaskResult::ArchivedDeleted(backend.delete_archived(&id).await) });
    }

    pub(super) fn on_archived_deleted(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                self.notifications.success("Archived member permanently deleted");
                self.load_archived();
            }
            Err(e) => self.report_failure_with_detail(&e, "Failed to delete archived member"),
        }
    }

    /// Save the backend's archived-members CSV, named for today's UTC date.
    pub fn export_archived(&mut self) {
        if self.archived.exporting {
            return;
        }
        self.archived.exporting = true;
        let today = Utc::now().date_naive();
        let dir = self.config.export_dir();
        let backend = self.backend.clone();
        self.spawn(async move {
            TaskResult::ArchivedExported(export::download_archived(backend.as_ref(), today, dir).await)
        });
    }

    pub(super) fn on_archived_exported(&mut self, result: Result<PathBuf>) {
        self.archived.exporting = false;
        match result {
            Ok(path) => self
                .notifications
                .success(format!("CSV exported successfully ({})", path.display())),
            Err(e) => self.report_failure(&e, "Failed to export CSV"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake::{test_app, Failure, FakeBackend};
    use super::super::{Level, Tab};
    use super::*;
    use boh_core::reports::export::archived_export_filename;

    fn archived(id: &str, handle: &str, name: &str) -> ArchivedMember {
        ArchivedMember {
            id: id.into(),
            handle: handle.into(),
            name: name.into(),
            title: "Road Captain".into(),
            ..Default::default()
        }
    }

    fn seeded() -> FakeBackend {
        FakeBackend::with(|s| {
            s.archived = vec![archived("a1", "Dutch", "Arthur Morgan"), archived("a2", "Sadie", "Sadie Adler")];
        })
    }

    #[tokio::test]
    async fn test_search_filters_list() {
        let fake = seeded();
        let (mut app, _dir) = test_app(&fake, Some("admin"));
        app.switch_tab(Tab::Archived);
        app.settle().await;

        assert_eq!(app.archived.filtered().len(), 2);
        app.start_archived_search();
        for c in "ADLER".chars() {
            app.archived.push_search(c);
        }
        let names: Vec<&str> = app.archived.filtered().iter().map(|m| m.handle.as_str()).collect();
        assert_eq!(names, vec!["Sadie"]);

        app.end_archived_search(true);
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.archived.filtered().len(), 2);
    }

    #[tokio::test]
    async fn test_restore_uses_member_name() {
        let fake = seeded();
        let (mut app, _dir) = test_app(&fake, Some("admin"));
        app.switch_tab(Tab::Archived);
        app.settle().await;

        app.archived.move_selection(1);
        app.request_restore_archived();
        let prompt = app.pending_confirm.as_ref().map(|a| a.prompt());
        assert_eq!(prompt.as_deref(), Some("Are you sure you want to restore Sadie Adler?"));

        app.confirm_pending();
        app.settle().await;
        assert_eq!(app.archived.members.len(), 1);
        assert_eq!(
            app.notifications.latest().map(|n| n.message.as_str()),
            Some("Member restored successfully")
        );
    }

    #[tokio::test]
    async fn test_backend_detail_is_shown() {
        let fake = seeded();
        fake.fail("delete_archived", Failure::Rejected("Member has open dues"));
        let (mut app, _dir) = test_app(&fake, Some("admin"));
        app.switch_tab(Tab::Archived);
        app.settle().await;

        app.request_delete_archived();
        app.confirm_pending();
        app.settle().await;

        assert_eq!(app.archived.members.len(), 2);
        assert_eq!(app.notifications.count(Level::Error), 1);
        assert_eq!(app.notifications.latest().map(|n| n.message.as_str()), Some("Member has open dues"));
    }

    #[tokio::test]
    async fn test_export_filename_uses_utc_date() {
        let fake = seeded();
        let (mut app, dir) = test_app(&fake, Some("member"));

        app.export_archived();
        app.settle().await;

        let expected = dir
            .path()
            .join("exports")
            .join(archived_export_filename(Utc::now().date_naive()));
        let saved = std::fs::read_to_string(&expected).expect("CSV saved");
        assert!(saved.starts_with("handle,name"));
        assert!(!app.archived.exporting);
        assert_eq!(app.notifications.latest().map(|n| n.level), Some(Level::Success));
    }

    #[tokio::test]
    async fn test_load_failure() {
        let fake = FakeBackend::new();
        fake.fail("list_archived", Failure::Forbidden);
        let (mut app, _dir) = test_app(&fake, Some("member"));
        app.switch_tab(Tab::Archived);
        app.settle().await;

        assert!(app.archived.members.is_empty());
        assert_eq!(
            app.notifications.latest().map(|n| n.message.as_str()),
            Some("Failed to load archived members")
        );
    }
}
