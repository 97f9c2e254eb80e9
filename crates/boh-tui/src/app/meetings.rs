//! Meetings tab: per-year meeting list, add/delete, and the attendance sub-view.

use anyhow::Result;
use tracing::{debug, info, warn};

use boh_core::api::detail_or;
use boh_core::models::{AttendanceRecord, AttendanceStatus, Meeting};
use boh_core::reports::{AttendanceTally, MeetingSummary};
use boh_core::sync::{Ticket, Tracked};
use boh_core::validation::validate_new_meeting;

use super::form::{TextInput, MAX_LINE_LENGTH};
use super::{step_selection, App, AppState, ConfirmAction, Slot, TaskResult};

const DATE_LENGTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingField {
    Date,
    Name,
}

impl MeetingField {
    pub fn next(&self) -> Self {
        match self {
            MeetingField::Date => MeetingField::Name,
            MeetingField::Name => MeetingField::Date,
        }
    }
}

/// The add-meeting form.
#[derive(Debug, Clone)]
pub struct MeetingForm {
    pub date: TextInput,
    pub name: TextInput,
    pub focus: MeetingField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl Default for MeetingForm {
    fn default() -> Self {
        Self {
            date: TextInput::new(DATE_LENGTH),
            name: TextInput::new(MAX_LINE_LENGTH),
            focus: MeetingField::Date,
            error: None,
            submitting: false,
        }
    }
}

impl MeetingForm {
    pub fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            MeetingField::Date => &mut self.date,
            MeetingField::Name => &mut self.name,
        }
    }
}

/// One attendance line with its local edit state.
#[derive(Debug, Clone)]
pub struct AttendanceRow {
    pub record: AttendanceRecord,
    pub status: Tracked<AttendanceStatus>,
}

impl From<AttendanceRecord> for AttendanceRow {
    fn from(record: AttendanceRecord) -> Self {
        let status = Tracked::committed(record.status);
        Self { record, status }
    }
}

/// Attendance for one meeting.
#[derive(Debug, Clone)]
pub struct AttendanceView {
    pub meeting: Meeting,
    pub rows: Vec<AttendanceRow>,
    pub loading: bool,
    pub selection: usize,
}

impl AttendanceView {
    fn new(meeting: Meeting) -> Self {
        Self { meeting, rows: Vec::new(), loading: true, selection: 0 }
    }

    /// Counts over the values currently shown, edits included.
    pub fn tally(&self) -> AttendanceTally {
        self.rows.iter().map(|row| row.status.value).collect()
    }

    /// Rows whose last save failed.
    pub fn unsaved(&self) -> usize {
        self.rows.iter().filter(|row| row.status.sync.is_failed()).count()
    }

    pub fn move_selection(&mut self, delta: isize) {
        self.selection = step_selection(self.selection, self.rows.len(), delta);
    }
}

#[derive(Debug)]
pub struct MeetingsState {
    pub year: i32,
    /// Selectable years, newest first. Always contains `year`.
    pub years: Vec<i32>,
    pub meetings: Vec<Meeting>,
    pub loading: bool,
    pub loaded: bool,
    pub selection: usize,
    pub form: Option<MeetingForm>,
    pub attendance: Option<AttendanceView>,
}

impl MeetingsState {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            years: vec![year],
            meetings: Vec::new(),
            loading: false,
            loaded: false,
            selection: 0,
            form: None,
            attendance: None,
        }
    }

    pub fn selected(&self) -> Option<&Meeting> {
        self.meetings.get(self.selection)
    }

    pub fn summary(&self) -> MeetingSummary {
        MeetingSummary::from_meetings(&self.meetings)
    }

    pub fn move_selection(&mut self, delta: isize) {
        self.selection = step_selection(self.selection, self.meetings.len(), delta);
    }

    /// Merge backend years with the current selection, newest first.
    fn set_years(&mut self, raw: &[String]) {
        let mut years: Vec<i32> = raw.iter().filter_map(|y| y.trim().parse().ok()).collect();
        years.push(self.year);
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        self.years = years;
    }
}

impl App {
    pub fn load_meetings(&mut self) {
        self.meetings.loading = true;
        let year = self.meetings.year;
        let ticket = self.tracker.issue(Slot::Meetings);
        let backend = self.backend.clone();
        debug!(year, "Loading meetings");
        self.spawn(async move { TaskResult::Meetings(ticket, backend.list_meetings(year).await) });
    }

    pub(super) fn on_meetings(&mut self, ticket: Ticket<Slot>, result: Result<Vec<Meeting>>) {
        if !self.is_current(&ticket) {
            return;
        }
        self.meetings.loading = false;
        self.meetings.loaded = true;
        match result {
            Ok(meetings) => {
                info!(count = meetings.len(), year = self.meetings.year, "Meetings loaded");
                self.meetings.meetings = meetings;
            }
            Err(e) => {
                self.meetings.meetings.clear();
                self.report_failure(&e, "Failed to load meetings");
            }
        }
        self.meetings.move_selection(0);
    }

    pub fn load_years(&mut self) {
        let ticket = self.tracker.issue(Slot::Years);
        let backend = self.backend.clone();
        self.spawn(async move { TaskResult::Years(ticket, backend.available_years().await) });
    }

    pub(super) fn on_years(&mut self, ticket: Ticket<Slot>, result: Result<Vec<String>>) {
        if !self.is_current(&ticket) {
            return;
        }
        match result {
            Ok(years) => self.meetings.set_years(&years),
            Err(e) => warn!(error = %format!("{:#}", e), "Failed to load available years"),
        }
    }

    /// Step the year selector and refetch. `older` moves toward the past.
    pub fn change_year(&mut self, older: bool) {
        let years = &self.meetings.years;
        let pos = years.iter().position(|y| *y == self.meetings.year).unwrap_or(0);
        let next = if older { pos + 1 } else { pos.wrapping_sub(1) };
        let Some(year) = years.get(next).copied() else {
            return;
        };
        self.meetings.year = year;
        self.meetings.selection = 0;
        self.load_meetings();
    }

    pub fn open_meeting_form(&mut self) {
        if !self.require_admin() {
            return;
        }
        self.meetings.form = Some(MeetingForm::default());
        self.state = AppState::Editing;
    }

    pub fn close_meeting_form(&mut self) {
        self.meetings.form = None;
        self.state = AppState::Normal;
    }

    pub fn submit_meeting_form(&mut self) {
        let Some(form) = self.meetings.form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        let meeting = match validate_new_meeting(form.date.value(), form.name.value()) {
            Ok(meeting) => meeting,
            Err(e) => {
                form.error = Some(e.to_string());
                return;
            }
        };
        form.error = None;
        form.submitting = true;

        let backend = self.backend.clone();
        info!(date = %meeting.date, "Creating meeting");
        self.spawn(async move { TaskResult::MeetingCreated(backend.create_meeting(&meeting).await) });
    }

    pub(super) fn on_meeting_created(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                if self.meetings.form.take().is_some() && self.state == AppState::Editing {
                    self.state = AppState::Normal;
                }
                self.notifications.success("Meeting added successfully");
                self.load_meetings();
                self.load_years();
            }
            Err(e) => {
                if let Some(form) = self.meetings.form.as_mut() {
                    form.submitting = false;
                }
                self.report_failure(&e, "Failed to add meeting");
            }
        }
    }

    /// Ask before deleting the highlighted meeting.
    pub fn request_delete_meeting(&mut self) {
        if !self.require_admin() {
            return;
        }
        if let Some(meeting) = self.meetings.selected() {
            let id = meeting.id.clone();
            self.request_confirm(ConfirmAction::DeleteMeeting { id });
        }
    }

    pub(super) fn delete_meeting(&mut self, id: String) {
        let backend = self.backend.clone();
        info!(meeting_id = %id, "Deleting meeting");
        self.spawn(async move { TaskResult::MeetingDeleted(backend.delete_meeting(&id).await) });
    }

    pub(super) fn on_meeting_deleted(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                self.notifications.success("Meeting deleted");
                self.load_meetings();
            }
            Err(e) => self.report_failure(&e, "Failed to delete meeting"),
        }
    }

    // ===== Attendance =====

    pub fn open_attendance(&mut self) {
        let Some(meeting) = self.meetings.selected().cloned() else {
            return;
        };
        self.meetings.attendance = Some(AttendanceView::new(meeting));
        self.reload_attendance();
    }

    pub fn close_attendance(&mut self) {
        self.meetings.attendance = None;
    }

    pub fn reload_attendance(&mut self) {
        let Some(view) = self.meetings.attendance.as_mut() else {
            return;
        };
        view.loading = true;
        let meeting_id = view.meeting.id.clone();
        let ticket = self.tracker.issue(Slot::Attendance);
        let backend = self.backend.clone();
        self.spawn(async move {
            TaskResult::Attendance(ticket, backend.fetch_attendance(&meeting_id).await)
        });
    }

    pub(super) fn on_attendance(&mut self, ticket: Ticket<Slot>, result: Result<Vec<AttendanceRecord>>) {
        if !self.is_current(&ticket) {
            return;
        }
        let Some(view) = self.meetings.attendance.as_mut() else {
            debug!("Attendance view closed before load finished");
            return;
        };
        view.loading = false;
        match result {
            Ok(records) => {
                view.rows = records.into_iter().map(AttendanceRow::from).collect();
                view.move_selection(0);
            }
            Err(e) => {
                view.rows.clear();
                self.report_failure(&e, "Failed to load attendance");
            }
        }
    }

    /// Advance the highlighted member to the next status and save it.
    pub fn cycle_attendance(&mut self) {
        let next = self
            .meetings
            .attendance
            .as_ref()
            .and_then(|view| view.rows.get(view.selection))
            .map(|row| row.status.value.cycle());
        if let Some(status) = next {
            self.set_attendance_status(status);
        }
    }

    /// Set the highlighted member's status with a single save. Picking the
    /// status already shown sends nothing.
    pub fn set_attendance_status(&mut self, status: AttendanceStatus) {
        if !self.require_admin() {
            return;
        }
        let Some(view) = self.meetings.attendance.as_mut() else {
            return;
        };
        let meeting_id = view.meeting.id.clone();
        let Some(row) = view.rows.get_mut(view.selection) else {
            return;
        };
        if row.status.value == status && !row.status.sync.is_failed() {
            return;
        }
        let revision = row.status.edit(status);
        let member_id = row.record.member_id.clone();

        let backend = self.backend.clone();
        debug!(meeting_id = %meeting_id, member_id = %member_id, status = %status, "Updating attendance");
        self.spawn(async move {
            let result = backend.set_attendance(&meeting_id, &member_id, status).await;
            TaskResult::AttendanceSaved { meeting_id, member_id, revision, result }
        });
    }

    pub(super) fn on_attendance_saved(
        &mut self,
        meeting_id: &str,
        member_id: &str,
        revision: u64,
        result: Result<()>,
    ) {
        let outcome = match &result {
            Ok(()) => Ok(()),
            Err(e) => Err(detail_or(e, "Failed to update attendance")),
        };
        let applied = self
            .meetings
            .attendance
            .as_mut()
            .filter(|view| view.meeting.id == meeting_id)
            .and_then(|view| view.rows.iter_mut().find(|r| r.record.member_id == member_id))
            .map(|row| row.status.settle(revision, outcome));

        match result {
            Err(_) if applied == Some(false) => {
                debug!(member_id, revision, "Ignoring failure for superseded attendance edit")
            }
            Err(e) => self.report_failure(&e, "Failed to update attendance"),
            Ok(()) => debug!(member_id, revision, "Attendance saved"),
        }
    }
}
