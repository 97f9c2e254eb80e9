//! Application state management for the member desk.
//!
//! `App` owns the session, the backend handle and one state struct per tab.
//! Every backend call runs in a spawned task that reports back through an
//! mpsc channel as a [`TaskResult`]; `check_background_tasks` drains the
//! channel once per frame and applies each result to the owning tab.
//!
//! List fetches carry a [`Ticket`]. A result whose ticket has been
//! superseded by a newer fetch for the same slot is dropped.

mod archived;
mod chat;
pub mod form;
mod invite;
mod knowledge;
mod meetings;
pub mod notifications;
mod reports;

#[cfg(test)]
pub(crate) mod fake;

pub use archived::ArchivedState;
pub use chat::ChatState;
pub use invite::{InviteFocus, InviteState};
pub use knowledge::{EditorField, KnowledgeEditor, KnowledgeState};
pub use meetings::{AttendanceRow, AttendanceView, MeetingField, MeetingForm, MeetingsState};
pub use notifications::{Level, Notification, Notifications};
pub use reports::{ReportField, ReportsState};

use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use boh_core::api::{detail_or, is_unauthorized, ApiError};
use boh_core::config::ENV_PASSWORD;
use boh_core::models::{
    ArchivedMember, AttendanceRecord, AuthResponse, InitializeResponse, Invite, KnowledgeEntry,
    Meeting, Member,
};
use boh_core::reports::ReportKind;
use boh_core::sync::{RequestTracker, Ticket};
use boh_core::validation::validate_login;
use boh_core::{ApiClient, ClubBackend, Config, CredentialStore, Session, SessionData};

use crate::printing::{PrintOutcome, DEFAULT_PRINT_COMMAND};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

const ADMIN_ONLY: &str = "Only admins can do that";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Reports,
    Meetings,
    Archived,
    Knowledge,
    Chat,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Reports, Tab::Meetings, Tab::Archived, Tab::Knowledge, Tab::Chat];

    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Reports => "Reports",
            Tab::Meetings => "Meetings",
            Tab::Archived => "Archived",
            Tab::Knowledge => "AI Knowledge",
            Tab::Chat => "Assistant",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Reports => Tab::Meetings,
            Tab::Meetings => Tab::Archived,
            Tab::Archived => Tab::Knowledge,
            Tab::Knowledge => Tab::Chat,
            Tab::Chat => Tab::Reports,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Reports => Tab::Chat,
            Tab::Meetings => Tab::Reports,
            Tab::Archived => Tab::Meetings,
            Tab::Knowledge => Tab::Archived,
            Tab::Chat => Tab::Knowledge,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    /// A form or the chat input on the current tab has the keyboard.
    Editing,
    Searching,
    ShowingHelp,
    LoggingIn,
    AcceptingInvite,
    /// Waiting for a yes/no on `App::pending_confirm`.
    Confirming,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Destructive actions that need a yes/no first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteMeeting { id: String },
    RestoreArchived { id: String, name: String },
    DeleteArchived { id: String, name: String },
    DeleteKnowledge { id: String },
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            ConfirmAction::DeleteMeeting { .. } => "Delete Meeting",
            ConfirmAction::RestoreArchived { .. } => "Restore Member",
            ConfirmAction::DeleteArchived { .. } => "PERMANENT DELETION",
            ConfirmAction::DeleteKnowledge { .. } => "Delete Entry",
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            ConfirmAction::DeleteMeeting { .. } => {
                "Are you sure you want to delete this meeting? All attendance records will be lost."
                    .to_string()
            }
            ConfirmAction::RestoreArchived { name, .. } => {
                format!("Are you sure you want to restore {}?", name)
            }
            ConfirmAction::DeleteArchived { name, .. } => format!(
                "Are you sure you want to PERMANENTLY delete {} from archived members? \
                 This action CANNOT be undone!",
                name
            ),
            ConfirmAction::DeleteKnowledge { .. } => {
                "Are you sure you want to delete this knowledge entry?".to_string()
            }
        }
    }
}

/// Request slots for superseded-response detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Members,
    Meetings,
    Years,
    Attendance,
    Archived,
    Knowledge,
    Invite,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned backend calls.
pub(crate) enum TaskResult {
    Members(Ticket<Slot>, Result<Vec<Member>>),
    ReportSaved(ReportKind, Result<PathBuf>),
    Printed(Result<PrintOutcome>),

    Meetings(Ticket<Slot>, Result<Vec<Meeting>>),
    Years(Ticket<Slot>, Result<Vec<String>>),
    MeetingCreated(Result<()>),
    MeetingDeleted(Result<()>),
    /// Attendance list for the meeting id carried in the ticket's fetch.
    Attendance(Ticket<Slot>, Result<Vec<AttendanceRecord>>),
    AttendanceSaved {
        meeting_id: String,
        member_id: String,
        revision: u64,
        result: Result<()>,
    },

    Archived(Ticket<Slot>, Result<Vec<ArchivedMember>>),
    ArchivedRestored(Result<()>),
    ArchivedDeleted(Result<()>),
    ArchivedExported(Result<PathBuf>),

    Knowledge(Ticket<Slot>, Result<Vec<KnowledgeEntry>>),
    KnowledgeSaved { editing: bool, result: Result<()> },
    KnowledgeToggled { was_active: bool, result: Result<()> },
    KnowledgeDeleted(Result<()>),
    KnowledgeInitialized(Result<InitializeResponse>),

    Invite(Ticket<Slot>, Result<Invite>),
    InviteAccepted(Result<AuthResponse>),

    ChatReply(Result<String>),
}

// ============================================================================
// App
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    /// Anonymous backend; `backend` is derived from it per session.
    base: Arc<dyn ClubBackend>,
    backend: Arc<dyn ClubBackend>,
    /// Write the username to the config file and the password to the
    /// keychain after a successful login.
    remember_login: bool,
    /// Spooler for printed reports; `None` only saves the document.
    print_command: Option<String>,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub pending_confirm: Option<ConfirmAction>,
    pub today: NaiveDate,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Per-tab state
    pub reports: ReportsState,
    pub meetings: MeetingsState,
    pub archived: ArchivedState,
    pub knowledge: KnowledgeState,
    pub chat: ChatState,
    pub invite: Option<InviteState>,

    pub notifications: Notifications,

    // Background task channel
    tracker: RequestTracker<Slot>,
    task_tx: mpsc::Sender<TaskResult>,
    task_rx: mpsc::Receiver<TaskResult>,
    in_flight: usize,
}

impl App {
    /// Create the application from the on-disk config and session.
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(api_url = %config.api_url, "Config loaded");

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        let mut session = Session::new(cache_dir);
        match session.load() {
            Ok(found) => debug!(found, "Session loaded"),
            Err(e) => warn!(error = %e, "Failed to load session"),
        }

        let api = ApiClient::new(&config.api_base())?;
        let today = Local::now().date_naive();

        let mut app = Self::with_backend(config, session, Arc::new(api), today);
        app.remember_login = true;
        app.print_command = Some(DEFAULT_PRINT_COMMAND.to_string());
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            app.login_password = password;
        }
        Ok(app)
    }

    /// Build an app around any backend. `base` should be unauthenticated;
    /// the session token, if any, is applied here.
    pub fn with_backend(
        config: Config,
        session: Session,
        base: Arc<dyn ClubBackend>,
        today: NaiveDate,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let backend = base.authorized(session.token());
        let login_username = config.last_username.clone().unwrap_or_default();

        Self {
            config,
            session,
            base,
            backend,
            remember_login: false,
            print_command: None,

            state: AppState::Normal,
            current_tab: Tab::Reports,
            pending_confirm: None,
            today,

            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,

            reports: ReportsState::new(today),
            meetings: MeetingsState::new(today.year()),
            archived: ArchivedState::default(),
            knowledge: KnowledgeState::default(),
            chat: ChatState::default(),
            invite: None,

            notifications: Notifications::default(),

            tracker: RequestTracker::new(),
            task_tx: tx,
            task_rx: rx,
            in_flight: 0,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Check if the user has a session token
    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    /// Interactive login (used for CLI mode)
    pub async fn login_interactive(&mut self) -> Result<()> {
        println!("\n=== BOH Member Desk Login ===\n");

        let username = if let Some(ref last_user) = self.config.last_username {
            print!("Username [{}]: ", last_user);
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            let input = input.trim();

            if input.is_empty() {
                last_user.clone()
            } else {
                input.to_string()
            }
        } else {
            Self::prompt_username()?
        };

        let password = if CredentialStore::has_credentials(&username) {
            print!("Use stored password? [Y/n]: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if input.trim().to_lowercase() != "n" {
                CredentialStore::get_password(&username)?
            } else {
                Self::prompt_password()?
            }
        } else {
            Self::prompt_password()?
        };

        println!("\nAuthenticating...");

        let request = validate_login(&username, &password)?;
        let auth = self.base.login(&request).await?;

        CredentialStore::store(&request.username, &request.password)?;
        self.config.last_username = Some(request.username);
        self.config.save()?;

        let data = SessionData::from_auth(auth);
        self.backend = self.base.authorized(Some(&data.token));
        self.session.update(data);
        self.session.save()?;

        println!("Login successful!\n");
        Ok(())
    }

    fn prompt_username() -> Result<String> {
        print!("Username: ");
        io::stdout().flush()?;

        let mut username = String::new();
        io::stdin().read_line(&mut username)?;
        Ok(username.trim().to_string())
    }

    fn prompt_password() -> Result<String> {
        let password = rpassword::prompt_password("Password: ")?;
        Ok(password)
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let request = match validate_login(&self.login_username, &self.login_password) {
            Ok(request) => request,
            Err(e) => {
                self.login_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.login_error = None;

        match self.base.login(&request).await {
            Ok(auth) => {
                if self.remember_login {
                    if let Err(e) = CredentialStore::store(&request.username, &request.password) {
                        warn!(error = %e, "Failed to store credentials");
                    }
                    self.config.last_username = Some(request.username.clone());
                    if let Err(e) = self.config.save() {
                        warn!(error = %e, "Failed to save config");
                    }
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!(username = %request.username, "Login successful");
                self.establish_session(SessionData::from_auth(auth));
                Ok(())
            }
            Err(e) => {
                error!(error = ?e, "Login failed");
                self.login_error = Some(login_error_message(&e));
                Err(e)
            }
        }
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    pub fn logout(&mut self) {
        if let Some(username) = self.session.username() {
            info!(username, "Logging out");
        }
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.backend = self.base.authorized(None);
        self.reset_tab_data();
        self.notifications.info("Logged out");
        self.start_login();
    }

    /// Adopt a new session from login or invite acceptance and reload.
    fn establish_session(&mut self, data: SessionData) {
        self.backend = self.base.authorized(Some(&data.token));
        self.session.update(data);
        if let Err(e) = self.session.save() {
            warn!(error = %e, "Failed to save session");
        }
        self.reset_tab_data();
        self.refresh_current_tab();
    }

    /// The backend rejected our token: drop the session and ask for a login.
    fn expire_session(&mut self) {
        let already_expired = !self.session.is_valid() && self.state == AppState::LoggingIn;
        if already_expired {
            return;
        }
        warn!("Session rejected by backend");
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.backend = self.base.authorized(None);
        self.tracker.reset();
        self.login_password.clear();
        self.pending_confirm = None;
        self.notifications.error(SESSION_EXPIRED);
        self.start_login();
        self.login_error = Some(SESSION_EXPIRED.to_string());
    }

    fn reset_tab_data(&mut self) {
        self.tracker.reset();
        self.reports = ReportsState::new(self.today);
        self.meetings = MeetingsState::new(self.today.year());
        self.archived = ArchivedState::default();
        self.knowledge = KnowledgeState::default();
        self.chat = ChatState::default();
    }

    /// Refuse admin-only actions for other roles.
    fn require_admin(&mut self) -> bool {
        if self.is_admin() {
            true
        } else {
            self.notifications.error(ADMIN_ONLY);
            false
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        let loaded = match tab {
            Tab::Reports | Tab::Chat => true,
            Tab::Meetings => self.meetings.loaded,
            Tab::Archived => self.archived.loaded,
            Tab::Knowledge => self.knowledge.loaded,
        };
        if !loaded {
            self.refresh_current_tab();
        }
    }

    /// Refetch whatever the current tab shows.
    pub fn refresh_current_tab(&mut self) {
        if !self.is_authenticated() {
            return;
        }
        match self.current_tab {
            Tab::Reports => {
                if self.reports.showing_preview {
                    self.load_preview();
                }
            }
            Tab::Meetings => {
                if self.meetings.attendance.is_some() {
                    self.reload_attendance();
                } else {
                    self.load_meetings();
                    self.load_years();
                }
            }
            Tab::Archived => self.load_archived(),
            Tab::Knowledge => self.load_knowledge(),
            Tab::Chat => {}
        }
    }

    pub fn request_confirm(&mut self, action: ConfirmAction) {
        self.pending_confirm = Some(action);
        self.state = AppState::Confirming;
    }

    pub fn confirm_pending(&mut self) {
        self.state = AppState::Normal;
        match self.pending_confirm.take() {
            Some(ConfirmAction::DeleteMeeting { id }) => self.delete_meeting(id),
            Some(ConfirmAction::RestoreArchived { id, .. }) => self.restore_archived(id),
            Some(ConfirmAction::DeleteArchived { id, .. }) => self.delete_archived(id),
            Some(ConfirmAction::DeleteKnowledge { id }) => self.delete_knowledge(id),
            None => {}
        }
    }

    pub fn cancel_confirm(&mut self) {
        self.pending_confirm = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Run `task` on the runtime and deliver its result to the next frame.
    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = task.await;
            if let Err(e) = tx.send(result).await {
                error!(error = %e, "Failed to send task result - channel closed");
            }
        });
    }

    /// Whether any backend call is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.process_task_result(result);
        }
    }

    /// Wait until every spawned task, including ones spawned while
    /// processing results, has reported back.
    #[cfg(test)]
    pub(crate) async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.task_rx.recv().await {
                Some(result) => {
                    self.in_flight -= 1;
                    self.process_task_result(result);
                }
                None => break,
            }
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Members(ticket, result) => self.on_members(ticket, result),
            TaskResult::ReportSaved(kind, result) => self.on_report_saved(kind, result),
            TaskResult::Printed(result) => self.on_printed(result),

            TaskResult::Meetings(ticket, result) => self.on_meetings(ticket, result),
            TaskResult::Years(ticket, result) => self.on_years(ticket, result),
            TaskResult::MeetingCreated(result) => self.on_meeting_created(result),
            TaskResult::MeetingDeleted(result) => self.on_meeting_deleted(result),
            TaskResult::Attendance(ticket, result) => self.on_attendance(ticket, result),
            TaskResult::AttendanceSaved { meeting_id, member_id, revision, result } => {
                self.on_attendance_saved(&meeting_id, &member_id, revision, result)
            }

            TaskResult::Archived(ticket, result) => self.on_archived(ticket, result),
            TaskResult::ArchivedRestored(result) => self.on_archived_restored(result),
            TaskResult::ArchivedDeleted(result) => self.on_archived_deleted(result),
            TaskResult::ArchivedExported(result) => self.on_archived_exported(result),

            TaskResult::Knowledge(ticket, result) => self.on_knowledge(ticket, result),
            TaskResult::KnowledgeSaved { editing, result } => self.on_knowledge_saved(editing, result),
            TaskResult::KnowledgeToggled { was_active, result } => {
                self.on_knowledge_toggled(was_active, result)
            }
            TaskResult::KnowledgeDeleted(result) => self.on_knowledge_deleted(result),
            TaskResult::KnowledgeInitialized(result) => self.on_knowledge_initialized(result),

            TaskResult::Invite(ticket, result) => self.on_invite(ticket, result),
            TaskResult::InviteAccepted(result) => self.on_invite_accepted(result),

            TaskResult::ChatReply(result) => self.on_chat_reply(result),
        }
    }

    /// Whether a list result is still wanted. Superseded ones are dropped.
    fn is_current(&self, ticket: &Ticket<Slot>) -> bool {
        let current = self.tracker.is_current(ticket);
        if !current {
            debug!(slot = ?ticket.slot, seq = ticket.seq, "Dropping superseded response");
        }
        current
    }

    /// Log a failed backend call and raise exactly one notification for it
    /// with the fixed `message`. A 401 ends the session instead.
    fn report_failure(&mut self, err: &anyhow::Error, message: &str) {
        if self.log_failure(err, message) {
            self.notifications.error(message);
        }
    }

    /// Like `report_failure`, but shows the backend's `detail` when it sent
    /// one. Used where the backend explains a rejected change.
    fn report_failure_with_detail(&mut self, err: &anyhow::Error, fallback: &str) {
        if self.log_failure(err, fallback) {
            self.notifications.error(detail_or(err, fallback));
        }
    }

    /// Returns false when the failure ended the session.
    fn log_failure(&mut self, err: &anyhow::Error, message: &str) -> bool {
        if is_unauthorized(err) {
            self.expire_session();
            return false;
        }
        let chain = format!("{:#}", err);
        error!(error = %chain, "{}", message);
        true
    }
}

/// Move a list cursor by `delta`, clamped to a list of `len` items.
pub(crate) fn step_selection(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

/// User-facing text for a failed login.
fn login_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Unauthorized) => "Invalid username or password".to_string(),
        Some(ApiError::Network(e)) if e.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        Some(ApiError::Network(_)) => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        _ => detail_or(err, "Login failed"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::fake::{test_app, Failure, FakeBackend};
    use super::*;
    use boh_core::models::AuthResponse;

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Reports.next(), Tab::Meetings);
        assert_eq!(Tab::Chat.next(), Tab::Reports);
        for tab in Tab::ALL {
            assert_eq!(tab.next().prev(), tab);
        }
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Reports.prev(), Tab::Chat);
        assert_eq!(Tab::Archived.prev(), Tab::Meetings);
    }

    #[test]
    fn test_step_selection() {
        assert_eq!(step_selection(0, 0, 1), 0);
        assert_eq!(step_selection(0, 3, -1), 0);
        assert_eq!(step_selection(1, 3, 10), 2);
        assert_eq!(step_selection(5, 3, 0), 2);
    }

    #[test]
    fn test_confirm_prompts() {
        let restore = ConfirmAction::RestoreArchived { id: "a1".into(), name: "Dutch".into() };
        assert_eq!(restore.prompt(), "Are you sure you want to restore Dutch?");
        let meeting = ConfirmAction::DeleteMeeting { id: "m1".into() };
        assert!(meeting.prompt().contains("All attendance records will be lost."));
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let fake = FakeBackend::new();
        let (mut app, _dir) = test_app(&fake, None);
        app.start_login();

        assert!(app.attempt_login().await.is_err());
        assert_eq!(app.login_error.as_deref(), Some("Username and password required"));
        assert!(!fake.called("login"));
    }

    #[tokio::test]
    async fn test_login_success_starts_session() {
        let fake = FakeBackend::with(|s| {
            s.auth = Some(AuthResponse {
                token: "fresh".into(),
                username: "Dutch".into(),
                role: "admin".into(),
            });
        });
        let (mut app, _dir) = test_app(&fake, None);
        app.start_login();
        app.login_username = "Dutch".into();
        app.login_password = "hunter22".into();

        app.attempt_login().await.expect("login should succeed");
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.session.token(), Some("fresh"));
        assert!(app.is_admin());
        assert!(app.login_password.is_empty());
        assert_eq!(fake.last_token(), Some("fresh".to_string()));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let fake = FakeBackend::new();
        fake.fail("login", Failure::Unauthorized);
        let (mut app, _dir) = test_app(&fake, None);
        app.start_login();
        app.login_username = "Dutch".into();
        app.login_password = "wrong".into();

        assert!(app.attempt_login().await.is_err());
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.login_error.as_deref(), Some("Invalid username or password"));
        assert!(!app.is_authenticated());
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let fake = FakeBackend::new();
        fake.fail("list_archived", Failure::Unauthorized);
        let (mut app, dir) = test_app(&fake, Some("admin"));
        assert!(dir.path().join("session.json").exists());

        app.switch_tab(Tab::Archived);
        app.settle().await;

        assert!(!app.is_authenticated());
        assert!(!dir.path().join("session.json").exists());
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.login_error.as_deref(), Some(SESSION_EXPIRED));
        assert_eq!(app.notifications.count(Level::Error), 1);
        assert_eq!(fake.last_token(), None);
    }

    #[tokio::test]
    async fn test_logout_resets_state() {
        let fake = FakeBackend::new();
        let (mut app, _dir) = test_app(&fake, Some("member"));
        app.chat.input = "hello".into();
        app.logout();
        assert!(!app.is_authenticated());
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.chat.input.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_confirm_keeps_data() {
        let fake = FakeBackend::new();
        let (mut app, _dir) = test_app(&fake, Some("admin"));
        app.request_confirm(ConfirmAction::DeleteMeeting { id: "m1".into() });
        assert_eq!(app.state, AppState::Confirming);
        app.cancel_confirm();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending_confirm.is_none());
        assert!(!fake.called("delete_meeting"));
    }
}
