//! In-memory backend for driving `App` in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

use boh_core::api::ApiError;
use boh_core::models::{
    AcceptInviteRequest, ArchivedMember, AttendanceRecord, AttendanceStatus, AuthResponse,
    InitializeResponse, Invite, KnowledgeCategory, KnowledgeDraft, KnowledgeEntry, LoginRequest,
    Meeting, Member, NewMeeting,
};
use boh_core::reports::ReportQuery;
use boh_core::{ClubBackend, Config, Session, SessionData};

use super::App;

/// How a faked call should fail.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Unauthorized,
    Forbidden,
    /// 5xx without a usable detail.
    Server,
    /// 4xx carrying a backend `detail` message.
    Rejected(&'static str),
    /// Connection-level failure.
    Transport,
}

impl Failure {
    fn into_error(self) -> anyhow::Error {
        match self {
            Failure::Unauthorized => ApiError::Unauthorized.into(),
            Failure::Forbidden => ApiError::AccessDenied(String::new()).into(),
            Failure::Server => ApiError::ServerError(String::new()).into(),
            Failure::Rejected(detail) => ApiError::Validation(detail.to_string()).into(),
            Failure::Transport => anyhow::anyhow!("connection refused"),
        }
    }
}

#[derive(Default)]
pub struct FakeState {
    pub auth: Option<AuthResponse>,
    pub invite: Option<Invite>,
    pub accepted: Vec<AcceptInviteRequest>,
    pub members: Vec<Member>,
    pub meetings: Vec<Meeting>,
    pub years: Vec<String>,
    pub attendance: HashMap<String, Vec<AttendanceRecord>>,
    pub archived: Vec<ArchivedMember>,
    pub knowledge: Vec<KnowledgeEntry>,
    pub report_bytes: Vec<u8>,
    pub reports: Vec<String>,
    pub chat_reply: Option<String>,
    pub failures: HashMap<&'static str, Failure>,
    pub calls: Vec<&'static str>,
    next_id: u32,
}

/// Clones share state, so the test keeps a handle while `App` holds another.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    tokens: Arc<Mutex<Vec<Option<String>>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(setup: impl FnOnce(&mut FakeState)) -> Self {
        let fake = Self::new();
        setup(&mut fake.lock());
        fake
    }

    pub fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend state poisoned")
    }

    pub fn fail(&self, op: &'static str, failure: Failure) {
        self.lock().failures.insert(op, failure);
    }

    pub fn succeed(&self, op: &'static str) {
        self.lock().failures.remove(op);
    }

    pub fn called(&self, op: &str) -> bool {
        self.lock().calls.iter().any(|c| *c == op)
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }

    /// Token of the most recently derived backend.
    pub fn last_token(&self) -> Option<String> {
        self.tokens
            .lock()
            .expect("fake token log poisoned")
            .last()
            .cloned()
            .flatten()
    }

    /// Record the call and fail it if a failure is registered.
    fn enter(&self, op: &'static str) -> Result<MutexGuard<'_, FakeState>> {
        let mut state = self.lock();
        state.calls.push(op);
        let failure = state.failures.get(op).copied();
        match failure {
            Some(failure) => Err(failure.into_error()),
            None => Ok(state),
        }
    }
}

fn next_id(state: &mut FakeState, prefix: &str) -> String {
    state.next_id += 1;
    format!("{}{}", prefix, state.next_id)
}

#[async_trait]
impl ClubBackend for FakeBackend {
    fn authorized(&self, token: Option<&str>) -> Arc<dyn ClubBackend> {
        self.tokens
            .lock()
            .expect("fake token log poisoned")
            .push(token.map(str::to_string));
        Arc::new(self.clone())
    }

    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse> {
        let state = self.enter("login")?;
        state.auth.clone().ok_or_else(|| ApiError::Unauthorized.into())
    }

    async fn fetch_invite(&self, _token: &str) -> Result<Invite> {
        let state = self.enter("fetch_invite")?;
        state
            .invite
            .clone()
            .ok_or_else(|| ApiError::NotFound("Invite not found".into()).into())
    }

    async fn accept_invite(&self, request: &AcceptInviteRequest) -> Result<AuthResponse> {
        let mut state = self.enter("accept_invite")?;
        state.accepted.push(request.clone());
        Ok(state.auth.clone().unwrap_or_else(|| AuthResponse {
            token: "invited".into(),
            username: request.username.clone(),
            role: "member".into(),
        }))
    }

    async fn list_knowledge(&self) -> Result<Vec<KnowledgeEntry>> {
        Ok(self.enter("list_knowledge")?.knowledge.clone())
    }

    async fn create_knowledge(&self, draft: &KnowledgeDraft) -> Result<()> {
        let mut state = self.enter("create_knowledge")?;
        let id = next_id(&mut state, "k");
        state.knowledge.push(entry(&id, draft));
        Ok(())
    }

    async fn update_knowledge(&self, id: &str, draft: &KnowledgeDraft) -> Result<()> {
        let mut state = self.enter("update_knowledge")?;
        if let Some(existing) = state.knowledge.iter_mut().find(|e| e.id == id) {
            *existing = entry(id, draft);
        }
        Ok(())
    }

    async fn set_knowledge_active(&self, id: &str, is_active: bool) -> Result<()> {
        let mut state = self.enter("set_knowledge_active")?;
        if let Some(existing) = state.knowledge.iter_mut().find(|e| e.id == id) {
            existing.is_active = is_active;
        }
        Ok(())
    }

    async fn delete_knowledge(&self, id: &str) -> Result<()> {
        self.enter("delete_knowledge")?.knowledge.retain(|e| e.id != id);
        Ok(())
    }

    async fn initialize_knowledge(&self) -> Result<InitializeResponse> {
        let mut state = self.enter("initialize_knowledge")?;
        let id = next_id(&mut state, "k");
        let draft = KnowledgeDraft {
            title: "Chain of command".into(),
            content: "NPrez, NVP, NSEC".into(),
            ..Default::default()
        };
        state.knowledge.push(entry(&id, &draft));
        Ok(InitializeResponse { message: "Initialized 1 knowledge entries".into() })
    }

    async fn list_archived(&self) -> Result<Vec<ArchivedMember>> {
        Ok(self.enter("list_archived")?.archived.clone())
    }

    async fn restore_archived(&self, id: &str) -> Result<()> {
        self.enter("restore_archived")?.archived.retain(|m| m.id != id);
        Ok(())
    }

    async fn delete_archived(&self, id: &str) -> Result<()> {
        self.enter("delete_archived")?.archived.retain(|m| m.id != id);
        Ok(())
    }

    async fn export_archived_csv(&self) -> Result<Vec<u8>> {
        self.enter("export_archived_csv")?;
        Ok(b"handle,name\nDutch,Arthur\n".to_vec())
    }

    async fn list_meetings(&self, year: i32) -> Result<Vec<Meeting>> {
        let state = self.enter("list_meetings")?;
        Ok(state.meetings.iter().filter(|m| m.year() == Some(year)).cloned().collect())
    }

    async fn create_meeting(&self, meeting: &NewMeeting) -> Result<()> {
        let mut state = self.enter("create_meeting")?;
        let id = next_id(&mut state, "m");
        state.meetings.push(Meeting {
            id,
            date: meeting.date.clone(),
            name: Some(meeting.name.clone()).filter(|n| !n.is_empty()),
        });
        Ok(())
    }

    async fn delete_meeting(&self, id: &str) -> Result<()> {
        let mut state = self.enter("delete_meeting")?;
        state.meetings.retain(|m| m.id != id);
        state.attendance.remove(id);
        Ok(())
    }

    async fn fetch_attendance(&self, meeting_id: &str) -> Result<Vec<AttendanceRecord>> {
        let state = self.enter("fetch_attendance")?;
        Ok(state.attendance.get(meeting_id).cloned().unwrap_or_default())
    }

    async fn set_attendance(
        &self,
        meeting_id: &str,
        member_id: &str,
        status: AttendanceStatus,
    ) -> Result<()> {
        let mut state = self.enter("set_attendance")?;
        if let Some(record) = state
            .attendance
            .get_mut(meeting_id)
            .and_then(|records| records.iter_mut().find(|r| r.member_id == member_id))
        {
            record.status = status;
        }
        Ok(())
    }

    async fn available_years(&self) -> Result<Vec<String>> {
        Ok(self.enter("available_years")?.years.clone())
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        Ok(self.enter("list_members")?.members.clone())
    }

    async fn download_report(&self, query: &ReportQuery) -> Result<Vec<u8>> {
        let mut state = self.enter("download_report")?;
        state.reports.push(query.filename());
        Ok(state.report_bytes.clone())
    }

    async fn send_chat(&self, _message: &str) -> Result<String> {
        let state = self.enter("send_chat")?;
        Ok(state.chat_reply.clone().unwrap_or_else(|| "Ride safe.".into()))
    }
}

fn entry(id: &str, draft: &KnowledgeDraft) -> KnowledgeEntry {
    KnowledgeEntry {
        id: id.to_string(),
        title: draft.title.clone(),
        content: draft.content.clone(),
        category: draft.category,
        is_active: draft.is_active,
        admin_only: draft.admin_only || draft.category == KnowledgeCategory::AdminOnly,
        updated_by: Some("tester".into()),
        updated_at: None,
    }
}

/// App over `fake` with its session in a temp dir. `role` of `None`
/// starts logged out. Exports land in the same temp dir.
pub fn test_app(fake: &FakeBackend, role: Option<&str>) -> (App, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = Session::new(dir.path().to_path_buf());
    if let Some(role) = role {
        session.update(SessionData {
            token: "tok".into(),
            username: "Tester".into(),
            role: role.into(),
            created_at: Utc::now(),
        });
        session.save().expect("Failed to save test session");
    }
    let config = Config { export_dir: Some(dir.path().join("exports")), ..Config::default() };
    let today = NaiveDate::from_ymd_opt(2024, 5, 15).expect("valid date");
    let app = App::with_backend(config, session, Arc::new(fake.clone()), today);
    (app, dir)
}

pub fn meeting(id: &str, date: &str) -> Meeting {
    Meeting { id: id.into(), date: date.into(), name: None }
}

pub fn record(member_id: &str, handle: &str, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        member_id: member_id.into(),
        handle: handle.into(),
        chapter: Default::default(),
        name: String::new(),
        status,
    }
}
