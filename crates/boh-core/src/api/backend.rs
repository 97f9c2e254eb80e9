use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    AcceptInviteRequest, ArchivedMember, AttendanceRecord, AttendanceStatus, AuthResponse,
    InitializeResponse, Invite, KnowledgeDraft, KnowledgeEntry, LoginRequest, Meeting, Member,
    NewMeeting,
};
use crate::reports::ReportQuery;

/// Every backend operation the client performs.
///
/// [`ApiClient`](super::ApiClient) is the HTTP implementation. The front end
/// only holds an `Arc<dyn ClubBackend>`, so tests can drive it against an
/// in-memory fake.
#[async_trait]
pub trait ClubBackend: Send + Sync {
    /// Same backend, authenticating as `token` (or anonymously).
    fn authorized(&self, token: Option<&str>) -> Arc<dyn ClubBackend>;

    // ===== Session =====

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse>;

    async fn fetch_invite(&self, token: &str) -> Result<Invite>;

    async fn accept_invite(&self, request: &AcceptInviteRequest) -> Result<AuthResponse>;

    // ===== Knowledge base =====

    async fn list_knowledge(&self) -> Result<Vec<KnowledgeEntry>>;

    async fn create_knowledge(&self, draft: &KnowledgeDraft) -> Result<()>;

    async fn update_knowledge(&self, id: &str, draft: &KnowledgeDraft) -> Result<()>;

    /// Partial update of `is_active` only.
    async fn set_knowledge_active(&self, id: &str, is_active: bool) -> Result<()>;

    async fn delete_knowledge(&self, id: &str) -> Result<()>;

    async fn initialize_knowledge(&self) -> Result<InitializeResponse>;

    // ===== Archived members =====

    async fn list_archived(&self) -> Result<Vec<ArchivedMember>>;

    async fn restore_archived(&self, id: &str) -> Result<()>;

    async fn delete_archived(&self, id: &str) -> Result<()>;

    async fn export_archived_csv(&self) -> Result<Vec<u8>>;

    // ===== Meetings =====

    async fn list_meetings(&self, year: i32) -> Result<Vec<Meeting>>;

    async fn create_meeting(&self, meeting: &NewMeeting) -> Result<()>;

    async fn delete_meeting(&self, id: &str) -> Result<()>;

    async fn fetch_attendance(&self, meeting_id: &str) -> Result<Vec<AttendanceRecord>>;

    async fn set_attendance(
        &self,
        meeting_id: &str,
        member_id: &str,
        status: AttendanceStatus,
    ) -> Result<()>;

    async fn available_years(&self) -> Result<Vec<String>>;

    // ===== Members, reports, chat =====

    async fn list_members(&self) -> Result<Vec<Member>>;

    /// Raw CSV bytes for a report.
    async fn download_report(&self, query: &ReportQuery) -> Result<Vec<u8>>;

    async fn send_chat(&self, message: &str) -> Result<String>;
}
