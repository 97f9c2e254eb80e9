//! HTTP implementation of [`ClubBackend`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{
    AcceptInviteRequest, ArchivedMember, AttendanceRecord, AttendanceStatus, AuthResponse,
    AvailableYears, ChatReply, ChatRequest, InitializeResponse, Invite, KnowledgeDraft,
    KnowledgeEntry, KnowledgeToggle, LoginRequest, Meeting, MeetingAttendance, Member, NewMeeting,
};
use crate::reports::ReportQuery;

use super::{ApiError, ClubBackend};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Chat replies come from a language model and can take a while.
const CHAT_TIMEOUT_SECS: u64 = 120;

/// API client for the club backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `api_base`, e.g. `http://localhost:8001/api`.
    pub fn new(api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let base = Url::parse(api_base)
            .with_context(|| format!("Invalid API URL: {}", api_base))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("Invalid API URL: {}", api_base);
        }
        Ok(Self { client, base, token: None })
    }

    /// Endpoint URL from path segments. Segments are percent-encoded, so
    /// ids can be passed through as-is.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(method = %method, url = %url, "API request");
        let builder = self.client.request(method, url);
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn send(builder: RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(ApiError::Network)
            .with_context(|| format!("Failed to send {} request", what))?;
        Self::check_response(response).await
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder, what: &str) -> Result<T> {
        let response = Self::send(builder, what).await?;
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} response body", what))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse {} response", what))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str], what: &str) -> Result<T> {
        Self::send_json(self.request(Method::GET, segments), what).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
        what: &str,
    ) -> Result<T> {
        Self::send_json(self.request(Method::POST, segments).json(body), what).await
    }

    /// Send a request whose response body is not needed.
    async fn execute(&self, builder: RequestBuilder, what: &str) -> Result<()> {
        Self::send(builder, what).await?;
        Ok(())
    }

    async fn get_bytes(&self, builder: RequestBuilder, what: &str) -> Result<Vec<u8>> {
        let response = Self::send(builder, what).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(ApiError::Network)
            .with_context(|| format!("Failed to read {} body", what))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ClubBackend for ApiClient {
    fn authorized(&self, token: Option<&str>) -> Arc<dyn ClubBackend> {
        let mut api = self.clone();
        api.token = token.map(str::to_string);
        Arc::new(api)
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.post(&["auth", "login"], request, "login").await
    }

    async fn fetch_invite(&self, token: &str) -> Result<Invite> {
        self.get(&["invites", token], "invite").await
    }

    async fn accept_invite(&self, request: &AcceptInviteRequest) -> Result<AuthResponse> {
        self.post(&["invites", "accept"], request, "accept invite").await
    }

    async fn list_knowledge(&self) -> Result<Vec<KnowledgeEntry>> {
        self.get(&["ai-knowledge"], "knowledge list").await
    }

    async fn create_knowledge(&self, draft: &KnowledgeDraft) -> Result<()> {
        let builder = self.request(Method::POST, &["ai-knowledge"]).json(draft);
        self.execute(builder, "create knowledge").await
    }

    async fn update_knowledge(&self, id: &str, draft: &KnowledgeDraft) -> Result<()> {
        let builder = self.request(Method::PUT, &["ai-knowledge", id]).json(draft);
        self.execute(builder, "update knowledge").await
    }

    async fn set_knowledge_active(&self, id: &str, is_active: bool) -> Result<()> {
        let builder = self
            .request(Method::PUT, &["ai-knowledge", id])
            .json(&KnowledgeToggle { is_active });
        self.execute(builder, "toggle knowledge").await
    }

    async fn delete_knowledge(&self, id: &str) -> Result<()> {
        self.execute(self.request(Method::DELETE, &["ai-knowledge", id]), "delete knowledge")
            .await
    }

    async fn initialize_knowledge(&self) -> Result<InitializeResponse> {
        self.post(&["ai-knowledge", "initialize"], &serde_json::json!({}), "initialize knowledge")
            .await
    }

    async fn list_archived(&self) -> Result<Vec<ArchivedMember>> {
        self.get(&["archived", "members"], "archived members").await
    }

    async fn restore_archived(&self, id: &str) -> Result<()> {
        let builder = self.request(Method::POST, &["archived", "members", id, "restore"]);
        self.execute(builder, "restore member").await
    }

    async fn delete_archived(&self, id: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, &["archived", "members", id]);
        self.execute(builder, "delete archived member").await
    }

    async fn export_archived_csv(&self) -> Result<Vec<u8>> {
        let builder = self.request(Method::GET, &["archived", "members", "export", "csv"]);
        self.get_bytes(builder, "archived export").await
    }

    async fn list_meetings(&self, year: i32) -> Result<Vec<Meeting>> {
        let builder = self
            .request(Method::GET, &["meetings"])
            .query(&[("year", year.to_string())]);
        Self::send_json(builder, "meetings").await
    }

    async fn create_meeting(&self, meeting: &NewMeeting) -> Result<()> {
        let builder = self.request(Method::POST, &["meetings"]).json(meeting);
        self.execute(builder, "create meeting").await
    }

    async fn delete_meeting(&self, id: &str) -> Result<()> {
        self.execute(self.request(Method::DELETE, &["meetings", id]), "delete meeting")
            .await
    }

    async fn fetch_attendance(&self, meeting_id: &str) -> Result<Vec<AttendanceRecord>> {
        let response: MeetingAttendance =
            self.get(&["meetings", meeting_id, "attendance"], "attendance").await?;
        Ok(response.attendance)
    }

    async fn set_attendance(
        &self,
        meeting_id: &str,
        member_id: &str,
        status: AttendanceStatus,
    ) -> Result<()> {
        let builder = self
            .request(Method::PUT, &["meetings", meeting_id, "attendance", member_id])
            .query(&[("status", status.code())])
            .json(&serde_json::json!({}));
        self.execute(builder, "update attendance").await
    }

    async fn available_years(&self) -> Result<Vec<String>> {
        let response: AvailableYears = self.get(&["admin", "available-years"], "available years").await?;
        Ok(response.years)
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        self.get(&["members"], "members").await
    }

    async fn download_report(&self, query: &ReportQuery) -> Result<Vec<u8>> {
        let segments: Vec<&str> = query.path().split('/').filter(|s| !s.is_empty()).collect();
        let builder = self.request(Method::GET, &segments).query(&query.params());
        self.get_bytes(builder, "report").await
    }

    async fn send_chat(&self, message: &str) -> Result<String> {
        let builder = self
            .request(Method::POST, &["chat"])
            .timeout(Duration::from_secs(CHAT_TIMEOUT_SECS))
            .json(&ChatRequest { message: message.to_string() });
        let reply: ChatReply = Self::send_json(builder, "chat").await?;
        Ok(reply.response)
    }
}
