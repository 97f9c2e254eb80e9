//! Data models for the club backend.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `Member`, `Chapter`: active roster entries with their dues history
//! - `DuesMonth`, `DuesStatus`: per-month dues, normalized once on the way in
//! - `Meeting`, `AttendanceRecord`: meetings and tri-state attendance
//! - `ArchivedMember`: soft-deleted members
//! - `KnowledgeEntry`: chat assistant knowledge base
//! - `Invite`, `AuthResponse`: account provisioning
//! - `ChatMessage`, `Transcript`: assistant conversation

pub mod archived;
pub mod chat;
pub mod dues;
pub mod invite;
pub mod knowledge;
pub mod meeting;
pub mod member;

pub use archived::ArchivedMember;
pub use chat::{ChatMessage, ChatReply, ChatRequest, ChatRole, Transcript};
pub use dues::{DuesMeta, DuesMonth, DuesStatus};
pub use invite::{AcceptInviteRequest, AuthResponse, Invite, LoginRequest};
pub use knowledge::{
    CategoryFilter, InitializeResponse, KnowledgeCategory, KnowledgeDraft, KnowledgeEntry,
    KnowledgeToggle,
};
pub use meeting::{
    AttendanceRecord, AttendanceStatus, AvailableYears, Meeting, MeetingAttendance, NewMeeting,
};
pub use member::{Chapter, ChapterFilter, Member};

use serde::{Deserialize, Deserializer};

/// Deserialize a field that the backend may send as `null`, falling back to
/// the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
