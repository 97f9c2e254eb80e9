//! Form checks that run before any request is made.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{AcceptInviteRequest, KnowledgeDraft, LoginRequest, NewMeeting};

/// Shortest password accepted when creating an account.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid invitation link")]
    MissingInviteToken,

    #[error("Username is required")]
    UsernameRequired,

    #[error("Username and password required")]
    CredentialsRequired,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,

    #[error("Please select a date")]
    DateRequired,

    #[error("Date must be YYYY-MM-DD: {0}")]
    InvalidDate(String),

    #[error("Title is required")]
    TitleRequired,

    #[error("Content is required")]
    ContentRequired,
}

/// Check the invite token taken from the link.
pub fn validate_invite_token(token: Option<&str>) -> Result<&str, ValidationError> {
    match token.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(ValidationError::MissingInviteToken),
    }
}

/// Check the account form and build the accept request.
pub fn validate_invite_form(
    token: &str,
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<AcceptInviteRequest, ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(AcceptInviteRequest {
        token: token.to_string(),
        username: username.to_string(),
        password: password.to_string(),
    })
}

pub fn validate_login(username: &str, password: &str) -> Result<LoginRequest, ValidationError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::CredentialsRequired);
    }
    Ok(LoginRequest { username: username.to_string(), password: password.to_string() })
}

/// Meeting dates are calendar dates; the name is optional.
pub fn validate_new_meeting(date: &str, name: &str) -> Result<NewMeeting, ValidationError> {
    let date = date.trim();
    if date.is_empty() {
        return Err(ValidationError::DateRequired);
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
    Ok(NewMeeting { date: date.to_string(), name: name.trim().to_string() })
}

pub fn validate_knowledge_draft(draft: &KnowledgeDraft) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if draft.content.trim().is_empty() {
        return Err(ValidationError::ContentRequired);
    }
    Ok(())
}
