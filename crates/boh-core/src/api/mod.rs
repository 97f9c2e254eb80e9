//! REST API client module for the club backend.
//!
//! All paths live under `{api_url}/api` and authenticate with a bearer
//! token from the session. Failures are returned as [`ApiError`] wrapped in
//! `anyhow::Error`; callers pull the backend's `detail` message out with
//! [`detail_or`] when building a notification.

pub mod backend;
pub mod client;
pub mod error;

pub use backend::ClubBackend;
pub use client::ApiClient;
pub use error::{detail_of, detail_or, is_access_denied, is_unauthorized, ApiError};
