//! Core library for boh-desk.
//!
//! Everything that is independent of the terminal front end lives here:
//!
//! - `api`: REST client for the club backend and the `ClubBackend` seam
//! - `auth`: session context and keychain credential storage
//! - `config`: on-disk configuration and environment overrides
//! - `models`: members, dues, meetings, attendance, knowledge, invites, chat
//! - `reports`: quarter windowing, dues classification, ordering, preview
//!   and CSV export
//! - `sync`: request sequencing and per-record sync state
//! - `validation`: client-side form checks that run before any request

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod reports;
pub mod sync;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError, ClubBackend};
pub use auth::{CredentialStore, Session, SessionData};
pub use config::Config;
