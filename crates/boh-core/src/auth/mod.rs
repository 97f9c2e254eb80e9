//! Authentication module for session context and stored credentials.
//!
//! This module provides:
//! - `Session`: the bearer token plus username and role, persisted in the
//!   cache directory until logout or a 401
//! - `CredentialStore`: OS keychain storage for the remembered password

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
