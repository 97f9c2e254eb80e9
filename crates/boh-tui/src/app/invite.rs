//! Accepting an invitation: look up the token, then create the account.

use anyhow::Result;
use tracing::{info, warn};

use boh_core::api::detail_or;
use boh_core::models::{AuthResponse, Invite};
use boh_core::sync::Ticket;
use boh_core::validation::{validate_invite_form, validate_invite_token};
use boh_core::SessionData;

use super::form::TextInput;
use super::{App, AppState, Slot, TaskResult};

const INVALID_INVITE: &str = "Invalid or expired invitation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteFocus {
    Username,
    Password,
    Confirm,
    Button,
}

impl InviteFocus {
    pub fn next(&self) -> Self {
        match self {
            InviteFocus::Username => InviteFocus::Password,
            InviteFocus::Password => InviteFocus::Confirm,
            InviteFocus::Confirm => InviteFocus::Button,
            InviteFocus::Button => InviteFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            InviteFocus::Username => InviteFocus::Button,
            InviteFocus::Password => InviteFocus::Username,
            InviteFocus::Confirm => InviteFocus::Password,
            InviteFocus::Button => InviteFocus::Confirm,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InviteState {
    /// `None` when the link carried no usable token.
    pub token: Option<String>,
    pub invite: Option<Invite>,
    pub username: TextInput,
    pub password: TextInput,
    pub confirm: TextInput,
    pub focus: InviteFocus,
    pub error: Option<String>,
    pub loading: bool,
    pub submitting: bool,
}

impl InviteState {
    fn new(token: Option<String>) -> Self {
        Self {
            token,
            invite: None,
            username: TextInput::username(),
            password: TextInput::password(),
            confirm: TextInput::password(),
            focus: InviteFocus::Username,
            error: None,
            loading: false,
            submitting: false,
        }
    }

    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            InviteFocus::Username => Some(&mut self.username),
            InviteFocus::Password => Some(&mut self.password),
            InviteFocus::Confirm => Some(&mut self.confirm),
            InviteFocus::Button => None,
        }
    }
}

impl App {
    /// Show the invite form and look the token up.
    pub fn open_invite(&mut self, token: Option<String>) {
        self.state = AppState::AcceptingInvite;
        let token = match validate_invite_token(token.as_deref()) {
            Ok(token) => token.to_string(),
            Err(e) => {
                let mut invite = InviteState::new(None);
                invite.error = Some(e.to_string());
                self.invite = Some(invite);
                return;
            }
        };

        let mut invite = InviteState::new(Some(token.clone()));
        invite.loading = true;
        self.invite = Some(invite);

        let ticket = self.tracker.issue(Slot::Invite);
        let backend = self.base.clone();
        self.spawn(async move { TaskResult::Invite(ticket, backend.fetch_invite(&token).await) });
    }

    pub(super) fn on_invite(&mut self, ticket: Ticket<Slot>, result: Result<Invite>) {
        if !self.is_current(&ticket) {
            return;
        }
        let Some(state) = self.invite.as_mut() else {
            return;
        };
        state.loading = false;
        match result {
            Ok(invite) => {
                info!(role = %invite.role, "Invitation found");
                state.invite = Some(invite);
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Invitation lookup failed");
                let message = detail_or(&e, INVALID_INVITE);
                state.error = Some(message.clone());
                self.notifications.error(message);
            }
        }
    }

    /// Validate the account form and create the account.
    pub fn submit_invite(&mut self) {
        let Some(state) = self.invite.as_mut() else {
            return;
        };
        if state.submitting || state.loading {
            return;
        }
        let (Some(token), Some(_)) = (state.token.as_deref(), state.invite.as_ref()) else {
            state.error = Some(INVALID_INVITE.to_string());
            return;
        };
        let request = match validate_invite_form(
            token,
            state.username.value(),
            state.password.value(),
            state.confirm.value(),
        ) {
            Ok(request) => request,
            Err(e) => {
                state.error = Some(e.to_string());
                return;
            }
        };
        state.error = None;
        state.submitting = true;

        let backend = self.base.clone();
        info!(username = %request.username, "Accepting invitation");
        self.spawn(async move { TaskResult::InviteAccepted(backend.accept_invite(&request).await) });
    }

    pub(super) fn on_invite_accepted(&mut self, result: Result<AuthResponse>) {
        match result {
            Ok(auth) => {
                self.invite = None;
                self.state = AppState::Normal;
                self.login_username = auth.username.clone();
                self.notifications.success("Account created successfully!");
                self.establish_session(SessionData::from_auth(auth));
            }
            Err(e) => {
                if let Some(state) = self.invite.as_mut() {
                    state.submitting = false;
                }
                self.report_failure_with_detail(&e, "Failed to create account");
            }
        }
    }

    /// Abandon the invite and fall back to login when there is no session.
    pub fn close_invite(&mut self) {
        self.invite = None;
        if self.is_authenticated() {
            self.state = AppState::Normal;
        } else {
            self.start_login();
        }
    }
}
