use anyhow::Result;
use tracing::{debug, error};

use boh_core::api::is_unauthorized;
use boh_core::models::Transcript;

use super::form::{push_limited, MAX_TEXT_LENGTH};
use super::{App, AppState, TaskResult};

/// Assistant conversation plus the line being typed.
#[derive(Debug, Default)]
pub struct ChatState {
    pub transcript: Transcript,
    pub input: String,
    /// Lines scrolled up from the bottom.
    pub scroll: usize,
}

impl ChatState {
    pub fn push_input(&mut self, c: char) {
        push_limited(&mut self.input, c, MAX_TEXT_LENGTH);
    }
}

impl App {
    pub fn start_chat_input(&mut self) {
        self.state = AppState::Editing;
    }

    /// Send the typed message. Blank input, or input while a reply is
    /// pending, is ignored.
    pub fn send_chat(&mut self) {
        let Some(message) = self.chat.transcript.begin_send(&self.chat.input) else {
            return;
        };
        self.chat.input.clear();
        self.chat.scroll = 0;

        let backend = self.backend.clone();
        debug!(length = message.len(), "Sending chat message");
        self.spawn(async move { TaskResult::ChatReply(backend.send_chat(&message).await) });
    }

    pub(super) fn on_chat_reply(&mut self, result: Result<String>) {
        self.chat.scroll = 0;
        match result {
            Ok(reply) => self.chat.transcript.finish(Some(reply)),
            Err(e) => {
                self.chat.transcript.finish(None);
                if is_unauthorized(&e) {
                    self.expire_session();
                } else {
                    error!(error = %format!("{:#}", e), "Chat request failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake::{test_app, Failure, FakeBackend};
    use super::*;
    use boh_core::models::chat::APOLOGY;
    use boh_core::models::ChatRole;

    #[tokio::test]
    async fn test_chat_round_trip() {
        let fake = FakeBackend::with(|s| s.chat_reply = Some("Church is Sunday.".into()));
        let (mut app, _dir) = test_app(&fake, Some("member"));

        app.chat.input = "  when is church?  ".into();
        app.send_chat();
        assert!(app.chat.input.is_empty());
        assert!(app.chat.transcript.is_awaiting_reply());

        app.chat.input = "again".into();
        app.send_chat();
        assert_eq!(app.chat.input, "again", "ignored while a reply is pending");
        app.settle().await;

        let messages = app.chat.transcript.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "when is church?");
        assert_eq!(messages[2].role, ChatRole::Assistant);
        assert_eq!(messages[2].content, "Church is Sunday.");
        assert_eq!(fake.call_count("send_chat"), 1);
    }

    #[tokio::test]
    async fn test_failed_chat_appends_apology() {
        let fake = FakeBackend::new();
        fake.fail("send_chat", Failure::Server);
        let (mut app, _dir) = test_app(&fake, Some("member"));

        app.chat.input = "hello".into();
        app.send_chat();
        app.settle().await;

        let last = app.chat.transcript.messages().last().expect("reply recorded");
        assert_eq!(last.content, APOLOGY);
        assert!(!app.chat.transcript.is_awaiting_reply());
        assert_eq!(app.notifications.len(), 0);
    }
}
