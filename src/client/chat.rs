//! Local chat transcript for the trip assistant.
//!
//! The transcript is ordered and append-only, seeded with one synthetic
//! greeting, and lives only as long as the view does; nothing is
//! persisted across reloads. When the exchange fails, the user's own
//! line stays in the transcript and a local fallback reply is appended
//! in place of the assistant's.

use tracing::warn;

use crate::client::ApiClient;

pub const GREETING: &str =
    "Hi! I'm your trip assistant. Ask me anything about the plan, the crew or the budget.";

pub const FALLBACK_REPLY: &str =
    "I couldn't reach the trip assistant just now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage {
                sender: Sender::Assistant,
                text: GREETING.into(),
            }],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.sender == Sender::Assistant)
    }

    /// Sends one message. The user's line is appended before the request
    /// goes out, so it always precedes the reply and survives failures.
    pub async fn exchange(&mut self, api: &ApiClient, trip_id: i64, message: &str) {
        self.push(Sender::User, message);
        match api.chat(trip_id, message).await {
            Ok(reply) => self.push(Sender::Assistant, reply.response),
            Err(err) => {
                warn!(trip_id, "chat exchange failed: {err}");
                self.push(Sender::Assistant, FALLBACK_REPLY);
            }
        }
    }

    fn push(&mut self, sender: Sender, text: impl Into<String>) {
        self.messages.push(ChatMessage {
            sender,
            text: text.into(),
        });
    }
}
