use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Greeting seeded into every new session
pub const GREETING: &str = "Hello! How can I assist you today?";

/// Substituted when the endpoint answers without a usable reply
pub const FALLBACK_REPLY: &str = "I didn't get a clear response.";

/// Id of the seeded greeting turn
pub const GREETING_ID: &str = "initial-bot-message";

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "AI",
        }
    }
}

/// Opaque turn identifier, only used for stable display ordering
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(String);

impl TurnId {
    /// Mint a fresh id such as `user-6f1c...`
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4()))
    }

    pub fn greeting() -> Self {
        Self(GREETING_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One message in the chat log.
///
/// Serializes to the wire shape `{id, text, sender}`; `created_at` is kept
/// locally for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub text: String,
    pub sender: Sender,
    #[serde(skip, default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnId::generate("user"), text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(TurnId::generate("bot"), text, Sender::Bot)
    }

    /// Bot-sender turn describing a failed request
    pub fn error(reason: impl fmt::Display) -> Self {
        Self::new(
            TurnId::generate("error"),
            format!("Oops! Could not connect to the AI. Error: {}", reason),
            Sender::Bot,
        )
    }

    pub fn greeting(text: impl Into<String>) -> Self {
        Self::new(TurnId::greeting(), text, Sender::Bot)
    }

    fn new(id: TurnId, text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
            created_at: Utc::now(),
        }
    }
}

/// State-change notifications published by the session controller
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A turn was appended to the log
    TurnAppended(Turn),
    /// A request started (`true`) or finished (`false`)
    PendingChanged(bool),
    /// The widget was opened (`true`) or closed (`false`)
    VisibilityChanged(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_serializes_to_wire_shape() {
        let turn = Turn::greeting(GREETING);
        let value = serde_json::to_value(&turn).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "id": "initial-bot-message",
                "text": "Hello! How can I assist you today?",
                "sender": "bot",
            })
        );
    }

    #[test]
    fn generated_ids_carry_prefix() {
        assert!(Turn::user("hi").id.as_str().starts_with("user-"));
        assert!(Turn::bot("hi").id.as_str().starts_with("bot-"));
        assert!(Turn::error("down").id.as_str().starts_with("error-"));
    }

    #[test]
    fn error_turn_embeds_reason() {
        let turn = Turn::error("Network down");
        assert_eq!(turn.sender, Sender::Bot);
        assert_eq!(turn.text, "Oops! Could not connect to the AI. Error: Network down");
    }
}
