//! Chat message model and the fixed texts the controller writes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::types::PromptMessage;

/// Sentinel id carried only by the pending assistant placeholder.
pub const PLACEHOLDER_ID: &str = "pending-reply";

/// What the placeholder shows while a reply is being produced.
pub const PLACEHOLDER_CONTENT: &str = "…";

/// Most recent messages kept in memory and in the store.
pub const HISTORY_LIMIT: usize = 100;

/// Shown in place of the reply when the model path fails.
pub const APOLOGY: &str =
    "Sorry, I couldn't come up with an answer just now. Please try asking again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl Message {
    fn with_fresh_id(role: Role, content: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4().to_string(), role, content: content.into() }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_fresh_id(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_fresh_id(Role::Assistant, content)
    }

    #[must_use]
    pub fn placeholder() -> Self {
        Self { id: PLACEHOLDER_ID.to_string(), role: Role::Assistant, content: PLACEHOLDER_CONTENT.to_string() }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_ID
    }

    #[must_use]
    pub fn to_prompt(&self) -> PromptMessage {
        PromptMessage::new(self.role.as_str(), self.content.clone())
    }
}

/// Drop the oldest entries so at most [`HISTORY_LIMIT`] remain.
pub fn prune(messages: &mut Vec<Message>) {
    if messages.len() > HISTORY_LIMIT {
        let excess = messages.len() - HISTORY_LIMIT;
        messages.drain(..excess);
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
