//! Support chat as seen by the customer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bloom_bouquet_core::{ChatMessageId, ChatSender};

use crate::error::FieldErrors;

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub sender: ChatSender,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub message: String,
}

impl NewMessage {
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("message", &self.message, "The message field is required.");
        if self.message.chars().count() > MAX_MESSAGE_LENGTH {
            errors.add(
                "message",
                format!("The message may not be greater than {MAX_MESSAGE_LENGTH} characters."),
            );
        }
        errors
    }
}
