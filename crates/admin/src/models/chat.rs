//! Customer support chat.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bloom_bouquet_core::{AdminId, ChatMessageId, ChatSender, Email, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub user_id: UserId,
    pub admin_id: Option<AdminId>,
    pub sender: ChatSender,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// One customer's thread in the support inbox.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Conversation {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: Email,
    pub last_message: String,
    pub last_message_at: DateTime<Utc>,
    /// Customer messages staff have not opened yet.
    pub unread_count: i64,
}
