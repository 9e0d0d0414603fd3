//! Support chat repository (staff side).

use sqlx::PgPool;

use bloom_bouquet_core::{AdminId, ChatSender, UserId};

use super::RepositoryError;
use crate::models::{ChatMessage, Conversation};

const MESSAGE_COLUMNS: &str = "id, user_id, admin_id, sender, message, is_read, created_at";

/// Repository for chat database operations.
pub struct ChatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One row per customer who has chatted, most recent activity first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn conversations(&self) -> Result<Vec<Conversation>, RepositoryError> {
        let mut rows = sqlx::query_as::<_, Conversation>(
            r"
            SELECT DISTINCT ON (m.user_id)
                   m.user_id, u.name AS user_name, u.email AS user_email,
                   m.message AS last_message, m.created_at AS last_message_at,
                   (SELECT COUNT(*) FROM chat_messages x
                     WHERE x.user_id = m.user_id AND x.sender = 'user' AND NOT x.is_read
                   ) AS unread_count
            FROM chat_messages m
            JOIN users u ON u.id = m.user_id
            ORDER BY m.user_id, m.created_at DESC, m.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(rows)
    }

    /// Full thread with one customer, oldest first. Marks the customer's
    /// messages as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn thread(&self, user_id: UserId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "UPDATE chat_messages SET is_read = TRUE WHERE user_id = $1 AND sender = 'user' AND NOT is_read",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        let messages = sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(messages)
    }

    /// Post a staff reply.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn reply(
        &self,
        user_id: UserId,
        admin_id: AdminId,
        message: &str,
    ) -> Result<ChatMessage, RepositoryError> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            r"
            INSERT INTO chat_messages (user_id, admin_id, sender, message)
            SELECT id, $2, $3, $4 FROM users WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(admin_id)
        .bind(ChatSender::Admin)
        .bind(message)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
