//! Support chat, customer side.

use sqlx::PgPool;

use bloom_bouquet_core::{ChatSender, UserId};

use super::RepositoryError;
use crate::models::ChatMessage;

pub struct ChatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The whole conversation, oldest first. Staff replies are marked read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn thread(&self, user: UserId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE chat_messages SET is_read = TRUE WHERE user_id = $1 AND sender = $2 AND NOT is_read",
        )
        .bind(user)
        .bind(ChatSender::Admin)
        .execute(&mut *tx)
        .await?;

        let messages = sqlx::query_as::<_, ChatMessage>(
            r"
            SELECT id, sender, message, is_read, created_at
            FROM chat_messages
            WHERE user_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(user)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(messages)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn send(&self, user: UserId, message: &str) -> Result<ChatMessage, RepositoryError> {
        let row = sqlx::query_as::<_, ChatMessage>(
            r"
            INSERT INTO chat_messages (user_id, sender, message)
            VALUES ($1, $2, $3)
            RETURNING id, sender, message, is_read, created_at
            ",
        )
        .bind(user)
        .bind(ChatSender::User)
        .bind(message)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }
}
