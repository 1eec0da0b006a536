//! Chat Repository Implementation
//!
//! Rooms, memberships, and persisted messages. Room creation inserts the
//! room and its member rows inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ChatMessage, ChatRepository, ChatRoom, RoomType};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ChatRoomRow {
    id: i64,
    name: String,
    description: String,
    room_type: String,
    created_at: DateTime<Utc>,
}

impl ChatRoomRow {
    fn into_room(self) -> ChatRoom {
        ChatRoom {
            id: self.id,
            name: self.name,
            description: self.description,
            room_type: RoomType::from_str(&self.room_type),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChatMessageRow {
    id: i64,
    room_id: i64,
    user_id: Option<i64>,
    content: String,
    created_at: DateTime<Utc>,
}

impl ChatMessageRow {
    fn into_message(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            room_id: self.room_id,
            user_id: self.user_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL chat repository implementation.
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn create_room(
        &self,
        room: &ChatRoom,
        member_ids: &[i64],
    ) -> Result<ChatRoom, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ChatRoomRow>(
            r#"
            INSERT INTO chat_rooms (id, name, description, room_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, room_type, created_at
            "#,
        )
        .bind(room.id)
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.room_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for user_id in member_ids {
            sqlx::query(
                "INSERT INTO chat_room_members (room_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(room.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(row.into_room())
    }

    async fn rooms_for_user(&self, user_id: i64) -> Result<Vec<ChatRoom>, AppError> {
        let rows = sqlx::query_as::<_, ChatRoomRow>(
            r#"
            SELECT r.id, r.name, r.description, r.room_type, r.created_at
            FROM chat_rooms r
            INNER JOIN chat_room_members m ON m.room_id = r.id
            WHERE m.user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_room()).collect())
    }

    async fn room_ids_for_user(&self, user_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT room_id FROM chat_room_members WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn member_ids(&self, room_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM chat_room_members WHERE room_id = $1",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn is_member(&self, room_id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM chat_room_members WHERE room_id = $1 AND user_id = $2)",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn create_message(&self, message: &ChatMessage) -> Result<ChatMessage, AppError> {
        let row = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            INSERT INTO chat_messages (id, room_id, user_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, room_id, user_id, content, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.room_id)
        .bind(message.user_id)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    async fn messages_for_room(
        &self,
        room_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let rows = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            SELECT id, room_id, user_id, content, created_at
            FROM chat_messages
            WHERE room_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(room_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }
}
