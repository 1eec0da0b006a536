//! Chat room and message entities with their repository trait.
//!
//! Rooms are either direct (two members) or group. Messages keep their row
//! when the author account is deleted (user_id goes NULL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Room type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Direct,
    Group,
}

impl RoomType {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "direct" => Self::Direct,
            _ => Self::Group,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Group => "group",
        }
    }
}

/// Chat room, maps to the `chat_rooms` table.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRoom {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub room_type: RoomType,
    pub created_at: DateTime<Utc>,
}

/// Chat message, maps to the `chat_messages` table.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: i64,
    /// None when the author account was deleted
    pub user_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for rooms, memberships, and messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Create a room and insert its member rows.
    async fn create_room(&self, room: &ChatRoom, member_ids: &[i64])
        -> Result<ChatRoom, AppError>;

    /// Rooms the user belongs to.
    async fn rooms_for_user(&self, user_id: i64) -> Result<Vec<ChatRoom>, AppError>;

    /// Room IDs the user belongs to (gateway subscription set).
    async fn room_ids_for_user(&self, user_id: i64) -> Result<Vec<i64>, AppError>;

    /// Member user IDs of a room.
    async fn member_ids(&self, room_id: i64) -> Result<Vec<i64>, AppError>;

    /// Whether the user is a member of the room.
    async fn is_member(&self, room_id: i64, user_id: i64) -> Result<bool, AppError>;

    /// Persist a message.
    async fn create_message(&self, message: &ChatMessage) -> Result<ChatMessage, AppError>;

    /// Message history for a room, newest first.
    async fn messages_for_room(
        &self,
        room_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_from_str() {
        assert_eq!(RoomType::from_str("direct"), RoomType::Direct);
        assert_eq!(RoomType::from_str("group"), RoomType::Group);
        // Unknown types default to group
        assert_eq!(RoomType::from_str("broadcast"), RoomType::Group);
    }
}
