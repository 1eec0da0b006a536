//! Chat Service
//!
//! Room creation, membership checks, history, and message persistence.
//! Shared between the REST handlers and the websocket gateway.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{ChatMessage, ChatRepository, ChatRoom, RoomType};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Not a room member")]
    NotMember,

    #[error("A direct room has exactly two members")]
    InvalidDirectRoom,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::RoomNotFound => AppError::NotFound("Room not found".into()),
            ChatError::NotMember => AppError::Forbidden("Not a room member".into()),
            ChatError::InvalidDirectRoom => {
                AppError::BadRequest("A direct room has exactly two members".into())
            }
            ChatError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Create a room with the creator plus the given members.
    async fn create_room(
        &self,
        creator_id: i64,
        name: &str,
        description: &str,
        room_type: RoomType,
        member_ids: Vec<i64>,
    ) -> Result<ChatRoom, ChatError>;

    async fn rooms_for_user(&self, user_id: i64) -> Result<Vec<ChatRoom>, ChatError>;

    async fn room_ids_for_user(&self, user_id: i64) -> Result<Vec<i64>, ChatError>;

    /// Message history, newest first. Members only.
    async fn messages(
        &self,
        room_id: i64,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>, ChatError>;

    /// Persist a message from a room member.
    async fn send_message(
        &self,
        room_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<ChatMessage, ChatError>;
}

pub struct ChatServiceImpl<C: ChatRepository> {
    chat_repo: Arc<C>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<C: ChatRepository> ChatServiceImpl<C> {
    pub fn new(chat_repo: Arc<C>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            chat_repo,
            id_generator,
        }
    }

    async fn require_member(&self, room_id: i64, user_id: i64) -> Result<(), ChatError> {
        let is_member = self
            .chat_repo
            .is_member(room_id, user_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        if is_member {
            Ok(())
        } else {
            Err(ChatError::NotMember)
        }
    }
}

#[async_trait]
impl<C: ChatRepository + 'static> ChatService for ChatServiceImpl<C> {
    async fn create_room(
        &self,
        creator_id: i64,
        name: &str,
        description: &str,
        room_type: RoomType,
        member_ids: Vec<i64>,
    ) -> Result<ChatRoom, ChatError> {
        let mut members = member_ids;
        if !members.contains(&creator_id) {
            members.push(creator_id);
        }
        members.sort_unstable();
        members.dedup();

        if room_type == RoomType::Direct && members.len() != 2 {
            return Err(ChatError::InvalidDirectRoom);
        }

        let room = ChatRoom {
            id: self.id_generator.generate(),
            name: name.to_string(),
            description: description.to_string(),
            room_type,
            created_at: Utc::now(),
        };

        self.chat_repo
            .create_room(&room, &members)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))
    }

    async fn rooms_for_user(&self, user_id: i64) -> Result<Vec<ChatRoom>, ChatError> {
        self.chat_repo
            .rooms_for_user(user_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))
    }

    async fn room_ids_for_user(&self, user_id: i64) -> Result<Vec<i64>, ChatError> {
        self.chat_repo
            .room_ids_for_user(user_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))
    }

    async fn messages(
        &self,
        room_id: i64,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.require_member(room_id, user_id).await?;

        self.chat_repo
            .messages_for_room(room_id, limit, offset)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))
    }

    async fn send_message(
        &self,
        room_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        self.require_member(room_id, user_id).await?;

        let message = ChatMessage {
            id: self.id_generator.generate(),
            room_id,
            user_id: Some(user_id),
            content: content.to_string(),
            created_at: Utc::now(),
        };

        self.chat_repo
            .create_message(&message)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::chat::MockChatRepository;

    fn service(chat_repo: MockChatRepository) -> ChatServiceImpl<MockChatRepository> {
        ChatServiceImpl::new(Arc::new(chat_repo), Arc::new(SnowflakeGenerator::new(1, 0)))
    }

    #[tokio::test]
    async fn test_direct_room_requires_two_members() {
        let svc = service(MockChatRepository::new());

        let result = svc
            .create_room(1, "dm", "", RoomType::Direct, vec![2, 3])
            .await;
        assert!(matches!(result, Err(ChatError::InvalidDirectRoom)));
    }

    #[tokio::test]
    async fn test_creator_is_always_a_member() {
        let mut chat_repo = MockChatRepository::new();
        chat_repo
            .expect_create_room()
            .withf(|_, members| members == [1, 2])
            .returning(|room, _| Ok(room.clone()));

        let svc = service(chat_repo);

        let room = svc
            .create_room(1, "dm", "", RoomType::Direct, vec![2])
            .await
            .unwrap();
        assert_eq!(room.room_type, RoomType::Direct);
    }

    #[tokio::test]
    async fn test_non_member_cannot_read_history() {
        let mut chat_repo = MockChatRepository::new();
        chat_repo.expect_is_member().returning(|_, _| Ok(false));

        let svc = service(chat_repo);

        let result = svc.messages(10, 99, 50, 0).await;
        assert!(matches!(result, Err(ChatError::NotMember)));
    }

    #[tokio::test]
    async fn test_member_message_is_persisted() {
        let mut chat_repo = MockChatRepository::new();
        chat_repo.expect_is_member().returning(|_, _| Ok(true));
        chat_repo
            .expect_create_message()
            .returning(|m| Ok(m.clone()));

        let svc = service(chat_repo);

        let message = svc.send_message(10, 1, "hello").await.unwrap();
        assert_eq!(message.room_id, 10);
        assert_eq!(message.user_id, Some(1));
        assert_eq!(message.content, "hello");
    }
}
