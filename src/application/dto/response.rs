//! Response DTOs
//!
//! Data structures for API response bodies. IDs go over the wire as
//! strings so JavaScript clients never lose snowflake precision.

use serde::Serialize;

use crate::application::services::{AuthTokens, FileMetadataDto, PortalStatsDto};
use crate::domain::{ChatMessage, ChatRoom, Comment, Language, Resource, User};
use crate::infrastructure::repositories::UserStats;

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Registration response (user and tokens)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// User response. Email is only included for the account owner.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: User, include_email: bool) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: if include_email { Some(user.email) } else { None },
            first_name: user.first_name,
            last_name: user.last_name,
            profile_picture_url: user.profile_picture_url,
            bio: user.bio,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Resource response
#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub id: String,
    pub owner_id: String,
    pub language_id: String,
    pub kind: String,
    pub caption: String,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Resource> for ResourceResponse {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id.to_string(),
            owner_id: r.owner_id.to_string(),
            language_id: r.language_id.to_string(),
            kind: r.kind.as_str().to_string(),
            caption: r.caption,
            topic: r.topic,
            url: r.url,
            file_name: r.file_name,
            file_size_bytes: r.file_size_bytes,
            title: r.title,
            photo_url: r.photo_url,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

/// Comment response
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub user_id: String,
    pub resource_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id.to_string(),
            user_id: c.user_id.to_string(),
            resource_id: c.resource_id.to_string(),
            content: c.content,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Language response
#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub id: String,
    pub name: String,
    pub shorty: String,
    pub description: String,
}

impl From<Language> for LanguageResponse {
    fn from(l: Language) -> Self {
        Self {
            id: l.id.to_string(),
            name: l.name,
            shorty: l.shorty,
            description: l.description,
        }
    }
}

/// Derived file metadata response
#[derive(Debug, Serialize)]
pub struct FileMetadataResponse {
    #[serde(rename = "type")]
    pub extension: String,
    #[serde(rename = "size")]
    pub size_mib: f64,
    pub title: String,
}

impl From<FileMetadataDto> for FileMetadataResponse {
    fn from(m: FileMetadataDto) -> Self {
        Self {
            extension: m.extension,
            size_mib: m.size_mib,
            title: m.title,
        }
    }
}

/// Portal-wide statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_resources: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_follows: i64,
    pub resources_per_language: Vec<LanguageCountResponse>,
    pub top_resources: Vec<TopResourceResponse>,
}

#[derive(Debug, Serialize)]
pub struct LanguageCountResponse {
    pub language_id: String,
    pub language_name: String,
    pub resource_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TopResourceResponse {
    pub resource_id: String,
    pub owner_id: String,
    pub caption: String,
    pub like_count: i64,
}

impl From<PortalStatsDto> for StatsResponse {
    fn from(stats: PortalStatsDto) -> Self {
        Self {
            total_users: stats.totals.users,
            total_resources: stats.totals.resources,
            total_likes: stats.totals.likes,
            total_comments: stats.totals.comments,
            total_follows: stats.totals.follows,
            resources_per_language: stats
                .resources_per_language
                .into_iter()
                .map(|lc| LanguageCountResponse {
                    language_id: lc.language_id.to_string(),
                    language_name: lc.language_name,
                    resource_count: lc.resource_count,
                })
                .collect(),
            top_resources: stats
                .top_resources
                .into_iter()
                .map(|tr| TopResourceResponse {
                    resource_id: tr.resource_id.to_string(),
                    owner_id: tr.owner_id.to_string(),
                    caption: tr.caption,
                    like_count: tr.like_count,
                })
                .collect(),
        }
    }
}

/// Per-user statistics response
#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    pub resources_shared: i64,
    pub likes_received: i64,
    pub comments_received: i64,
    pub followers: i64,
    pub following: i64,
}

impl From<UserStats> for UserStatsResponse {
    fn from(s: UserStats) -> Self {
        Self {
            resources_shared: s.resources_shared,
            likes_received: s.likes_received,
            comments_received: s.comments_received,
            followers: s.followers,
            following: s.following,
        }
    }
}

/// Combined search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub users: Vec<UserResponse>,
    pub resources: Vec<ResourceResponse>,
}

/// GPT completion response
#[derive(Debug, Serialize)]
pub struct GptResponse {
    pub response: String,
}

/// Chat room response
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub room_type: String,
    pub created_at: String,
}

impl From<ChatRoom> for RoomResponse {
    fn from(room: ChatRoom) -> Self {
        Self {
            id: room.id.to_string(),
            name: room.name,
            description: room.description,
            room_type: room.room_type.as_str().to_string(),
            created_at: room.created_at.to_rfc3339(),
        }
    }
}

/// Chat message response
#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub id: String,
    pub room_id: String,
    /// Null when the author account was deleted
    pub user_id: Option<String>,
    pub content: String,
    pub created_at: String,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id.to_string(),
            room_id: m.room_id.to_string(),
            user_id: m.user_id.map(|id| id.to_string()),
            content: m.content,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Generic acknowledgement response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
