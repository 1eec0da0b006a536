//! Domain Entities
//!
//! Row-shaped entities and their repository traits. One file per table
//! family: users, sessions, languages, resources, likes, comments, follows,
//! password resets, and the chat tables.

pub mod chat;
pub mod comment;
pub mod follow;
pub mod language;
pub mod like;
pub mod password_reset;
pub mod resource;
pub mod session;
pub mod user;

pub use chat::{ChatMessage, ChatRepository, ChatRoom, RoomType};
pub use comment::{Comment, CommentRepository};
pub use follow::{Follow, FollowRepository};
pub use language::{Language, LanguageRepository};
pub use like::{Like, LikeRepository};
pub use password_reset::{PasswordReset, PasswordResetRepository};
pub use resource::{NewResource, Resource, ResourceFilter, ResourceKind, ResourceRepository};
pub use session::{Session, SessionRepository};
pub use user::{User, UserRepository};
