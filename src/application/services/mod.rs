//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Authentication, JWT tokens, password reset
//! - **UserService**: User profile management
//! - **ResourceService**: Resource CRUD, feed, file metadata
//! - **SocialService**: Likes, comments, follows, notification mail
//! - **StatsService**: Aggregate statistics with Redis caching
//! - **ChatService**: Chat rooms and persisted messages

pub mod auth_service;
pub mod chat_service;
pub mod resource_service;
pub mod social_service;
pub mod stats_service;
pub mod user_service;

pub use auth_service::{
    decode_access_token, AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims, ResetIssued,
};
pub use chat_service::{ChatError, ChatService, ChatServiceImpl};
pub use resource_service::{
    CreateResourceDto, FileMetadataDto, ResourceError, ResourceService, ResourceServiceImpl,
    UpdateResourceDto,
};
pub use social_service::{SocialError, SocialService, SocialServiceImpl};
pub use stats_service::{PortalStatsDto, StatsService, StatsServiceImpl};
pub use user_service::{UpdateProfileDto, UserError, UserService, UserServiceImpl};
