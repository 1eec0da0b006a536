//! Repository Implementations
//!
//! PostgreSQL implementations of the domain repository traits. Each
//! repository handles data access for one entity family.

pub mod chat_repository;
pub mod comment_repository;
pub mod follow_repository;
pub mod language_repository;
pub mod like_repository;
pub mod password_reset_repository;
pub mod resource_repository;
pub mod session_repository;
pub mod stats_repository;
pub mod user_repository;

pub use chat_repository::PgChatRepository;
pub use comment_repository::PgCommentRepository;
pub use follow_repository::PgFollowRepository;
pub use language_repository::PgLanguageRepository;
pub use like_repository::PgLikeRepository;
pub use password_reset_repository::PgPasswordResetRepository;
pub use resource_repository::PgResourceRepository;
pub use session_repository::PgSessionRepository;
pub use stats_repository::{
    LanguageCount, PgStatsRepository, PortalTotals, StatsRepository, TopResource, UserStats,
};
pub use user_repository::PgUserRepository;
