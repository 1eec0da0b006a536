//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a user account in the portal.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - first_name / last_name: VARCHAR(30) NOT NULL
/// - profile_picture_url: TEXT NULL
/// - bio: TEXT NULL
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// URL to the user's profile picture
    pub profile_picture_url: Option<String>,

    /// Free-text bio
    pub bio: Option<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Full display name ("First Last").
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Repository trait for User data access operations.
///
/// Implementations handle the actual database interactions. The trait lives
/// in the domain layer to maintain dependency inversion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Create a new user in the database.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Update an existing user's profile fields.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Delete a user by ID (cascades resources, likes, follows).
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check if a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Replace the stored password hash.
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError>;

    /// Case-insensitive substring search over usernames.
    async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let user = User {
            id: 1,
            username: "jdoe".into(),
            email: "jdoe@example.com".into(),
            password_hash: String::new(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            profile_picture_url: None,
            bio: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            username: "jdoe".into(),
            email: "jdoe@example.com".into(),
            password_hash: "secret-hash".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            profile_picture_url: None,
            bio: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
