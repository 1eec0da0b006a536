//! Password reset token entity and repository trait.
//!
//! Tokens are single-use and expiring. Like refresh tokens, only the SHA-256
//! hash of the opaque token is stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::error::AppError;

/// Password reset token, maps to the `password_resets` table.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub id: i64,
    pub user_id: i64,
    /// SHA-256 hex digest of the opaque reset token
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    /// A token is usable when it has not been consumed and has not expired.
    pub fn is_usable(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Repository trait for password reset tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Persist a new reset token.
    async fn create(&self, reset: &PasswordReset) -> Result<PasswordReset, AppError>;

    /// Look up a reset token by hash.
    async fn find_by_token_hash(&self, token_hash: &str)
        -> Result<Option<PasswordReset>, AppError>;

    /// Consume a token so it cannot be reused.
    async fn mark_used(&self, id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reset(expires_in: Duration, used: bool) -> PasswordReset {
        PasswordReset {
            id: 1,
            user_id: 2,
            token_hash: "hash".into(),
            expires_at: Utc::now() + expires_in,
            used_at: used.then(Utc::now),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_token_is_usable() {
        assert!(reset(Duration::minutes(30), false).is_usable());
    }

    #[test]
    fn test_used_token_is_not_usable() {
        assert!(!reset(Duration::minutes(30), true).is_usable());
    }

    #[test]
    fn test_expired_token_is_not_usable() {
        assert!(!reset(Duration::minutes(-1), false).is_usable());
    }
}
