//! Session entity and repository trait.
//!
//! A session row stores the SHA-256 hash of an opaque refresh token. Tokens
//! rotate on every refresh; revocation sets `revoked_at`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::error::AppError;

/// Refresh token session, maps to the `sessions` table.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    /// SHA-256 hex digest of the opaque refresh token
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: i64, user_id: i64, token_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            token_hash,
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        }
    }

    /// A session is active when it is neither revoked nor expired.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Repository trait for refresh token sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session.
    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    /// Look up a session by refresh token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// Rotate the refresh token: replace hash and expiry in place.
    async fn update_token_hash(
        &self,
        id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Revoke a session (logout).
    async fn revoke(&self, id: i64) -> Result<(), AppError>;

    /// Revoke every session belonging to a user (password change).
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fresh_session_is_active() {
        let session = Session::new(1, 2, "hash".into(), Utc::now() + Duration::days(7));
        assert!(session.is_active());
    }

    #[test]
    fn test_expired_session_is_not_active() {
        let session = Session::new(1, 2, "hash".into(), Utc::now() - Duration::minutes(1));
        assert!(!session.is_active());
    }

    #[test]
    fn test_revoked_session_is_not_active() {
        let mut session = Session::new(1, 2, "hash".into(), Utc::now() + Duration::days(7));
        session.revoked_at = Some(Utc::now());
        assert!(!session.is_active());
    }
}
