//! Authentication Service
//!
//! Handles user registration, credential authentication, JWT token
//! management, refresh token sessions, and the password reset flow.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::JwtSettings;
use crate::domain::{
    PasswordReset, PasswordResetRepository, Session, SessionRepository, User, UserRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(User, AuthTokens), AuthError>;

    /// Authenticate user with username + password
    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthTokens, AuthError>;

    /// Refresh access token using refresh token (rotates the token)
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;

    /// Revoke refresh token (logout)
    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Issue a password reset token for the given email. Returns None when
    /// no account matches, so callers can answer identically either way.
    async fn request_password_reset(&self, email: &str) -> Result<Option<ResetIssued>, AuthError>;

    /// Consume a reset token and set a new password. Revokes all sessions.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// A freshly issued password reset token, with the address to mail it to.
/// The raw token exists only here; the database stores its hash.
#[derive(Debug, Clone)]
pub struct ResetIssued {
    pub email: String,
    pub token: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Email already exists")]
    EmailExists,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
            AuthError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
            AuthError::EmailExists => AppError::Conflict("Email already exists".into()),
            AuthError::UsernameExists => AppError::Conflict("Username already exists".into()),
            AuthError::SessionNotFound => {
                AppError::Unauthorized("Invalid or expired refresh token".into())
            }
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// AuthService implementation
pub struct AuthServiceImpl<U, S, P>
where
    U: UserRepository,
    S: SessionRepository,
    P: PasswordResetRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    reset_repo: Arc<P>,
    id_generator: Arc<SnowflakeGenerator>,
    jwt_settings: JwtSettings,
}

impl<U, S, P> AuthServiceImpl<U, S, P>
where
    U: UserRepository,
    S: SessionRepository,
    P: PasswordResetRepository,
{
    /// Create a new AuthServiceImpl
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        reset_repo: Arc<P>,
        id_generator: Arc<SnowflakeGenerator>,
        jwt_settings: JwtSettings,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            reset_repo,
            id_generator,
            jwt_settings,
        }
    }

    /// Hash a password using Argon2id
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: i64) -> Result<AuthTokens, AuthError> {
        let now = Utc::now();
        let access_expiry = now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes);

        let access_claims = Claims {
            sub: user_id.to_string(),
            exp: access_expiry.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        // Opaque refresh token, no user data embedded
        let refresh_token = format!("{}.{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.jwt_settings.access_token_expiry_minutes * 60,
            token_type: "Bearer".to_string(),
        })
    }

    /// Hash an opaque token (refresh or reset) for storage
    fn hash_opaque_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Persist a refresh token session for a user
    async fn store_session(&self, user_id: i64, tokens: &AuthTokens) -> Result<(), AuthError> {
        let token_hash = self.hash_opaque_token(&tokens.refresh_token);
        let session = Session::new(
            self.id_generator.generate(),
            user_id,
            token_hash,
            Utc::now() + Duration::days(self.jwt_settings.refresh_token_expiry_days),
        );

        self.session_repo
            .create(&session)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl<U, S, P> AuthService for AuthServiceImpl<U, S, P>
where
    U: UserRepository + 'static,
    S: SessionRepository + 'static,
    P: PasswordResetRepository + 'static,
{
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(User, AuthTokens), AuthError> {
        if self
            .user_repo
            .email_exists(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::EmailExists);
        }

        if self
            .user_repo
            .username_exists(username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::UsernameExists);
        }

        let password_hash = self.hash_password(password)?;

        let now = Utc::now();
        let user = User {
            id: self.id_generator.generate(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            profile_picture_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        };

        let created_user = self
            .user_repo
            .create(&user)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let tokens = self.generate_tokens(created_user.id)?;
        self.store_session(created_user.id, &tokens).await?;

        Ok((created_user, tokens))
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthTokens, AuthError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.generate_tokens(user.id)?;
        self.store_session(user.id, &tokens).await?;

        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let token_hash = self.hash_opaque_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        if !session.is_active() {
            return Err(AuthError::TokenExpired);
        }

        // Token rotation: the old refresh token dies with this call
        let new_tokens = self.generate_tokens(session.user_id)?;
        let new_token_hash = self.hash_opaque_token(&new_tokens.refresh_token);
        let new_expires_at =
            Utc::now() + Duration::days(self.jwt_settings.refresh_token_expiry_days);

        self.session_repo
            .update_token_hash(session.id, &new_token_hash, new_expires_at)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(new_tokens)
    }

    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        let token_hash = self.hash_opaque_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        self.session_repo
            .revoke(session.id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<Option<ResetIssued>, AuthError> {
        let Some(user) = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        else {
            // Caller answers as if mail was sent; account existence stays hidden
            return Ok(None);
        };

        let token = format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple());
        let reset = PasswordReset {
            id: self.id_generator.generate(),
            user_id: user.id,
            token_hash: self.hash_opaque_token(&token),
            expires_at: Utc::now()
                + Duration::minutes(self.jwt_settings.password_reset_expiry_minutes),
            used_at: None,
            created_at: Utc::now(),
        };

        self.reset_repo
            .create(&reset)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(Some(ResetIssued {
            email: user.email,
            token,
        }))
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let token_hash = self.hash_opaque_token(token);

        let reset = self
            .reset_repo
            .find_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidToken)?;

        if !reset.is_usable() {
            return Err(AuthError::TokenExpired);
        }

        let password_hash = self.hash_password(new_password)?;

        self.user_repo
            .update_password(reset.user_id, &password_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.reset_repo
            .mark_used(reset.id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        // Existing sessions stop working after a reset
        self.session_repo
            .revoke_all_for_user(reset.user_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Decode and validate an access token against the configured secret.
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::password_reset::MockPasswordResetRepository;
    use crate::domain::entities::session::MockSessionRepository;
    use crate::domain::entities::user::MockUserRepository;
    use mockall::predicate::eq;

    fn jwt_settings() -> JwtSettings {
        JwtSettings {
            secret: "a-test-secret-that-is-long-enough!!".into(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
            password_reset_expiry_minutes: 30,
        }
    }

    fn service(
        user_repo: MockUserRepository,
        session_repo: MockSessionRepository,
        reset_repo: MockPasswordResetRepository,
    ) -> AuthServiceImpl<MockUserRepository, MockSessionRepository, MockPasswordResetRepository>
    {
        AuthServiceImpl::new(
            Arc::new(user_repo),
            Arc::new(session_repo),
            Arc::new(reset_repo),
            Arc::new(SnowflakeGenerator::new(1, 0)),
            jwt_settings(),
        )
    }

    fn sample_user(password_hash: String) -> User {
        let now = Utc::now();
        User {
            id: 42,
            username: "jdoe".into(),
            email: "jdoe@example.com".into(),
            password_hash,
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            profile_picture_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_register_rejects_existing_email() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_email_exists()
            .with(eq("jdoe@example.com"))
            .returning(|_| Ok(true));

        let svc = service(
            user_repo,
            MockSessionRepository::new(),
            MockPasswordResetRepository::new(),
        );

        let result = svc
            .register("jdoe", "jdoe@example.com", "password123", "Jane", "Doe")
            .await;
        assert!(matches!(result, Err(AuthError::EmailExists)));
    }

    #[tokio::test]
    async fn test_register_rejects_existing_username() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_email_exists().returning(|_| Ok(false));
        user_repo
            .expect_username_exists()
            .with(eq("jdoe"))
            .returning(|_| Ok(true));

        let svc = service(
            user_repo,
            MockSessionRepository::new(),
            MockPasswordResetRepository::new(),
        );

        let result = svc
            .register("jdoe", "jdoe@example.com", "password123", "Jane", "Doe")
            .await;
        assert!(matches!(result, Err(AuthError::UsernameExists)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user_fails() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_username().returning(|_| Ok(None));

        let svc = service(
            user_repo,
            MockSessionRepository::new(),
            MockPasswordResetRepository::new(),
        );

        let result = svc.authenticate("ghost", "password123").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_fails() {
        let hash = {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(b"correct-password", &salt)
                .unwrap()
                .to_string()
        };

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_username()
            .returning(move |_| Ok(Some(sample_user(hash.clone()))));

        let svc = service(
            user_repo,
            MockSessionRepository::new(),
            MockPasswordResetRepository::new(),
        );

        let result = svc.authenticate("jdoe", "wrong-password").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_success_issues_bearer_tokens() {
        let hash = {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(b"correct-password", &salt)
                .unwrap()
                .to_string()
        };

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_username()
            .returning(move |_| Ok(Some(sample_user(hash.clone()))));

        let mut session_repo = MockSessionRepository::new();
        session_repo
            .expect_create()
            .returning(|s| Ok(s.clone()));

        let svc = service(user_repo, session_repo, MockPasswordResetRepository::new());

        let tokens = svc.authenticate("jdoe", "correct-password").await.unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert!(!tokens.access_token.is_empty());

        // Access token round-trips through validation
        let claims =
            decode_access_token(&tokens.access_token, &jwt_settings().secret).unwrap();
        assert_eq!(claims.sub, "42");
    }

    fn sha256_hex(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    #[tokio::test]
    async fn test_refresh_rotates_the_session_token() {
        let old_hash = sha256_hex("old-refresh-token");
        let lookup_hash = old_hash.clone();
        let stored_hash = old_hash.clone();

        let mut session_repo = MockSessionRepository::new();
        session_repo
            .expect_find_by_token_hash()
            .withf(move |h| h == lookup_hash)
            .returning(move |_| {
                Ok(Some(Session::new(
                    7,
                    42,
                    stored_hash.clone(),
                    Utc::now() + Duration::days(7),
                )))
            });
        session_repo
            .expect_update_token_hash()
            .withf(move |id, new_hash, _expires| *id == 7 && *new_hash != old_hash)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = service(
            MockUserRepository::new(),
            session_repo,
            MockPasswordResetRepository::new(),
        );

        let tokens = svc.refresh_token("old-refresh-token").await.unwrap();
        assert_ne!(tokens.refresh_token, "old-refresh-token");
        assert!(!tokens.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_with_revoked_session_fails() {
        let mut session_repo = MockSessionRepository::new();
        session_repo.expect_find_by_token_hash().returning(|_| {
            let mut session = Session::new(7, 42, "hash".into(), Utc::now() + Duration::days(7));
            session.revoked_at = Some(Utc::now());
            Ok(Some(session))
        });

        let svc = service(
            MockUserRepository::new(),
            session_repo,
            MockPasswordResetRepository::new(),
        );

        let result = svc.refresh_token("revoked-token").await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_refresh_with_unknown_token_fails() {
        let mut session_repo = MockSessionRepository::new();
        session_repo
            .expect_find_by_token_hash()
            .returning(|_| Ok(None));

        let svc = service(
            MockUserRepository::new(),
            session_repo,
            MockPasswordResetRepository::new(),
        );

        let result = svc.refresh_token("never-issued").await;
        assert!(matches!(result, Err(AuthError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_revoke_token_revokes_the_session() {
        let mut session_repo = MockSessionRepository::new();
        session_repo.expect_find_by_token_hash().returning(|_| {
            Ok(Some(Session::new(
                7,
                42,
                "hash".into(),
                Utc::now() + Duration::days(7),
            )))
        });
        session_repo
            .expect_revoke()
            .with(eq(7_i64))
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(
            MockUserRepository::new(),
            session_repo,
            MockPasswordResetRepository::new(),
        );

        svc.revoke_token("live-token").await.unwrap();
    }

    #[tokio::test]
    async fn test_password_reset_request_hides_unknown_email() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_email().returning(|_| Ok(None));

        let svc = service(
            user_repo,
            MockSessionRepository::new(),
            MockPasswordResetRepository::new(),
        );

        let issued = svc
            .request_password_reset("ghost@example.com")
            .await
            .unwrap();
        assert!(issued.is_none());
    }

    #[tokio::test]
    async fn test_reset_password_with_used_token_fails() {
        let mut reset_repo = MockPasswordResetRepository::new();
        reset_repo.expect_find_by_token_hash().returning(|_| {
            Ok(Some(PasswordReset {
                id: 1,
                user_id: 42,
                token_hash: "h".into(),
                expires_at: Utc::now() + Duration::minutes(10),
                used_at: Some(Utc::now()),
                created_at: Utc::now(),
            }))
        });

        let svc = service(
            MockUserRepository::new(),
            MockSessionRepository::new(),
            reset_repo,
        );

        let result = svc.reset_password("some-token", "new-password-123").await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }
}
