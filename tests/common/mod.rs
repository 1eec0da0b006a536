//! Common Test Utilities
//!
//! Shared helpers and fixtures for the integration test suites.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use kportal_server::application::services::Claims;

/// Signing secret used by token tests. Long enough to satisfy the
/// same minimum the settings loader enforces.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Issue a signed access token for `user_id` that expires `ttl_secs`
/// from now. Negative values produce an already-expired token.
pub fn issue_access_token(user_id: i64, secret: &str, ttl_secs: i64) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encoding should not fail")
}

/// Generate a unique test email
pub fn unique_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

/// Generate a unique test username
pub fn unique_username() -> String {
    format!("user_{}", &uuid::Uuid::new_v4().to_string()[..8])
}
