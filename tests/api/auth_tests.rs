//! Authentication API Tests
//!
//! Token codec behavior and request validation for the auth endpoints.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use kportal_server::application::dto::{SigninRequest, SignupRequest};
use kportal_server::application::services::{decode_access_token, AuthError};
use kportal_server::shared::error::AppError;
use pretty_assertions::assert_eq;
use validator::Validate;

use crate::common::{issue_access_token, unique_email, unique_username, TEST_JWT_SECRET};

/// Test a freshly issued token decodes back to its claims
#[tokio::test]
async fn test_valid_token_decodes_to_claims() {
    let token = issue_access_token(42, TEST_JWT_SECRET, 900);

    let claims = decode_access_token(&token, TEST_JWT_SECRET).expect("token should decode");

    assert_eq!(claims.sub, "42");
    assert!(claims.exp > claims.iat);
}

/// Test an expired token is rejected as expired, not merely invalid
#[tokio::test]
async fn test_expired_token_is_rejected() {
    // Well past the decoder's clock-skew leeway
    let token = issue_access_token(42, TEST_JWT_SECRET, -3600);

    let err = decode_access_token(&token, TEST_JWT_SECRET).unwrap_err();

    assert!(matches!(err, AuthError::TokenExpired));
}

/// Test a token signed with a different secret is rejected
#[tokio::test]
async fn test_token_with_wrong_secret_is_rejected() {
    let token = issue_access_token(42, "some-other-secret-0123456789abcdef", 900);

    let err = decode_access_token(&token, TEST_JWT_SECRET).unwrap_err();

    assert!(matches!(err, AuthError::InvalidToken));
}

/// Test garbage input is rejected
#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let err = decode_access_token("not.a.jwt", TEST_JWT_SECRET).unwrap_err();

    assert!(matches!(err, AuthError::InvalidToken));
}

/// Test auth errors surface as the right HTTP statuses
#[test]
fn test_auth_errors_map_to_http_statuses() {
    let cases = [
        (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
        (AuthError::TokenExpired, StatusCode::UNAUTHORIZED),
        (AuthError::EmailExists, StatusCode::CONFLICT),
        (AuthError::UsernameExists, StatusCode::CONFLICT),
        (AuthError::SessionNotFound, StatusCode::UNAUTHORIZED),
    ];

    for (err, expected) in cases {
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), expected);
    }
}

/// Test signup validation accepts a well-formed request
#[test]
fn test_signup_request_with_valid_data_passes_validation() {
    let request = SignupRequest {
        username: unique_username(),
        email: unique_email(),
        password: "ValidPassword123!".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
    };

    assert!(request.validate().is_ok());
}

/// Test signup validation rejects a malformed email
#[test]
fn test_signup_request_with_invalid_email_fails_validation() {
    let request = SignupRequest {
        username: unique_username(),
        email: "not-an-email".into(),
        password: "ValidPassword123!".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("email"));
}

/// Test signup validation rejects a short password
#[test]
fn test_signup_request_with_short_password_fails_validation() {
    let request = SignupRequest {
        username: unique_username(),
        email: unique_email(),
        password: "short".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("password"));
}

/// Test signin validation rejects a one-character username
#[test]
fn test_signin_request_with_short_username_fails_validation() {
    let request = SigninRequest {
        username: "x".into(),
        password: "ValidPassword123!".into(),
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("username"));
}
