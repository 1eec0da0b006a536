//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use serde::Deserialize;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 64, message = "Last name must be 1-64 characters"))]
    pub last_name: String,
}

/// Login request (username + password)
#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Password reset request (step 1: mail the link)
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset confirmation (step 2: consume the token)
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirmRequest {
    #[validate(length(min = 1, message = "Token must not be empty"))]
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Update own profile request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Last name must be 1-64 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    #[validate(url(message = "Invalid profile picture URL"))]
    pub profile_picture_url: Option<String>,
}

/// Create resource request. The `kind` field decides which payload
/// fields are required; the service validates that.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 10, message = "Kind must be link, file, or photo"))]
    pub kind: String,

    pub language_id: i64,

    #[validate(length(min = 1, max = 300, message = "Caption must be 1-300 characters"))]
    pub caption: String,

    #[validate(length(min = 1, max = 100, message = "Topic must be 1-100 characters"))]
    pub topic: String,

    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,

    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size_bytes: Option<i64>,

    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(url(message = "Invalid photo URL"))]
    pub photo_url: Option<String>,
}

/// Update resource request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateResourceRequest {
    #[validate(length(min = 1, max = 300, message = "Caption must be 1-300 characters"))]
    pub caption: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Topic must be 1-100 characters"))]
    pub topic: Option<String>,

    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,

    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
}

fn default_limit() -> i64 {
    50
}

/// Query parameters for resource listings
#[derive(Debug, Deserialize)]
pub struct ResourceQueryParams {
    pub language_id: Option<i64>,
    pub topic: Option<String>,
    pub owner_id: Option<i64>,

    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default)]
    pub offset: i64,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub content: String,
}

/// Create language request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLanguageRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,

    #[validate(length(min = 2, max = 8, message = "Short code must be 2-8 characters"))]
    pub shorty: String,

    #[validate(length(max = 300, message = "Description must be at most 300 characters"))]
    pub description: Option<String>,
}

/// Query parameters for search
#[derive(Debug, Deserialize, Validate)]
pub struct SearchQueryParams {
    #[validate(length(min = 1, max = 100, message = "Query must be 1-100 characters"))]
    pub q: String,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Prompt forwarded to the GPT completion endpoint
#[derive(Debug, Deserialize, Validate)]
pub struct GptRequest {
    #[validate(length(min = 1, max = 2048, message = "Prompt must be 1-2048 characters"))]
    pub prompt: String,
}

/// Create chat room request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 300, message = "Description must be at most 300 characters"))]
    pub description: Option<String>,

    /// "direct" or "group"
    pub room_type: String,

    /// Members besides the creator
    pub member_ids: Vec<i64>,
}

/// Query parameters for chat history
#[derive(Debug, Deserialize)]
pub struct MessagesQueryParams {
    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default)]
    pub offset: i64,
}
