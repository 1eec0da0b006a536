//! Resource API Tests
//!
//! Request validation, kind parsing, and response shaping for the
//! resource and user endpoints.

use chrono::Utc;
use kportal_server::application::dto::{
    CreateResourceRequest, FileMetadataResponse, LanguageResponse, ResourceQueryParams,
    UserResponse,
};
use kportal_server::application::services::FileMetadataDto;
use kportal_server::domain::entities::language::Language;
use kportal_server::domain::entities::resource::ResourceKind;
use kportal_server::domain::entities::user::User;
use pretty_assertions::assert_eq;
use serde_json::json;
use validator::Validate;

use crate::common::{unique_email, unique_username};

fn link_request() -> CreateResourceRequest {
    CreateResourceRequest {
        kind: "link".into(),
        language_id: 1,
        caption: "A useful article".into(),
        topic: "ownership".into(),
        url: Some("https://example.com/article".into()),
        file_path: None,
        file_name: None,
        file_size_bytes: None,
        title: Some("Article".into()),
        photo_url: None,
    }
}

fn test_user() -> User {
    let now = Utc::now();
    User {
        id: 7,
        username: unique_username(),
        email: unique_email(),
        password_hash: "$argon2id$stub".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
        profile_picture_url: None,
        bio: Some("hello".into()),
        created_at: now,
        updated_at: now,
    }
}

/// Test resource kinds parse case-insensitively
#[test]
fn test_resource_kind_parses_case_insensitively() {
    assert_eq!(ResourceKind::from_str("link"), Some(ResourceKind::Link));
    assert_eq!(ResourceKind::from_str("FILE"), Some(ResourceKind::File));
    assert_eq!(ResourceKind::from_str("Photo"), Some(ResourceKind::Photo));
    assert_eq!(ResourceKind::from_str("video"), None);
}

/// Test a well-formed link request passes validation
#[test]
fn test_create_resource_request_with_valid_data_passes_validation() {
    assert!(link_request().validate().is_ok());
}

/// Test a malformed URL fails validation
#[test]
fn test_create_resource_request_with_bad_url_fails_validation() {
    let mut request = link_request();
    request.url = Some("not a url".into());

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("url"));
}

/// Test an empty caption fails validation
#[test]
fn test_create_resource_request_with_empty_caption_fails_validation() {
    let mut request = link_request();
    request.caption = String::new();

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("caption"));
}

/// Test listing query parameters fall back to defaults
#[test]
fn test_resource_query_params_default_paging() {
    let params: ResourceQueryParams = serde_json::from_value(json!({})).unwrap();

    assert_eq!(params.limit, 50);
    assert_eq!(params.offset, 0);
    assert!(params.language_id.is_none());
}

/// Test user responses expose snowflake IDs as strings
#[test]
fn test_user_response_serializes_id_as_string() {
    let response = UserResponse::from_user(test_user(), true);
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["id"], "7");
}

/// Test file metadata serializes under the `type`/`size`/`title` keys
#[test]
fn test_file_metadata_response_uses_type_and_size_keys() {
    let response = FileMetadataResponse::from(FileMetadataDto {
        extension: "PDF".into(),
        size_mib: 1.43,
        title: "doc.pdf".into(),
    });
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["type"], "PDF");
    assert_eq!(value["size"], 1.43);
    assert_eq!(value["title"], "doc.pdf");
    assert!(value.get("extension").is_none());
    assert!(value.get("size_mib").is_none());
}

/// Test language responses carry the description as a plain string
#[test]
fn test_language_response_serializes_description_as_string() {
    let response = LanguageResponse::from(Language {
        id: 3,
        name: "German".into(),
        shorty: "de".into(),
        description: String::new(),
    });
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["id"], "3");
    assert_eq!(value["description"], "");
}

/// Test the email field is hidden on public profiles
#[test]
fn test_user_response_hides_email_for_public_view() {
    let response = UserResponse::from_user(test_user(), false);
    let value = serde_json::to_value(&response).unwrap();

    assert!(value.get("email").is_none());
}
