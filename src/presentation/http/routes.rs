//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{
    auth_middleware, logging, rate_limit_api, rate_limit_auth, security_headers,
};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // WebSocket gateway endpoint (token is checked on Identify)
        .route("/ws", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(logging::track_metrics))
        // Outermost layer so headers land on every response
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes (auth has its own stricter rate limiting)
        .nest("/auth", auth_routes(state.clone()))
        // Protected and mixed routes
        .nest("/users", user_routes(state.clone()))
        .nest("/resources", resource_routes(state.clone()))
        .nest("/comments", comment_routes(state.clone()))
        .nest("/languages", language_routes(state.clone()))
        .nest("/chat", chat_routes(state.clone()))
        .merge(lookup_routes(state.clone()))
        .route("/search", get(handlers::search::search))
        .route("/stats", get(handlers::stats::portal_stats))
        // Apply API rate limiting to all API routes
        .route_layer(middleware::from_fn_with_state(state, rate_limit_api))
}

/// Authentication routes (public, with stricter rate limiting)
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/signin", post(handlers::auth::signin))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/password-reset",
            post(handlers::auth::request_password_reset),
        )
        .route(
            "/password-reset/confirm",
            post(handlers::auth::confirm_password_reset),
        )
        .route_layer(middleware::from_fn_with_state(state, rate_limit_auth))
}

/// User routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/@me", get(handlers::user::get_current_user))
        .route("/@me", patch(handlers::user::update_current_user))
        .route("/@me", delete(handlers::user::delete_current_user))
        .route("/{user_id}", get(handlers::user::get_user))
        .route(
            "/by-username/{username}",
            get(handlers::user::get_user_by_username),
        )
        .route("/{user_id}/followers", get(handlers::social::followers))
        .route("/{user_id}/following", get(handlers::social::following))
        .route("/{user_id}/stats", get(handlers::stats::user_stats))
        .route("/{user_id}/follow", post(handlers::social::follow_user))
        .route("/{user_id}/follow", delete(handlers::social::unfollow_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Resource routes (protected)
fn resource_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::resource::list_resources))
        .route("/", post(handlers::resource::create_resource))
        .route("/feed", get(handlers::resource::feed))
        .route("/{resource_id}", get(handlers::resource::get_resource))
        .route("/{resource_id}", patch(handlers::resource::update_resource))
        .route("/{resource_id}", delete(handlers::resource::delete_resource))
        .route(
            "/{resource_id}/metadata",
            get(handlers::resource::file_metadata),
        )
        .route("/{resource_id}/like", post(handlers::social::like_resource))
        .route(
            "/{resource_id}/like",
            delete(handlers::social::unlike_resource),
        )
        .route("/{resource_id}/likes", get(handlers::social::resource_likes))
        .route(
            "/{resource_id}/comments",
            post(handlers::social::create_comment),
        )
        .route(
            "/{resource_id}/comments",
            get(handlers::social::resource_comments),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Comment routes (protected)
fn comment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{comment_id}", delete(handlers::social::delete_comment))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Language routes (listing is public, creation requires auth)
fn language_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::language::list_languages))
        .route("/{language_id}", get(handlers::language::get_language))
        .merge(
            Router::new()
                .route("/", post(handlers::language::create_language))
                .route_layer(middleware::from_fn_with_state(state, auth_middleware)),
        )
}

/// External lookup routes (protected)
fn lookup_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/wikipedia/article/{title}",
            get(handlers::lookup::wikipedia_article),
        )
        .route(
            "/wikipedia/search/{query}",
            get(handlers::lookup::wikipedia_search),
        )
        .route("/gpt", post(handlers::lookup::gpt_completion))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Chat routes (protected)
fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/rooms", get(handlers::chat::list_rooms))
        .route("/rooms", post(handlers::chat::create_room))
        .route("/rooms/{room_id}/messages", get(handlers::chat::room_messages))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
