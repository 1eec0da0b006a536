//! Chat Handlers
//!
//! REST surface of the chat system: rooms and message history. Live
//! messaging goes over the WebSocket gateway.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{CreateRoomRequest, MessagesQueryParams};
use crate::application::dto::response::{ChatMessageResponse, RoomResponse};
use crate::application::services::{ChatService, ChatServiceImpl};
use crate::domain::RoomType;
use crate::infrastructure::repositories::PgChatRepository;
use crate::presentation::middleware::AuthUser;
use crate::presentation::websocket::gateway::{GatewayEvent, RoomCreateEvent};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

const MAX_PAGE_SIZE: i64 = 100;

fn chat_service(state: &AppState) -> ChatServiceImpl<PgChatRepository> {
    ChatServiceImpl::new(
        Arc::new(PgChatRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

/// Rooms the current user belongs to
pub async fn list_rooms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let rooms = chat_service(&state).rooms_for_user(auth.user_id).await?;

    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// Create a chat room
pub async fn create_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let room_type = RoomType::from_str(&body.room_type);

    let mut member_ids = body.member_ids.clone();
    if !member_ids.contains(&auth.user_id) {
        member_ids.push(auth.user_id);
    }

    let room = chat_service(&state)
        .create_room(
            auth.user_id,
            &body.name,
            body.description.as_deref().unwrap_or(""),
            room_type,
            body.member_ids,
        )
        .await?;

    // Connected members get the event even though their sessions are not
    // yet subscribed to the new room
    state.gateway.dispatch_to_users(
        GatewayEvent::RoomCreate(RoomCreateEvent {
            id: room.id.to_string(),
            name: room.name.clone(),
            room_type: room.room_type.as_str().to_string(),
        }),
        member_ids,
    );

    Ok((StatusCode::CREATED, Json(RoomResponse::from(room))))
}

/// Message history for a room, newest first (members only)
pub async fn room_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<i64>,
    Query(params): Query<MessagesQueryParams>,
) -> Result<Json<Vec<ChatMessageResponse>>, AppError> {
    let messages = chat_service(&state)
        .messages(
            room_id,
            auth.user_id,
            params.limit.clamp(1, MAX_PAGE_SIZE),
            params.offset.max(0),
        )
        .await?;

    Ok(Json(
        messages.into_iter().map(ChatMessageResponse::from).collect(),
    ))
}
