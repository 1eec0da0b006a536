//! WebSocket Connection Handler
//!
//! Lifecycle of a single chat connection: Hello, Identify with a JWT,
//! READY with the member's room list, then heartbeats, sent messages,
//! and dispatched room events until the socket closes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, timeout};
use uuid::Uuid;

use super::gateway::{Gateway, GatewayEvent, MessageCreateEvent};
use super::messages::{
    GatewaySend, HelloPayload, IdentifyPayload, OpCode, ReadyPayload, SendMessagePayload,
};
use super::session::SessionState;
use crate::application::services::{decode_access_token, ChatService, ChatServiceImpl};
use crate::infrastructure::repositories::PgChatRepository;
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let max_message_size = state.settings.websocket.max_message_size;
    ws.max_message_size(max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4().to_string();
    let mut session_state = SessionState::new(session_id.clone());

    tracing::debug!(session_id = %session_id, "New WebSocket connection");

    let (mut sender, mut receiver) = socket.split();

    // Channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<GatewaySend>();

    // Send Hello immediately
    let hello = GatewaySend {
        op: OpCode::Hello as u8,
        d: serde_json::to_value(HelloPayload {
            heartbeat_interval: state.gateway.heartbeat_interval(),
        })
        .ok(),
        s: None,
        t: None,
    };

    let hello_text = match serde_json::to_string(&hello) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to serialize Hello: {}", e);
            return;
        }
    };

    if let Err(e) = sender.send(Message::Text(hello_text.into())).await {
        tracing::error!("Failed to send Hello: {}", e);
        return;
    }

    // Forward messages from the channel onto the socket
    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Wait for Identify (with timeout)
    let identify_timeout = Duration::from_secs(state.settings.websocket.identify_timeout_secs);
    let identify_result = timeout(identify_timeout, async {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Ok(payload) = serde_json::from_str::<serde_json::Value>(&text) {
                        if payload.get("op").and_then(|v| v.as_u64())
                            == Some(OpCode::Identify as u64)
                        {
                            if let Some(d) = payload.get("d") {
                                if let Ok(identify) =
                                    serde_json::from_value::<IdentifyPayload>(d.clone())
                                {
                                    return Some(identify);
                                }
                            }
                        }
                    }
                }
                Ok(Message::Close(_)) => return None,
                Err(_) => return None,
                _ => continue,
            }
        }
        None
    })
    .await;

    let identify = match identify_result {
        Ok(Some(id)) => id,
        Ok(None) => {
            tracing::debug!(session_id = %session_id, "Connection closed before Identify");
            sender_task.abort();
            return;
        }
        Err(_) => {
            tracing::debug!(session_id = %session_id, "Identify timeout");
            send_invalid_session(&tx).await;
            sender_task.abort();
            return;
        }
    };

    // Validate the token
    let user_id = match decode_access_token(&identify.token, &state.settings.jwt.secret)
        .ok()
        .and_then(|claims| claims.sub.parse::<i64>().ok())
    {
        Some(id) => id,
        None => {
            tracing::debug!(session_id = %session_id, "Invalid token on Identify");
            send_invalid_session(&tx).await;
            sender_task.abort();
            return;
        }
    };

    // The member's rooms become this session's subscription set
    let chat_service = ChatServiceImpl::new(
        Arc::new(PgChatRepository::new(state.db.clone())),
        Arc::clone(&state.snowflake),
    );

    let room_ids = match chat_service.room_ids_for_user(user_id).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "Failed to load rooms");
            send_invalid_session(&tx).await;
            sender_task.abort();
            return;
        }
    };

    session_state.user_id = user_id;
    session_state.identified = true;

    state
        .gateway
        .register_session(session_id.clone(), user_id, room_ids.clone(), tx.clone());

    // Send READY
    let ready_sequence = session_state.next_sequence();
    let ready = GatewaySend {
        op: OpCode::Dispatch as u8,
        d: serde_json::to_value(ReadyPayload {
            user_id: user_id.to_string(),
            rooms: room_ids.iter().map(|id| id.to_string()).collect(),
            session_id: session_id.clone(),
        })
        .ok(),
        s: Some(ready_sequence),
        t: Some("READY".to_string()),
    };

    if tx.send(ready).is_err() {
        state.gateway.unregister_session(&session_id);
        sender_task.abort();
        return;
    }

    tracing::info!(
        user_id = user_id,
        session_id = %session_id,
        "User connected and identified"
    );

    // Subscribe to gateway events
    let mut event_rx = state.gateway.subscribe();

    // Heartbeat timeout check (interval plus a grace period)
    let heartbeat_interval_ms = state.gateway.heartbeat_interval();
    let mut heartbeat_check = interval(Duration::from_millis(heartbeat_interval_ms + 10000));
    heartbeat_check.tick().await;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_message(
                            &text,
                            &mut session_state,
                            &tx,
                            &state.gateway,
                            &chat_service,
                        ).await {
                            tracing::debug!(
                                session_id = %session_id,
                                error = %e,
                                "Error handling message"
                            );
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(session_id = %session_id, "Connection closed");
                        break;
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // Pong is handled automatically by axum
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }

            event = event_rx.recv() => {
                match event {
                    Ok(routed_event) => {
                        let should_receive = match &routed_event.target_users {
                            Some(users) => users.contains(&session_state.user_id),
                            None => {
                                // Route by room membership
                                if let Some(room_id) = routed_event.event.room_id() {
                                    state.gateway
                                        .get_session_rooms(&session_id)
                                        .map(|rooms| rooms.contains(&room_id))
                                        .unwrap_or(false)
                                } else {
                                    true
                                }
                            }
                        };

                        if should_receive {
                            let sequence = session_state.next_sequence();
                            let dispatch = GatewaySend {
                                op: OpCode::Dispatch as u8,
                                d: Some(routed_event.event.to_json()),
                                s: Some(sequence),
                                t: Some(routed_event.event.event_name().to_string()),
                            };
                            if tx.send(dispatch).is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            session_id = %session_id,
                            skipped = n,
                            "Event receiver lagged"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::error!("Gateway event channel closed");
                        break;
                    }
                }
            }

            _ = heartbeat_check.tick() => {
                let timeout_ms = heartbeat_interval_ms + 10000;
                if !session_state.is_alive(timeout_ms) {
                    tracing::info!(
                        session_id = %session_id,
                        "Heartbeat timeout, closing connection"
                    );
                    break;
                }
            }
        }
    }

    // Cleanup
    state.gateway.unregister_session(&session_id);
    sender_task.abort();

    tracing::info!(
        user_id = user_id,
        session_id = %session_id,
        "User disconnected"
    );
}

async fn send_invalid_session(tx: &mpsc::UnboundedSender<GatewaySend>) {
    let _ = tx.send(GatewaySend {
        op: OpCode::InvalidSession as u8,
        d: Some(json!(false)),
        s: None,
        t: None,
    });
    // Give the sender task a moment to flush before aborting it
    tokio::time::sleep(Duration::from_millis(100)).await;
}

/// Handle an incoming WebSocket message after Identify
async fn handle_message(
    text: &str,
    session_state: &mut SessionState,
    tx: &mpsc::UnboundedSender<GatewaySend>,
    gateway: &Arc<Gateway>,
    chat_service: &ChatServiceImpl<PgChatRepository>,
) -> Result<(), String> {
    let payload: serde_json::Value =
        serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {}", e))?;

    let op = payload
        .get("op")
        .and_then(|v| v.as_u64())
        .ok_or("Missing op field")?;

    match op {
        op if op == OpCode::Heartbeat as u64 => {
            session_state.heartbeat();
            let _ = tx.send(GatewaySend {
                op: OpCode::HeartbeatAck as u8,
                d: None,
                s: None,
                t: None,
            });
            tracing::trace!(
                session_id = %session_state.session_id,
                "Heartbeat received"
            );
        }

        op if op == OpCode::SendMessage as u64 => {
            let d = payload.get("d").ok_or("Missing d field")?;
            let send: SendMessagePayload =
                serde_json::from_value(d.clone()).map_err(|e| format!("Invalid payload: {}", e))?;

            if send.content.trim().is_empty() {
                return Err("Empty message content".into());
            }

            // Persist first, then fan out to the room
            let message = chat_service
                .send_message(send.room_id, session_state.user_id, &send.content)
                .await
                .map_err(|e| format!("Message rejected: {}", e))?;

            gateway.dispatch(GatewayEvent::MessageCreate(MessageCreateEvent {
                id: message.id.to_string(),
                room_id: message.room_id.to_string(),
                user_id: message.user_id.map(|id| id.to_string()),
                content: message.content,
                created_at: message.created_at.to_rfc3339(),
            }));
        }

        _ => {
            tracing::debug!(
                session_id = %session_state.session_id,
                op = op,
                "Unknown opcode"
            );
        }
    }

    Ok(())
}
