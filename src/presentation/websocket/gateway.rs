//! WebSocket Gateway
//!
//! Manages connected sessions and routes chat events to room members.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use super::messages::GatewaySend;
use crate::infrastructure::metrics;

/// Gateway event types for internal communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", content = "d")]
pub enum GatewayEvent {
    #[serde(rename = "MESSAGE_CREATE")]
    MessageCreate(MessageCreateEvent),

    #[serde(rename = "ROOM_CREATE")]
    RoomCreate(RoomCreateEvent),
}

impl GatewayEvent {
    /// Get the event name for dispatch
    pub fn event_name(&self) -> &'static str {
        match self {
            GatewayEvent::MessageCreate(_) => "MESSAGE_CREATE",
            GatewayEvent::RoomCreate(_) => "ROOM_CREATE",
        }
    }

    /// Get the room ID this event belongs to (for routing)
    pub fn room_id(&self) -> Option<i64> {
        match self {
            GatewayEvent::MessageCreate(e) => e.room_id.parse().ok(),
            GatewayEvent::RoomCreate(e) => e.id.parse().ok(),
        }
    }

    /// Convert to JSON value for sending
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            GatewayEvent::MessageCreate(e) => serde_json::to_value(e).unwrap_or_default(),
            GatewayEvent::RoomCreate(e) => serde_json::to_value(e).unwrap_or_default(),
        }
    }
}

/// MESSAGE_CREATE payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreateEvent {
    pub id: String,
    pub room_id: String,
    pub user_id: Option<String>,
    pub content: String,
    pub created_at: String,
}

/// ROOM_CREATE payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreateEvent {
    pub id: String,
    pub name: String,
    pub room_type: String,
}

/// Internal event wrapper with routing information
#[derive(Debug, Clone)]
pub struct RoutedEvent {
    pub event: GatewayEvent,
    /// Target user IDs (None = route by room membership)
    pub target_users: Option<Vec<i64>>,
}

/// Connected session with message sender
pub struct ConnectedSession {
    pub user_id: i64,
    pub session_id: String,
    pub rooms: Vec<i64>,
    pub sender: mpsc::UnboundedSender<GatewaySend>,
}

/// WebSocket gateway managing all connections
pub struct Gateway {
    /// Active sessions by session_id
    sessions: DashMap<String, Arc<ConnectedSession>>,
    /// User ID to session IDs mapping (one user can have multiple sessions)
    user_sessions: DashMap<i64, Vec<String>>,
    /// Room ID to session IDs mapping (for room broadcasts)
    room_sessions: DashMap<i64, Vec<String>>,
    /// Broadcast channel for events
    event_tx: broadcast::Sender<RoutedEvent>,
    /// Heartbeat interval in milliseconds
    heartbeat_interval_ms: u64,
}

impl Gateway {
    pub fn new(heartbeat_interval_ms: u64) -> Self {
        let (event_tx, _) = broadcast::channel(10000);
        Self {
            sessions: DashMap::new(),
            user_sessions: DashMap::new(),
            room_sessions: DashMap::new(),
            event_tx,
            heartbeat_interval_ms,
        }
    }

    /// Get the heartbeat interval
    pub fn heartbeat_interval(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// Subscribe to gateway events
    pub fn subscribe(&self) -> broadcast::Receiver<RoutedEvent> {
        self.event_tx.subscribe()
    }

    /// Register a new connected session
    pub fn register_session(
        &self,
        session_id: String,
        user_id: i64,
        rooms: Vec<i64>,
        sender: mpsc::UnboundedSender<GatewaySend>,
    ) {
        let session = Arc::new(ConnectedSession {
            user_id,
            session_id: session_id.clone(),
            rooms: rooms.clone(),
            sender,
        });

        self.sessions.insert(session_id.clone(), session);

        self.user_sessions
            .entry(user_id)
            .or_default()
            .push(session_id.clone());

        for room_id in rooms {
            self.room_sessions
                .entry(room_id)
                .or_default()
                .push(session_id.clone());
        }

        metrics::CHAT_CONNECTIONS_ACTIVE.inc();

        tracing::info!(
            user_id = user_id,
            session_id = %session_id,
            "Session registered"
        );
    }

    /// Unregister a session
    pub fn unregister_session(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            if let Some(mut sessions) = self.user_sessions.get_mut(&session.user_id) {
                sessions.retain(|s| s != session_id);
            }

            for room_id in &session.rooms {
                if let Some(mut sessions) = self.room_sessions.get_mut(room_id) {
                    sessions.retain(|s| s != session_id);
                }
            }

            metrics::CHAT_CONNECTIONS_ACTIVE.dec();

            tracing::info!(
                user_id = session.user_id,
                session_id = %session_id,
                "Session unregistered"
            );
        }
    }

    /// Broadcast event, routed by room membership
    pub fn dispatch(&self, event: GatewayEvent) {
        let routed = RoutedEvent {
            event,
            target_users: None,
        };
        let _ = self.event_tx.send(routed);
    }

    /// Send event to specific users only
    pub fn dispatch_to_users(&self, event: GatewayEvent, user_ids: Vec<i64>) {
        let routed = RoutedEvent {
            event,
            target_users: Some(user_ids),
        };
        let _ = self.event_tx.send(routed);
    }

    /// Send a message directly to all sessions in a room
    pub fn send_to_room(&self, room_id: i64, message: GatewaySend) {
        if let Some(session_ids) = self.room_sessions.get(&room_id) {
            for session_id in session_ids.value() {
                if let Some(session) = self.sessions.get(session_id) {
                    let _ = session.sender.send(message.clone());
                }
            }
        }
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Get the room subscriptions of a session
    pub fn get_session_rooms(&self, session_id: &str) -> Option<Vec<i64>> {
        self.sessions.get(session_id).map(|s| s.rooms.clone())
    }

    /// Check if user is online (has at least one session)
    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.user_sessions
            .get(&user_id)
            .map(|sessions| !sessions.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister_session() {
        let gateway = Gateway::new(30000);
        let (tx, _rx) = mpsc::unbounded_channel();

        gateway.register_session("s1".into(), 42, vec![1, 2], tx);
        assert_eq!(gateway.session_count(), 1);
        assert!(gateway.is_user_online(42));
        assert_eq!(gateway.get_session_rooms("s1"), Some(vec![1, 2]));

        gateway.unregister_session("s1");
        assert_eq!(gateway.session_count(), 0);
        assert!(!gateway.is_user_online(42));
    }

    #[test]
    fn test_send_to_room_reaches_members_only() {
        let gateway = Gateway::new(30000);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        gateway.register_session("a".into(), 1, vec![10], tx_a);
        gateway.register_session("b".into(), 2, vec![20], tx_b);

        gateway.send_to_room(
            10,
            GatewaySend {
                op: 0,
                d: None,
                s: None,
                t: Some("MESSAGE_CREATE".into()),
            },
        );

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_event_room_routing_key() {
        let event = GatewayEvent::MessageCreate(MessageCreateEvent {
            id: "1".into(),
            room_id: "77".into(),
            user_id: Some("42".into()),
            content: "hi".into(),
            created_at: "2026-01-01T00:00:00Z".into(),
        });
        assert_eq!(event.room_id(), Some(77));
        assert_eq!(event.event_name(), "MESSAGE_CREATE");
    }
}
