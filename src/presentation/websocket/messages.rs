//! WebSocket Message Types
//!
//! Gateway envelope formats: numeric opcode `op`, payload `d`, sequence
//! `s`, and event name `t` on dispatches.

use serde::{Deserialize, Serialize};

/// Gateway opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Event dispatch (server to client)
    Dispatch = 0,
    /// Heartbeat
    Heartbeat = 1,
    /// Identify
    Identify = 2,
    /// Send a chat message (client to server)
    SendMessage = 3,
    /// Invalid session
    InvalidSession = 9,
    /// Hello
    Hello = 10,
    /// Heartbeat ACK
    HeartbeatAck = 11,
}

/// Incoming gateway message
#[derive(Debug, Deserialize)]
pub struct GatewayReceive {
    pub op: u8,
    pub d: Option<serde_json::Value>,
    pub s: Option<u64>,
    pub t: Option<String>,
}

/// Outgoing gateway message
#[derive(Debug, Clone, Serialize)]
pub struct GatewaySend {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

/// Hello payload (op 10)
#[derive(Debug, Serialize)]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
}

/// Ready payload (dispatch READY)
#[derive(Debug, Serialize)]
pub struct ReadyPayload {
    pub user_id: String,
    pub rooms: Vec<String>,
    pub session_id: String,
}

/// Identify payload (op 2)
#[derive(Debug, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
}

/// Send message payload (op 3)
#[derive(Debug, Deserialize)]
pub struct SendMessagePayload {
    pub room_id: i64,
    pub content: String,
}
