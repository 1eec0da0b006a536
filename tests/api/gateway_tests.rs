//! Gateway Protocol Tests
//!
//! Wire format checks for the WebSocket envelope and dispatch events.

use kportal_server::presentation::websocket::gateway::{
    GatewayEvent, MessageCreateEvent, RoomCreateEvent,
};
use kportal_server::presentation::websocket::messages::{
    GatewayReceive, GatewaySend, HelloPayload, IdentifyPayload, OpCode,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Test the hello frame carries only the opcode and payload
#[test]
fn test_hello_frame_omits_sequence_and_event_name() {
    let frame = GatewaySend {
        op: OpCode::Hello as u8,
        d: Some(serde_json::to_value(HelloPayload { heartbeat_interval: 41_250 }).unwrap()),
        s: None,
        t: None,
    };

    let value = serde_json::to_value(&frame).unwrap();

    assert_eq!(value["op"], 10);
    assert_eq!(value["d"]["heartbeat_interval"], 41_250);
    assert!(value.get("s").is_none());
    assert!(value.get("t").is_none());
}

/// Test an identify frame parses from client JSON
#[test]
fn test_identify_frame_parses() {
    let raw = json!({
        "op": 2,
        "d": { "token": "abc.def.ghi" }
    })
    .to_string();

    let frame: GatewayReceive = serde_json::from_str(&raw).unwrap();
    assert_eq!(frame.op, OpCode::Identify as u8);

    let payload: IdentifyPayload = serde_json::from_value(frame.d.unwrap()).unwrap();
    assert_eq!(payload.token, "abc.def.ghi");
}

/// Test dispatch events serialize under their event name tag
#[test]
fn test_message_create_event_serializes_with_tag() {
    let event = GatewayEvent::MessageCreate(MessageCreateEvent {
        id: "12345".into(),
        room_id: "67890".into(),
        user_id: Some("42".into()),
        content: "hello".into(),
        created_at: "2026-08-30T12:00:00Z".into(),
    });

    let value = serde_json::to_value(&event).unwrap();

    assert_eq!(value["t"], "MESSAGE_CREATE");
    assert_eq!(value["d"]["room_id"], "67890");
    assert_eq!(event.event_name(), "MESSAGE_CREATE");
}

/// Test events route by their parsed room ID
#[test]
fn test_events_route_by_room_id() {
    let message = GatewayEvent::MessageCreate(MessageCreateEvent {
        id: "1".into(),
        room_id: "67890".into(),
        user_id: None,
        content: "hi".into(),
        created_at: "2026-08-30T12:00:00Z".into(),
    });
    assert_eq!(message.room_id(), Some(67890));

    let room = GatewayEvent::RoomCreate(RoomCreateEvent {
        id: "555".into(),
        name: "general".into(),
        room_type: "group".into(),
    });
    assert_eq!(room.room_id(), Some(555));
}

/// Test an unparseable room ID yields no routing target
#[test]
fn test_bad_room_id_does_not_route() {
    let event = GatewayEvent::MessageCreate(MessageCreateEvent {
        id: "1".into(),
        room_id: "not-a-number".into(),
        user_id: None,
        content: "hi".into(),
        created_at: "2026-08-30T12:00:00Z".into(),
    });

    assert_eq!(event.room_id(), None);
}

/// Test heartbeat opcodes match the protocol numbering
#[test]
fn test_opcode_numbering() {
    assert_eq!(OpCode::Dispatch as u8, 0);
    assert_eq!(OpCode::Heartbeat as u8, 1);
    assert_eq!(OpCode::Identify as u8, 2);
    assert_eq!(OpCode::SendMessage as u8, 3);
    assert_eq!(OpCode::InvalidSession as u8, 9);
    assert_eq!(OpCode::Hello as u8, 10);
    assert_eq!(OpCode::HeartbeatAck as u8, 11);
}
