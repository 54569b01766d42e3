//! Wire protocol shared by the chat server and client.
//!
//! Every frame is a single line of JSON holding an envelope of the form
//! `{"event": "<name>", "data": <payload>}`. Client to server events are
//! modeled by [`ClientEvent`], server to client events by [`ServerEvent`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod codec;

pub use codec::{ClientCodec, EventCodec, ServerCodec};

// client -> server
pub const USER_JOIN: &str = "user:join";
pub const MESSAGE_SEND: &str = "message:send";
pub const USER_TYPING: &str = "user:typing";

// server -> client
pub const USER_JOINED: &str = "user:joined";
pub const USER_LEFT: &str = "user:left";
pub const MESSAGE_RECEIVE: &str = "message:receive";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line framing error: {0}")]
    Lines(#[from] tokio_util::codec::LinesCodecError),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw framed unit as it travels on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Join(String),        // user:join
    Send(SendPayload),   // message:send
    Typing(bool),        // user:typing
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Joined(UserPayload),   // user:joined
    Left(UserPayload),     // user:left
    Message(Message),      // message:receive
    Typing(TypingPayload), // user:typing
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPayload {
    pub text: String,
}

/// Presence notification, carries the full roster snapshot at send time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: String,
    pub username: String,
    pub users: Vec<String>,
}

/// A relayed chat message, stamped by the server.
///
/// `id` is the epoch millisecond at relay time and is not a strict sequence:
/// two messages relayed within the same millisecond share an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub username: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub username: String,
    pub is_typing: bool,
}

/// Conversion between typed events and the wire envelope.
pub trait Event: Sized {
    /// Event name as it appears in the envelope
    fn name(&self) -> &'static str;

    fn to_envelope(&self) -> Result<Envelope, ProtocolError>;

    /// Returns `Ok(None)` for event names this side does not know about,
    /// so newer peers can add events without breaking older ones.
    fn from_envelope(envelope: Envelope) -> Result<Option<Self>, ProtocolError>;
}

impl Event for ClientEvent {
    fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join(_) => USER_JOIN,
            ClientEvent::Send(_) => MESSAGE_SEND,
            ClientEvent::Typing(_) => USER_TYPING,
        }
    }

    fn to_envelope(&self) -> Result<Envelope, ProtocolError> {
        let data = match self {
            ClientEvent::Join(username) => serde_json::to_value(username)?,
            ClientEvent::Send(payload) => serde_json::to_value(payload)?,
            ClientEvent::Typing(is_typing) => Value::Bool(*is_typing),
        };

        Ok(Envelope { event: self.name().to_owned(), data })
    }

    fn from_envelope(envelope: Envelope) -> Result<Option<Self>, ProtocolError> {
        let event = match envelope.event.as_str() {
            USER_JOIN => ClientEvent::Join(serde_json::from_value(envelope.data)?),
            MESSAGE_SEND => ClientEvent::Send(serde_json::from_value(envelope.data)?),
            USER_TYPING => ClientEvent::Typing(serde_json::from_value(envelope.data)?),
            _ => return Ok(None),
        };

        Ok(Some(event))
    }
}

impl Event for ServerEvent {
    fn name(&self) -> &'static str {
        match self {
            ServerEvent::Joined(_) => USER_JOINED,
            ServerEvent::Left(_) => USER_LEFT,
            ServerEvent::Message(_) => MESSAGE_RECEIVE,
            ServerEvent::Typing(_) => USER_TYPING,
        }
    }

    fn to_envelope(&self) -> Result<Envelope, ProtocolError> {
        let data = match self {
            ServerEvent::Joined(payload) | ServerEvent::Left(payload) => serde_json::to_value(payload)?,
            ServerEvent::Message(msg) => serde_json::to_value(msg)?,
            ServerEvent::Typing(payload) => serde_json::to_value(payload)?,
        };

        Ok(Envelope { event: self.name().to_owned(), data })
    }

    fn from_envelope(envelope: Envelope) -> Result<Option<Self>, ProtocolError> {
        let event = match envelope.event.as_str() {
            USER_JOINED => ServerEvent::Joined(serde_json::from_value(envelope.data)?),
            USER_LEFT => ServerEvent::Left(serde_json::from_value(envelope.data)?),
            MESSAGE_RECEIVE => ServerEvent::Message(serde_json::from_value(envelope.data)?),
            USER_TYPING => ServerEvent::Typing(serde_json::from_value(envelope.data)?),
            _ => return Ok(None),
        };

        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire<E: Event>(event: &E) -> Value {
        serde_json::to_value(event.to_envelope().unwrap()).unwrap()
    }

    #[test]
    fn client_events_match_wire_shapes() {
        assert_eq!(wire(&ClientEvent::Join("alice".into())), json!({"event": "user:join", "data": "alice"}));
        assert_eq!(
            wire(&ClientEvent::Send(SendPayload { text: "hi".into() })),
            json!({"event": "message:send", "data": {"text": "hi"}})
        );
        assert_eq!(wire(&ClientEvent::Typing(true)), json!({"event": "user:typing", "data": true}));
    }

    #[test]
    fn server_events_match_wire_shapes() {
        let joined = ServerEvent::Joined(UserPayload {
            id: "7".into(),
            username: "bob".into(),
            users: vec!["alice".into(), "bob".into()],
        });
        assert_eq!(
            wire(&joined),
            json!({"event": "user:joined", "data": {"id": "7", "username": "bob", "users": ["alice", "bob"]}})
        );

        let typing = ServerEvent::Typing(TypingPayload { username: "bob".into(), is_typing: false });
        assert_eq!(
            wire(&typing),
            json!({"event": "user:typing", "data": {"username": "bob", "isTyping": false}})
        );

        let msg = ServerEvent::Message(Message {
            id: 1_700_000_000_000,
            text: "hello".into(),
            username: "alice".into(),
            timestamp: "2023-11-14T22:13:20.000Z".into(),
        });
        assert_eq!(
            wire(&msg),
            json!({"event": "message:receive", "data": {
                "id": 1_700_000_000_000u64,
                "text": "hello",
                "username": "alice",
                "timestamp": "2023-11-14T22:13:20.000Z"
            }})
        );
    }

    #[test]
    fn typing_name_is_shared_but_payloads_differ() {
        // the same event name carries a bool upstream and an object downstream
        let up = Envelope { event: USER_TYPING.into(), data: json!(true) };
        assert_eq!(ClientEvent::from_envelope(up.clone()).unwrap(), Some(ClientEvent::Typing(true)));
        assert!(ServerEvent::from_envelope(up).is_err());
    }

    #[test]
    fn unknown_event_names_are_not_errors() {
        let env = Envelope { event: "room:topic".into(), data: json!({"topic": "rust"}) };
        assert_eq!(ServerEvent::from_envelope(env.clone()).unwrap(), None);
        assert_eq!(ClientEvent::from_envelope(env).unwrap(), None);
    }

    #[test]
    fn missing_data_fails_for_payload_events() {
        let env: Envelope = serde_json::from_value(json!({"event": "message:send"})).unwrap();
        assert_eq!(env.data, Value::Null);
        assert!(ClientEvent::from_envelope(env).is_err());
    }
}
