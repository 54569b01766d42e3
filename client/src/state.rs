//! Local view of the chat room, folded from server events.
//!
//! [`ChatState::apply`] is a pure reducer: it takes the previous state and one
//! inbound event and returns the next state, with no IO and no rendering
//! concerns, so the projection can be tested on its own.

use std::collections::BTreeMap;

use protocol::{Message, ServerEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    /// Transport level connection status
    pub connected: bool,
    /// Arrival ordered message log
    pub messages: Vec<Message>,
    /// Roster as of the most recent presence event
    pub users: Vec<String>,
    /// Last known typing flag per username. Entries are never removed, so a
    /// user who left while typing keeps showing as typing.
    pub typing: BTreeMap<String, bool>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(mut self, event: &ServerEvent) -> ChatState {
        match event {
            ServerEvent::Message(msg) => self.messages.push(msg.clone()),
            // wholesale replace, the payload is a full snapshot
            ServerEvent::Joined(p) | ServerEvent::Left(p) => self.users = p.users.clone(),
            ServerEvent::Typing(t) => {
                self.typing.insert(t.username.clone(), t.is_typing);
            },
        }
        self
    }

    pub fn with_connected(mut self, connected: bool) -> ChatState {
        self.connected = connected;
        self
    }

    // names currently flagged as typing
    pub fn active_typers(&self) -> Vec<&str> {
        self.typing
            .iter()
            .filter(|(_, is_typing)| **is_typing)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
