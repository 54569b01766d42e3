use tokio::sync::watch::{self, Receiver, Sender};

use protocol::ServerEvent;

use crate::state::ChatState;

/// Holds the current [`ChatState`] and publishes every new version.
///
/// Renderers subscribe and redraw on change; readers never block the task
/// applying events.
#[derive(Debug, Clone)]
pub struct StateStore {
    tx: Sender<ChatState>,
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ChatState::new());
        Self { tx }
    }

    pub fn apply(&self, event: &ServerEvent) {
        self.tx.send_modify(|state| *state = std::mem::take(state).apply(event));
    }

    pub fn set_connected(&self, connected: bool) {
        self.tx.send_if_modified(|state| {
            if state.connected == connected {
                return false;
            }
            state.connected = connected;
            true
        });
    }

    pub fn subscribe(&self) -> Receiver<ChatState> {
        self.tx.subscribe()
    }

    // owned copy of the current state
    pub fn state(&self) -> ChatState {
        self.tx.borrow().clone()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
