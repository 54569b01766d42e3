use tracing::debug;

use protocol::{Message, ServerEvent};

use crate::clock::{self, Clock};
use crate::delivery::Delivery;
use crate::registry::ConnectionRegistry;
use crate::server_types::ConnId;

pub const ANONYMOUS_USER: &str = "Anonymous";

/// Stamps chat messages and echoes them to every connection, sender included,
/// so the sender renders the server assigned id and timestamp.
pub struct MessageRelay<C> {
    clock: C,
}

impl<C: Clock> MessageRelay<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn relay(&self, registry: &ConnectionRegistry, delivery: &Delivery,
                 id: ConnId, text: String) -> Message {
        let username = registry.lookup(id).unwrap_or(ANONYMOUS_USER).to_owned();
        let now = self.clock.now();

        debug!("Message from {}: {}", &username, &text);

        let msg = Message {
            id: clock::epoch_millis(&now),
            text,
            username,
            timestamp: clock::iso8601(&now),
        };

        delivery.broadcast(&ServerEvent::Message(msg.clone()));
        msg
    }
}
