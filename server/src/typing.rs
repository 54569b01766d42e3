use tracing::debug;

use protocol::{ServerEvent, TypingPayload};

use crate::delivery::Delivery;
use crate::registry::ConnectionRegistry;
use crate::server_types::ConnId;

// Typing state goes to everyone except the sender,
// unlike messages which are echoed back
pub struct TypingCoordinator;

impl TypingCoordinator {

    // Unjoined connections have no name to show, their signal is dropped
    pub fn set_typing(registry: &ConnectionRegistry, delivery: &Delivery,
                      id: ConnId, is_typing: bool) -> Option<TypingPayload> {
        let Some(username) = registry.lookup(id) else {
            debug!("Ignoring typing signal from unjoined connection {}", id);
            return None;
        };

        let payload = TypingPayload {
            username: username.to_owned(),
            is_typing,
        };

        delivery.broadcast_except(id, &ServerEvent::Typing(payload.clone()));
        Some(payload)
    }
}
