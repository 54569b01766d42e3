//! Join and leave notifications.
//!
//! Every presence event carries the full roster snapshot rather than a delta,
//! so each event is self consistent at the moment it is sent and clients can
//! simply replace their roster with whatever arrived last.

use tracing::info;

use protocol::{ServerEvent, UserPayload};

use crate::delivery::Delivery;
use crate::registry::ConnectionRegistry;
use crate::server_types::ConnId;

pub struct PresenceBroadcaster;

impl PresenceBroadcaster {

    // Register the name, then tell every connection (the new one included)
    pub fn joined(registry: &mut ConnectionRegistry, delivery: &Delivery,
                  id: ConnId, username: String) -> UserPayload {
        info!("User {} joined as connection {}", &username, id);
        registry.register(id, username.clone());

        let payload = UserPayload {
            id: id.to_string(),
            username,
            users: registry.snapshot(),
        };

        delivery.broadcast(&ServerEvent::Joined(payload.clone()));
        payload
    }

    // Connection is gone, caller must have detached it from delivery already
    pub fn left(registry: &mut ConnectionRegistry, delivery: &Delivery, id: ConnId) -> UserPayload {
        let username = registry.unregister(id);
        info!("User {} has left", &username);

        let payload = UserPayload {
            id: id.to_string(),
            username,
            users: registry.snapshot(),
        };

        delivery.broadcast(&ServerEvent::Left(payload.clone()));
        payload
    }
}
