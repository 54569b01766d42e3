use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use protocol::ClientEvent;

use crate::clock::{Clock, SystemClock};
use crate::delivery::Delivery;
use crate::presence::PresenceBroadcaster;
use crate::registry::ConnectionRegistry;
use crate::relay::MessageRelay;
use crate::server_types::HubMsg;
use crate::typing::TypingCoordinator;

/// All mutable server state for the single chat room.
///
/// Owned by exactly one task, each hub message is handled to completion
/// before the next so registry changes and their broadcasts never interleave.
pub struct ChatRoom<C = SystemClock> {
    registry: ConnectionRegistry,
    delivery: Delivery,
    relay: MessageRelay<C>,
}

impl ChatRoom<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ChatRoom<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ChatRoom<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            delivery: Delivery::new(),
            relay: MessageRelay::new(clock),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    pub fn handle(&mut self, msg: HubMsg) {
        match msg {
            HubMsg::Connected(id, tx) => {
                info!("Connection {} established", id);
                self.delivery.attach(id, tx);
            },
            HubMsg::Event(id, ClientEvent::Join(username)) => {
                PresenceBroadcaster::joined(&mut self.registry, &self.delivery, id, username);
            },
            HubMsg::Event(id, ClientEvent::Send(payload)) => {
                self.relay.relay(&self.registry, &self.delivery, id, payload.text);
            },
            HubMsg::Event(id, ClientEvent::Typing(is_typing)) => {
                TypingCoordinator::set_typing(&self.registry, &self.delivery, id, is_typing);
            },
            HubMsg::Disconnected(id) => {
                info!("Connection {} has closed", id);
                // detach first, the leaver is not among the recipients
                self.delivery.detach(id);
                PresenceBroadcaster::left(&mut self.registry, &self.delivery, id);
            },
        }
    }
}

pub struct ChannelReceiver;

impl ChannelReceiver {

    pub fn spawn_receive<C: Clock>(mut hub_rx: Receiver<HubMsg>, mut room: ChatRoom<C>) -> JoinHandle<ChatRoom<C>> {
        tokio::spawn(async move {
            while let Some(msg) = hub_rx.recv().await {
                debug!("Hub msg received {:?}", &msg);
                room.handle(msg);
            }

            info!("No more hub senders, room drained");
            room
        })
    }
}
