// types
pub mod server_types;
pub mod error;
pub mod config;
pub mod clock;

// room state
pub mod registry;
pub mod delivery;
pub mod presence;
pub mod relay;
pub mod typing;
pub mod server_channel;

// io
pub mod client_handler;
pub mod server_listener;

use tokio::sync::mpsc;
use tracing::info;

use crate::clock::Clock;
use crate::config::Config;
use crate::error::ServerError;
use crate::server_channel::{ChannelReceiver, ChatRoom};
use crate::server_listener::ServerListener;
use crate::server_types::HubMsg;

/// Runs the room and the accept loop until the listener fails.
pub async fn serve<C: Clock>(listener: ServerListener, room: ChatRoom<C>, config: &Config) -> Result<(), ServerError> {
    let (hub_tx, hub_rx) = mpsc::channel::<HubMsg>(config.channel_size.max(1));

    let room_handle = ChannelReceiver::spawn_receive(hub_rx, room);
    let result = listener.run(hub_tx).await;

    room_handle.abort();
    info!("Server stopped");
    result
}
