use futures::SinkExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, Sender, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info};

use protocol::{ServerCodec, ServerEvent};

use crate::server_types::{ConnId, HubMsg};

// Handles server communication with one client
// Essentially this models a client actor on the server side,
// all state changes are delegated to the room owner via the hub channel
pub struct ClientHandler {
    id: ConnId,
    hub_tx: Sender<HubMsg>,
}

impl ClientHandler {

    pub fn new(id: ConnId, hub_tx: Sender<HubMsg>) -> Self {
        Self { id, hub_tx }
    }

    // Spawn tokio task to handle the socket until the client goes away
    pub fn spawn(self, socket: TcpStream) -> JoinHandle<()> {
        tokio::spawn(async move {
            let (tcp_read, tcp_write) = socket.into_split();
            let (out_tx, out_rx) = mpsc::unbounded_channel::<ServerEvent>();

            // Connected must reach the room before any event of this connection
            if self.hub_tx.send(HubMsg::Connected(self.id, out_tx)).await.is_err() {
                info!("Room has shut down, dropping connection {}", self.id);
                return;
            }

            let writer = Self::spawn_write(self.id, tcp_write, out_rx);

            self.handle_read(tcp_read).await;

            // room detaches our outbound handle, which in turn ends the writer
            let _ = self.hub_tx.send(HubMsg::Disconnected(self.id)).await;
            let _ = writer.await;
        })
    }

    // Loop to handle ongoing client msgs to server
    async fn handle_read(&self, tcp_read: OwnedReadHalf) {
        let mut fr = FramedRead::new(tcp_read, ServerCodec::new());

        while let Some(value) = fr.next().await {
            match value {
                Ok(event) => {
                    debug!("server received from {}: {:?}", self.id, event);
                    if self.hub_tx.send(HubMsg::Event(self.id, event)).await.is_err() {
                        break;
                    }
                },
                Err(e) => {
                    debug!("Server connection {} closing error: {:?}", self.id, e);
                    break;
                },
            }
        }
    }

    fn spawn_write(id: ConnId, tcp_write: OwnedWriteHalf,
                   mut out_rx: UnboundedReceiver<ServerEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut fw = FramedWrite::new(tcp_write, ServerCodec::new());

            while let Some(event) = out_rx.recv().await {
                if let Err(e) = fw.send(event).await {
                    debug!("Unable to write to connection {}: {:?}", id, e);
                    break;
                }
            }
        })
    }
}
