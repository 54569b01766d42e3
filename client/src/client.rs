use std::time::Duration;

use futures::SinkExt; // provides combinator methods like send/send_all on top of FramedWrite buf write and Sink trait
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::select;
use tokio::sync::broadcast::{self, Receiver as BReceiver, Sender as BSender};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch::Receiver as WReceiver;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt; // provides combinator methods like next on to of FramedRead buf read and Stream trait
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info};

use protocol::{ClientCodec, ClientEvent, SendPayload};

use crate::error::ClientError;
use crate::state::ChatState;
use crate::store::StateStore;
use crate::typing::TypingDebouncer;

const SHUTDOWN: u8 = 1;

/// Connection to the chat server.
///
/// Inbound events are folded into a [`StateStore`] by a reader task, outbound
/// events are queued to a writer task so callers never wait on the socket.
pub struct ChatClient {
    local_tx: UnboundedSender<ClientEvent>,
    store: StateStore,
    shutdown_tx: BSender<u8>,
    read_handle: JoinHandle<()>,
    write_handle: JoinHandle<()>,
}

impl ChatClient {

    pub async fn connect(addr: &str) -> Result<ChatClient, ClientError> {
        info!("Client starting, connecting to server {:?}", addr);

        let client = TcpStream::connect(addr).await
            .map_err(|e| { error!("Unable to connect to server"); e })?;

        // split tcpstream so we can hand off to r & w tasks
        let (tcp_read, tcp_write) = client.into_split();

        let store = StateStore::new();
        store.set_connected(true);

        let (local_tx, local_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let read_handle = Self::spawn_read(tcp_read, store.clone());
        let write_handle = Self::spawn_write(tcp_write, local_rx, shutdown_rx);

        Ok(ChatClient { local_tx, store, shutdown_tx, read_handle, write_handle })
    }

    pub fn join_chat(&self, username: &str) -> Result<(), ClientError> {
        self.local_tx.send(ClientEvent::Join(username.to_owned()))?;
        Ok(())
    }

    /// Sends unless the text is blank, returns whether anything went out.
    /// The text itself is sent as typed, surrounding whitespace included.
    pub fn send_message(&self, text: &str) -> Result<bool, ClientError> {
        if text.trim().is_empty() {
            return Ok(false);
        }

        self.local_tx.send(ClientEvent::Send(SendPayload { text: text.to_owned() }))?;
        Ok(true)
    }

    pub fn set_typing(&self, is_typing: bool) -> Result<(), ClientError> {
        self.local_tx.send(ClientEvent::Typing(is_typing))?;
        Ok(())
    }

    pub fn typing_debouncer(&self) -> TypingDebouncer {
        TypingDebouncer::new(self.local_tx.clone())
    }

    pub fn typing_debouncer_with_delay(&self, delay: Duration) -> TypingDebouncer {
        TypingDebouncer::with_delay(self.local_tx.clone(), delay)
    }

    pub fn subscribe(&self) -> WReceiver<ChatState> {
        self.store.subscribe()
    }

    pub fn state(&self) -> ChatState {
        self.store.state()
    }

    pub fn is_connected(&self) -> bool {
        self.store.state().connected
    }

    /// Flushes queued events and closes the connection.
    pub async fn close(self) {
        let ChatClient { store, shutdown_tx, read_handle, write_handle, .. } = self;

        // debouncers may still hold senders, so the writer is told explicitly
        let _ = shutdown_tx.send(SHUTDOWN);
        let _ = write_handle.await;

        read_handle.abort();
        store.set_connected(false);
    }

    fn spawn_read(tcp_read: OwnedReadHalf, store: StateStore) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut fr = FramedRead::new(tcp_read, ClientCodec::new());

            loop {
                match fr.next().await {
                    Some(Ok(event)) => {
                        debug!("received server event {:?}", event);
                        store.apply(&event);
                    },
                    Some(Err(e)) => {
                        debug!("Client connection closing error: {:?}", e);
                        break;
                    },
                    None => {
                        info!("Server remote has closed");
                        break;
                    },
                }
            }

            store.set_connected(false);
        })
    }

    fn spawn_write(tcp_write: OwnedWriteHalf, mut local_rx: UnboundedReceiver<ClientEvent>,
                   mut shutdown_rx: BReceiver<u8>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut fw = FramedWrite::new(tcp_write, ClientCodec::new());

            loop {
                select! {
                    // Read from channel, events produced by the local user
                    Some(event) = local_rx.recv() => {
                        if let Err(e) = fw.send(event).await {
                            error!("Unable to write to server: {:?}", e);
                            return;
                        }
                    },
                    _ = shutdown_rx.recv() => {
                        // flush whatever was queued before the shutdown
                        while let Ok(event) = local_rx.try_recv() {
                            if fw.send(event).await.is_err() { return }
                        }
                        debug!("Client writer shutting down");
                        return;
                    },
                    else => return,
                }
            }
        })
    }
}
