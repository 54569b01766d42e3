use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::mpsc::Sender;

use crate::client_handler::ClientHandler;
use crate::error::ServerError;
use crate::server_types::{ConnId, HubMsg};

use tracing::{error, info};

const COUNTER_SEED: u64 = 1;

pub struct ServerListener {
    listener: TcpListener,
}

impl ServerListener {

    pub async fn bind(addr: &str) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await
            .map_err(|source| {
                error!("Unable to bind to server address {}", addr);
                ServerError::Bind { addr: addr.to_owned(), source }
            })?;

        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    // Accept until the listener fails or the room goes away
    pub async fn run(self, hub_tx: Sender<HubMsg>) -> Result<(), ServerError> {
        info!("Server listening on {:?}", self.listener.local_addr()?);

        // unique id per accepted connection
        let mut counter = COUNTER_SEED;

        loop {
            let (tcp_socket, addr) = self.listener.accept().await
                .map_err(|e| { error!("Server abnormally exiting .. "); e })?;

            if hub_tx.is_closed() {
                info!("Room closed, no longer accepting connections");
                return Ok(());
            }

            let id = ConnId(counter);
            counter += 1;

            info!("Server received new client connection {:?} as {}", &addr, id);

            ClientHandler::new(id, hub_tx.clone()).spawn(tcp_socket);
        }
    }
}
