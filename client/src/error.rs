use thiserror::Error;
use tokio::sync::mpsc::error::SendError;

use protocol::{ClientEvent, ProtocolError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("connection to server is closed")]
    Disconnected,
}

// the writer task owns the receiving end, a send error means it has exited
impl From<SendError<ClientEvent>> for ClientError {
    fn from(_: SendError<ClientEvent>) -> Self {
        ClientError::Disconnected
    }
}
