use thiserror::Error;

use protocol::ProtocolError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unable to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
