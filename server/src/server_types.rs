use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

use protocol::{ClientEvent, ServerEvent};

// server type definitions

/// Transport assigned identifier for one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// per connection outbound queue, unbounded since there is no flow control
pub type Outbound = UnboundedSender<ServerEvent>;

/// Messages funneled from connection tasks into the single room owner
#[derive(Debug)]
pub enum HubMsg {
    Connected(ConnId, Outbound),
    Event(ConnId, ClientEvent),
    Disconnected(ConnId),
}
