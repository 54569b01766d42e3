use std::collections::HashMap;

use tracing::{debug, warn};

use protocol::ServerEvent;

use crate::server_types::{ConnId, Outbound};

// handles msg delivery back to clients, one outbound queue per live connection
#[derive(Debug, Default)]
pub struct Delivery {
    handles: HashMap<ConnId, Outbound>,
}

impl Delivery {
    pub fn new() -> Self {
        Self { handles: HashMap::new() }
    }

    pub fn attach(&mut self, id: ConnId, tx: Outbound) {
        self.handles.insert(id, tx);
    }

    // dropping the sender lets the connection's writer task finish
    pub fn detach(&mut self, id: ConnId) -> bool {
        self.handles.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn send(&self, id: ConnId, event: ServerEvent) -> bool {
        match self.handles.get(&id) {
            Some(tx) => Self::push(id, tx, event),
            None => {
                debug!("No live connection {} for single send", id);
                false
            }
        }
    }

    /// Fans out to every live connection, returns how many accepted the event.
    pub fn broadcast(&self, event: &ServerEvent) -> usize {
        self.fan_out(event, None)
    }

    pub fn broadcast_except(&self, except: ConnId, event: &ServerEvent) -> usize {
        self.fan_out(event, Some(except))
    }

    fn fan_out(&self, event: &ServerEvent, except: Option<ConnId>) -> usize {
        let mut delivered = 0;

        for (id, tx) in self.handles.iter() {
            if Some(*id) == except { continue } // skip the send to except client id

            if Self::push(*id, tx, event.clone()) {
                delivered += 1;
            }
        }

        delivered
    }

    // a failed send only affects that one connection
    fn push(id: ConnId, tx: &Outbound, event: ServerEvent) -> bool {
        match tx.send(event) {
            Ok(()) => true,
            Err(_) => {
                warn!("Unable to queue event for connection {}, writer is gone", id);
                false
            }
        }
    }
}
