//! Connection id to chat name mapping for everyone who has joined.
//!
//! Names are deliberately not unique, two connections may pick the same
//! display name. Entries keep their registration order so roster snapshots
//! stay stable across repeated presence events.

use crate::server_types::ConnId;

pub const UNKNOWN_USER: &str = "Unknown";

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    // insertion ordered, rosters are small enough for linear scans
    entries: Vec<(ConnId, String)>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts the name, or overwrites it in place if the connection already joined.
    pub fn register(&mut self, id: ConnId, username: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some((_, name)) => *name = username,
            None => self.entries.push((id, username)),
        }
    }

    /// Removes the connection, returning its name or [`UNKNOWN_USER`]
    /// if it never joined.
    pub fn unregister(&mut self, id: ConnId) -> String {
        match self.entries.iter().position(|(k, _)| *k == id) {
            Some(pos) => self.entries.remove(pos).1,
            None => UNKNOWN_USER.to_owned(),
        }
    }

    pub fn lookup(&self, id: ConnId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == id)
            .map(|(_, name)| name.as_str())
    }

    pub fn contains(&self, id: ConnId) -> bool {
        self.lookup(id).is_some()
    }

    // all current names in registration order
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
