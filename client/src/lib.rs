pub mod error;
pub mod config;

// local view
pub mod state;
pub mod store;

// typing indicator
pub mod timer;
pub mod typing;

// connection
pub mod client;
