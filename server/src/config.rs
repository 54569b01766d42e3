use clap::Parser;
use tracing::Level;

/// Single room chat relay server
#[derive(Parser, Debug, Clone)]
#[command(name = "huddle-server", version, about = "Single room chat relay server")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "HUDDLE_ADDR", default_value = "127.0.0.1:4000")]
    pub addr: String,

    /// Bound of the queue feeding connection events into the room
    #[arg(long, env = "HUDDLE_CHANNEL_SIZE", default_value_t = 64)]
    pub channel_size: usize,

    /// Max log level (trace, debug, info, warn, error)
    #[arg(long, env = "HUDDLE_LOG_LEVEL", default_value = "info")]
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:4000".to_owned(),
            channel_size: 64,
            log_level: Level::INFO,
        }
    }
}
