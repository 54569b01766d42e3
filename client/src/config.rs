use clap::Parser;
use tracing::Level;

/// Terminal client for the single room chat relay
#[derive(Parser, Debug, Clone)]
#[command(name = "huddle-client", version, about = "Terminal client for the single room chat relay")]
pub struct Config {
    /// Server address to connect to
    #[arg(long, env = "HUDDLE_ADDR", default_value = "127.0.0.1:4000")]
    pub addr: String,

    /// Chat name, prompted for when not given
    #[arg(long, env = "HUDDLE_NAME")]
    pub name: Option<String>,

    /// Max log level, kept low so logs do not drown the chat
    #[arg(long, env = "HUDDLE_LOG_LEVEL", default_value = "warn")]
    pub log_level: Level,
}
