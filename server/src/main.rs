use clap::Parser;
use tokio::select;

use tracing_subscriber::fmt;
use tracing::info;

use server::config::Config;
use server::error::ServerError;
use server::server_channel::ChatRoom;
use server::server_listener::ServerListener;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = Config::parse();

    fmt()
        .compact()
        .with_max_level(config.log_level)
        .init();

    info!("Server starting.. {:?}", &config.addr);

    let listener = ServerListener::bind(&config.addr).await?;

    select! {
        result = server::serve(listener, ChatRoom::new(), &config) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown requested"),
    }

    Ok(())
}
