use std::io as stdio;
use std::io::{stdout, Write};

use clap::Parser;
use tokio::sync::watch::Receiver;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt; // provides combinator methods like next on to of FramedRead buf read and Stream trait
use tokio_util::codec::{FramedRead, LinesCodec};

use tracing_subscriber::fmt;
use tracing::{debug, info};

use client::client::ChatClient;
use client::config::Config;
use client::error::ClientError;
use client::state::ChatState;

const GREETINGS: &str = "$ Welcome to chat! \n$ Commands: \\quit, \\users, \\typing\n$ Please input chat name: ";
const LINES_MAX_LEN: usize = 4096;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let config = Config::parse();

    fmt()
        .compact() // use abbreviated log format
        .with_max_level(config.log_level)
        .with_thread_ids(true) // display thread id where event happens
        .init(); // set as default subscriber

    let name = match config.name.clone() {
        Some(name) => name,
        None => read_sync_user_input(GREETINGS)?,
    };

    let client = ChatClient::connect(&config.addr).await?;
    client.join_chat(&name)?;

    let render_handle = spawn_render(client.subscribe());
    let mut debouncer = client.typing_debouncer();

    let mut fr = FramedRead::new(tokio::io::stdin(), LinesCodec::new_with_max_length(LINES_MAX_LEN));

    while let Some(value) = fr.next().await {
        let line = match value {
            Ok(line) => line,
            Err(e) => {
                debug!("Unable to read input line: {:?}", e);
                continue;
            },
        };

        // handle user inputted commands
        match line.as_str() {
            "\\quit" => {
                info!("Session terminated by user...");
                break;
            },
            "\\users" => {
                println!(">>> Users online: {}", client.state().users.join(", "));
            },
            // a line buffered terminal has no keystrokes, this stands in for one
            "\\typing" => debouncer.keystroke()?,
            text => {
                if client.send_message(text)? {
                    debouncer.message_sent()?;
                }
            },
        }

        if !client.is_connected() {
            println!(">>> Server has closed the connection");
            break;
        }
    }

    drop(debouncer);
    client.close().await;
    render_handle.abort();

    Ok(())
}

// blocking function to gather user input from std::io::stdin
fn read_sync_user_input(prompt: &str) -> stdio::Result<String> {
    let mut buf = String::new();

    print!("{} ", prompt);
    stdout().flush()?;  // Since stdout is line buffered need to explicitly flush
    stdio::stdin().read_line(&mut buf)?;

    Ok(buf.trim_end().to_owned())
}

// Redraw only what changed since the last state we printed
fn spawn_render(mut state_rx: Receiver<ChatState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut shown = ChatState::new();

        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();

            for msg in state.messages.iter().skip(shown.messages.len()) {
                println!("> [{}] {}: {}", msg.timestamp, msg.username, msg.text);
            }

            if state.users != shown.users {
                println!(">>> Users online: {}", state.users.join(", "));
            }

            let typers = state.active_typers();
            if typers != shown.active_typers() && !typers.is_empty() {
                println!(">>> {} typing...", typers.join(", "));
            }

            if shown.connected && !state.connected {
                println!(">>> Disconnected from server");
            }

            shown = state;
        }
    })
}
