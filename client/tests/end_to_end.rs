//! Full round trips between real clients and an in-process server.

use std::net::SocketAddr;
use std::time::Duration;

use futures::SinkExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, FramedWrite};

use client::client::ChatClient;
use client::state::ChatState;
use protocol::{ClientCodec, ClientEvent, ServerEvent};
use server::config::Config;
use server::server_channel::ChatRoom;
use server::server_listener::ServerListener;

const WAIT: Duration = Duration::from_secs(3);

async fn start_server() -> SocketAddr {
    let listener = ServerListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server::serve(listener, ChatRoom::new(), &Config::default()).await;
    });

    addr
}

async fn wait_for<F>(client: &ChatClient, pred: F) -> ChatState
where
    F: Fn(&ChatState) -> bool,
{
    let mut rx = client.subscribe();

    timeout(WAIT, async {
        loop {
            let state = rx.borrow_and_update().clone();
            if pred(&state) {
                return state;
            }
            rx.changed().await.expect("state store dropped");
        }
    })
    .await
    .expect("timed out waiting for client state")
}

async fn joined(addr: SocketAddr, name: &str) -> ChatClient {
    let client = ChatClient::connect(&addr.to_string()).await.unwrap();
    client.join_chat(name).unwrap();
    wait_for(&client, |s| s.users.iter().any(|u| u == name)).await;
    client
}

#[tokio::test]
async fn two_users_chat_and_one_leaves() {
    let addr = start_server().await;

    // 1. alice joins alone
    let alice = joined(addr, "alice").await;
    assert_eq!(alice.state().users, ["alice"]);
    assert!(alice.is_connected());

    // 2. bob joins, both see both
    let bob = joined(addr, "bob").await;
    wait_for(&alice, |s| s.users == ["alice", "bob"]).await;
    assert_eq!(bob.state().users, ["alice", "bob"]);

    // 3. alice says hello, both logs get the same stamped message
    assert!(alice.send_message("hello").unwrap());
    let a = wait_for(&alice, |s| !s.messages.is_empty()).await;
    let b = wait_for(&bob, |s| !s.messages.is_empty()).await;
    assert_eq!(a.messages, b.messages);
    assert_eq!(a.messages[0].username, "alice");
    assert_eq!(a.messages[0].text, "hello");
    assert!(chrono::DateTime::parse_from_rfc3339(&a.messages[0].timestamp).is_ok());

    // 5. alice leaves, bob's roster shrinks
    alice.close().await;
    let b = wait_for(&bob, |s| s.users == ["bob"]).await;
    assert_eq!(b.messages.len(), 1);
}

#[tokio::test]
async fn blank_messages_are_not_sent() {
    let addr = start_server().await;
    let alice = joined(addr, "alice").await;

    assert!(!alice.send_message("   ").unwrap());
    assert!(!alice.send_message("").unwrap());
    assert!(alice.send_message("  padded  ").unwrap());

    let state = wait_for(&alice, |s| !s.messages.is_empty()).await;
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].text, "  padded  ");
}

// observer that counts raw typing events, the state map only keeps the latest flag
async fn observer(addr: SocketAddr, name: &str) -> FramedRead<OwnedReadHalf, ClientCodec> {
    let (r, w) = TcpStream::connect(addr).await.unwrap().into_split();
    let mut fr = FramedRead::new(r, ClientCodec::new());
    let mut fw = FramedWrite::new(w, ClientCodec::new());
    fw.send(ClientEvent::Join(name.into())).await.unwrap();

    let event = timeout(WAIT, fr.next()).await.unwrap().unwrap().unwrap();
    assert!(matches!(event, ServerEvent::Joined(p) if p.username == name));

    // keep the write half open for the life of the test
    tokio::spawn(async move {
        let _fw = fw;
        std::future::pending::<()>().await;
    });

    fr
}

#[tokio::test]
async fn typing_burst_yields_one_stop_and_is_not_echoed() {
    let addr = start_server().await;
    let mut carol = observer(addr, "carol").await;
    let alice = joined(addr, "alice").await;
    let bob = joined(addr, "bob").await;
    wait_for(&alice, |s| s.users.len() == 3).await;

    // 4. bob types in a burst then goes quiet
    let mut debouncer = bob.typing_debouncer_with_delay(Duration::from_millis(300));
    for _ in 0..3 {
        debouncer.keystroke().unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    wait_for(&alice, |s| s.typing.get("bob") == Some(&true)).await;
    let quiet = wait_for(&alice, |s| s.typing.get("bob") == Some(&false)).await;
    assert!(quiet.active_typers().is_empty());

    let mut flags = vec![];
    loop {
        match timeout(Duration::from_millis(500), carol.next()).await {
            Ok(Some(Ok(ServerEvent::Typing(t)))) => {
                assert_eq!(t.username, "bob");
                flags.push(t.is_typing);
            },
            Ok(Some(Ok(_))) => continue, // presence from later joiners
            _ => break,
        }
    }
    assert_eq!(flags, [true, true, true, false]);

    // never echoed back to the typist
    assert!(bob.state().typing.is_empty());
}

#[tokio::test]
async fn departed_typist_stays_flagged() {
    let addr = start_server().await;
    let alice = joined(addr, "alice").await;
    let bob = joined(addr, "bob").await;

    bob.set_typing(true).unwrap();
    wait_for(&alice, |s| s.active_typers() == ["bob"]).await;

    bob.close().await;
    let state = wait_for(&alice, |s| s.users == ["alice"]).await;
    assert_eq!(state.active_typers(), ["bob"]);
}

#[tokio::test]
async fn connect_to_missing_server_fails() {
    let listener = ServerListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = ChatClient::connect(&addr.to_string()).await;
    assert!(matches!(result, Err(client::error::ClientError::Io(_))));
}
