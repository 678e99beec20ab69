//! Real sockets against a served app.

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use wharf::websocket::{Registry, WebSocketConfig};
use wharf::{App, AppContext};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Server {
    addr: SocketAddr,
    registry: Arc<Registry>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<wharf::Result<()>>,
}

impl Server {
    async fn start(ws: WebSocketConfig) -> Self {
        let registry = Arc::new(Registry::with_config(ws));
        let ctx = AppContext::builder().with_registry(registry.clone()).build();
        let app = App::new().with_context(ctx).with_default_routes();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(app.serve_with(listener, async {
            let _ = stopped.await;
        }));

        Self {
            addr,
            registry,
            stop: Some(stop),
            handle,
        }
    }

    async fn connect(&self) -> Client {
        let (client, _) = connect_async(format!("ws://{}/ws", self.addr)).await.unwrap();
        client
    }

    async fn wait_for_count(&self, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.registry.count().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("registry never reached {expected} connections"));
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }
}

async fn next_data(client: &mut Client) -> Message {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match client.next().await {
                Some(Ok(msg)) if msg.is_text() || msg.is_binary() => return msg,
                Some(Ok(_)) => continue,
                other => panic!("socket ended before a data frame: {other:?}"),
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn text_is_relayed_to_everyone_including_sender() {
    let server = Server::start(WebSocketConfig::default()).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_count(2).await;

    alice.send(Message::text("hello harbour")).await.unwrap();

    assert_eq!(next_data(&mut alice).await.to_text().unwrap(), "hello harbour");
    assert_eq!(next_data(&mut bob).await.to_text().unwrap(), "hello harbour");

    server.shutdown().await;
}

#[tokio::test]
async fn binary_frames_keep_their_kind() {
    let server = Server::start(WebSocketConfig::default()).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_count(2).await;

    bob.send(Message::binary(vec![0u8, 159, 146, 150])).await.unwrap();

    let received = next_data(&mut alice).await;
    assert!(received.is_binary());
    assert_eq!(&received.into_data()[..], &[0u8, 159, 146, 150]);

    server.shutdown().await;
}

#[tokio::test]
async fn one_senders_messages_arrive_in_order() {
    let server = Server::start(WebSocketConfig::default()).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_count(2).await;

    for i in 0..20 {
        alice.send(Message::text(format!("msg-{i}"))).await.unwrap();
    }
    for i in 0..20 {
        assert_eq!(next_data(&mut bob).await.to_text().unwrap(), format!("msg-{i}"));
    }

    server.shutdown().await;
}

#[tokio::test]
async fn closed_client_is_deregistered() {
    let server = Server::start(WebSocketConfig::default()).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_count(2).await;

    bob.close(None).await.unwrap();
    server.wait_for_count(1).await;

    alice.send(Message::text("still here")).await.unwrap();
    assert_eq!(next_data(&mut alice).await.to_text().unwrap(), "still here");

    server.shutdown().await;
}

#[tokio::test]
async fn abrupt_disconnect_leaves_sender_alone() {
    let server = Server::start(WebSocketConfig::default()).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_count(2).await;

    alice.send(Message::text("hello")).await.unwrap();
    assert_eq!(next_data(&mut alice).await.to_text().unwrap(), "hello");
    assert_eq!(next_data(&mut bob).await.to_text().unwrap(), "hello");

    // no close handshake
    drop(bob);
    server.wait_for_count(1).await;

    alice.send(Message::text("ping")).await.unwrap();
    assert_eq!(next_data(&mut alice).await.to_text().unwrap(), "ping");

    server.shutdown().await;
}

#[tokio::test]
async fn connection_limit_refuses_upgrade() {
    let server = Server::start(WebSocketConfig {
        max_connections: 1,
        ..WebSocketConfig::default()
    })
    .await;
    let _first = server.connect().await;
    server.wait_for_count(1).await;

    let err = connect_async(format!("ws://{}/ws", server.addr))
        .await
        .unwrap_err();
    match err {
        tungstenite::Error::Http(response) => assert_eq!(response.status().as_u16(), 503),
        other => panic!("expected HTTP 503, got {other:?}"),
    }

    server.shutdown().await;
}

#[tokio::test]
async fn shutdown_closes_open_sockets() {
    let server = Server::start(WebSocketConfig::default()).await;
    let mut alice = server.connect().await;
    server.wait_for_count(1).await;

    let registry = server.registry.clone();
    server.shutdown().await;
    assert_eq!(registry.count().await, 0);

    let ended = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match alice.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "client socket stayed open after shutdown");
}
