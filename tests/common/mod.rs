//! Test helpers for WebSocket integration tests.
//!
//! Provides a running server on a random port and a JSON-speaking
//! WebSocket client.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use roomcast::{Config, WebServer};

/// Default timeout for test operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Start a server on a random local port.
pub async fn start_server() -> SocketAddr {
    start_server_with(Config::default()).await
}

/// Start a server with a custom configuration on a random local port.
pub async fn start_server_with(mut config: Config) -> SocketAddr {
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    let server = WebServer::new(&config).expect("Failed to create server");
    server
        .run_with_addr()
        .await
        .expect("Failed to start server")
}

/// WebSocket client speaking the chat protocol.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect to the chat endpoint.
    pub async fn connect(addr: SocketAddr) -> Self {
        let (ws, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .expect("Failed to connect");
        Self { ws }
    }

    /// Send a raw text frame.
    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string()))
            .await
            .expect("Failed to send");
    }

    /// Send a raw binary frame.
    pub async fn send_binary(&mut self, data: Vec<u8>) {
        self.ws
            .send(Message::Binary(data))
            .await
            .expect("Failed to send");
    }

    /// Send an event.
    pub async fn send(&mut self, event_type: &str, data: Value) {
        let frame = json!({ "eventType": event_type, "data": data });
        self.send_raw(&frame.to_string()).await;
    }

    /// Receive the next event.
    pub async fn recv(&mut self) -> Value {
        loop {
            let msg = timeout(DEFAULT_TIMEOUT, self.ws.next())
                .await
                .expect("Timed out waiting for event")
                .expect("Connection closed")
                .expect("WebSocket error");
            match msg {
                Message::Text(text) => return serde_json::from_str(&text).expect("Invalid JSON"),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("Unexpected frame: {other:?}"),
            }
        }
    }

    /// Receive the next event and check its type.
    pub async fn expect(&mut self, event_type: &str) -> Value {
        let event = self.recv().await;
        assert_eq!(event["eventType"], event_type, "unexpected event: {event}");
        event["data"].clone()
    }

    /// Assert that nothing arrives within a short window.
    pub async fn assert_silent(&mut self) {
        let result = timeout(Duration::from_millis(200), self.ws.next()).await;
        assert!(result.is_err(), "unexpected frame: {result:?}");
    }

    /// Create a room and return the issued token.
    pub async fn create_room(&mut self, room: &str, username: &str) -> String {
        self.send("create_room", json!({ "roomName": room, "username": username }))
            .await;
        let created = self.expect("room_created").await;
        let joined = self.expect("room_joined").await;
        assert_eq!(created["token"], joined["token"]);
        joined["token"].as_str().unwrap().to_string()
    }

    /// Join a room and return the issued token.
    pub async fn join_room(&mut self, room: &str, username: &str) -> String {
        self.send("join_room", json!({ "roomName": room, "username": username }))
            .await;
        let joined = self.expect("room_joined").await;
        joined["token"].as_str().unwrap().to_string()
    }

    /// Send a chat message.
    pub async fn say(&mut self, room: &str, username: &str, body: &str) {
        self.send(
            "send_message",
            json!({ "roomName": room, "username": username, "body": body }),
        )
        .await;
    }

    /// Close the connection.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}
