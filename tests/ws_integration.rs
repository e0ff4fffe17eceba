//! WebSocket protocol integration tests.
//!
//! These tests drive a real server over real sockets.

mod common;

use serde_json::json;

use common::{start_server, TestClient};

#[tokio::test]
async fn test_create_and_join_room() {
    let addr = start_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    alice
        .send(
            "create_room",
            json!({ "roomName": "general", "username": "alice" }),
        )
        .await;
    let created = alice.expect("room_created").await;
    let joined = alice.expect("room_joined").await;
    assert_eq!(created["roomName"], "general");
    assert_eq!(joined["roomName"], "general");
    assert_eq!(created["token"], joined["token"]);
    let t1 = created["token"].as_str().unwrap().to_string();
    assert_eq!(t1.len(), roomcast::chat::TOKEN_LENGTH);

    let t2 = bob.join_room("general", "bob").await;
    assert_ne!(t1, t2);
}

#[tokio::test]
async fn test_message_fan_out() {
    let addr = start_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let mut carol = TestClient::connect(addr).await;
    alice.create_room("general", "alice").await;
    bob.join_room("general", "bob").await;
    carol.create_room("random", "carol").await;

    alice.say("general", "alice", "hi").await;

    let expected = json!({ "username": "alice", "body": "hi" });
    assert_eq!(alice.expect("message_received").await, expected);
    assert_eq!(bob.expect("message_received").await, expected);
    carol.assert_silent().await;
}

#[tokio::test]
async fn test_join_missing_room() {
    let addr = start_server().await;
    let mut carol = TestClient::connect(addr).await;

    carol
        .send(
            "join_room",
            json!({ "roomName": "missing-room", "username": "carol" }),
        )
        .await;
    let error = carol.expect("error").await;
    assert_eq!(error["code"], "RoomNotFound");

    // Nothing was created as a side effect
    let body = reqwest::get(format!("http://{addr}/rooms"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "{}");
}

#[tokio::test]
async fn test_reconnect_bogus_token() {
    let addr = start_server().await;
    let mut alice = TestClient::connect(addr).await;
    alice.create_room("general", "alice").await;
    let mut client = TestClient::connect(addr).await;

    client
        .send("reconnect_room", json!({ "token": "bogus-token" }))
        .await;
    assert_eq!(
        client.expect("invalid_token").await,
        json!({ "token": "bogus-token" })
    );

    // Alice keeps the original binding; the stranger receives nothing
    alice.say("general", "alice", "still here").await;
    assert_eq!(
        alice.expect("message_received").await,
        json!({ "username": "alice", "body": "still here" })
    );
    client.assert_silent().await;

    let body = reqwest::get(format!("http://{addr}/rooms"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let rooms: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(rooms["general"]["users"], json!(["alice"]));
}

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let addr = start_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let token = alice.create_room("general", "alice").await;
    bob.join_room("general", "bob").await;

    alice.close().await;

    // Messages while alice is away only reach bob
    bob.say("general", "bob", "she left").await;
    bob.expect("message_received").await;

    let mut alice = TestClient::connect(addr).await;
    alice.send("reconnect_room", json!({ "token": token })).await;
    assert_eq!(
        alice.expect("room_reconnected").await,
        json!({ "token": token, "roomName": "general", "username": "alice" })
    );

    bob.say("general", "bob", "welcome back").await;
    assert_eq!(
        alice.expect("message_received").await,
        json!({ "username": "bob", "body": "welcome back" })
    );
    bob.expect("message_received").await;
}

#[tokio::test]
async fn test_leave_room_revokes_token() {
    let addr = start_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let token = alice.create_room("general", "alice").await;
    bob.join_room("general", "bob").await;

    alice
        .send(
            "leave_room",
            json!({ "roomName": "general", "username": "alice", "token": token }),
        )
        .await;
    assert_eq!(
        alice.expect("room_left").await,
        json!({ "token": token, "roomName": "general" })
    );

    // Alice no longer receives room traffic
    bob.say("general", "bob", "bye").await;
    bob.expect("message_received").await;
    alice.assert_silent().await;

    alice.send("reconnect_room", json!({ "token": token })).await;
    alice.expect("invalid_token").await;

    // The name is free again
    alice.join_room("general", "alice").await;
}

#[tokio::test]
async fn test_duplicate_room_and_username() {
    let addr = start_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut other = TestClient::connect(addr).await;
    alice.create_room("general", "alice").await;

    other
        .send(
            "create_room",
            json!({ "roomName": "general", "username": "bob" }),
        )
        .await;
    assert_eq!(other.expect("error").await["code"], "RoomAlreadyExists");

    other
        .send(
            "join_room",
            json!({ "roomName": "general", "username": "alice" }),
        )
        .await;
    assert_eq!(other.expect("error").await["code"], "UsernameTaken");
}

#[tokio::test]
async fn test_validation_error_keeps_connection_open() {
    let addr = start_server().await;
    let mut client = TestClient::connect(addr).await;

    client
        .send("create_room", json!({ "roomName": "general" }))
        .await;
    let error = client.expect("error").await;
    assert_eq!(error["code"], "MissingField");
    assert_eq!(error["message"], "missing username");

    client.create_room("general", "alice").await;
}

#[tokio::test]
async fn test_invalid_frames_keep_connection_open() {
    let addr = start_server().await;
    let mut client = TestClient::connect(addr).await;

    client.send_raw("this is not json").await;
    assert_eq!(client.expect("error").await["code"], "InvalidEvent");

    client.send("teleport", json!({})).await;
    assert_eq!(client.expect("error").await["code"], "InvalidEvent");

    client.create_room("general", "alice").await;
}

#[tokio::test]
async fn test_non_utf8_binary_frame_is_rejected() {
    let addr = start_server().await;
    let mut client = TestClient::connect(addr).await;

    client.send_binary(vec![0xff, 0xfe, 0xfd]).await;
    let error = client.expect("error").await;
    assert_eq!(error["code"], "InvalidEvent");

    // Nothing was created from the garbage and the socket still works
    client.create_room("general", "alice").await;
}

#[tokio::test]
async fn test_utf8_binary_frame_is_dispatched() {
    let addr = start_server().await;
    let mut client = TestClient::connect(addr).await;

    let frame = json!({
        "eventType": "create_room",
        "data": { "roomName": "général", "username": "zoë" }
    });
    client.send_binary(frame.to_string().into_bytes()).await;
    assert_eq!(client.expect("room_created").await["roomName"], "général");
    client.expect("room_joined").await;
}

#[tokio::test]
async fn test_messages_arrive_in_order() {
    let addr = start_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    alice.create_room("general", "alice").await;
    bob.join_room("general", "bob").await;

    const COUNT: usize = 50;
    for i in 0..COUNT {
        alice.say("general", "alice", &i.to_string()).await;
    }

    for client in [&mut alice, &mut bob] {
        for i in 0..COUNT {
            let msg = client.expect("message_received").await;
            assert_eq!(msg["body"], i.to_string());
        }
    }
}

#[tokio::test]
async fn test_rooms_endpoint_reflects_membership() {
    let addr = start_server().await;
    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let token = alice.create_room("general", "alice").await;
    bob.join_room("general", "bob").await;

    let body = reqwest::get(format!("http://{addr}/rooms"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let rooms: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(rooms["general"]["name"], "general");
    assert_eq!(rooms["general"]["users"], json!(["alice", "bob"]));
    assert!(!body.contains(&token));
}
