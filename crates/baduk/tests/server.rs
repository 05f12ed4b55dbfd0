//! End-to-end tests: real WebSocket clients against a server on port 0.

use std::sync::Arc;
use std::time::Duration;

use baduk::prelude::*;
use baduk::room::RoomManager;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Countdown start used by every test server. Short periods keep the
/// suite fast on a real clock.
const COUNTDOWN_START: u32 = 8;

/// Starts a server on a random port and returns its address together with
/// its room manager.
async fn start_server() -> (String, Arc<RoomManager<GoRules>>) {
    let server = BadukServerBuilder::new()
        .bind("127.0.0.1:0")
        .room_config(RoomConfig {
            countdown: CountdownConfig {
                start: COUNTDOWN_START,
                period: Duration::from_millis(50),
            },
            ..RoomConfig::default()
        })
        .build::<GoRules>()
        .await
        .expect("server should build");

    let addr = server.local_addr().expect("should have local addr").to_string();
    let rooms = server.rooms();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    (addr, rooms)
}

/// A browser stand-in speaking the JSON event protocol.
struct TestClient {
    ws: ClientWs,
}

impl TestClient {
    async fn connect(addr: &str) -> Self {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("should connect");
        Self { ws }
    }

    async fn send_raw(&mut self, frame: &str) {
        self.ws
            .send(Message::Text(frame.to_owned().into()))
            .await
            .expect("send");
    }

    async fn emit(&mut self, event: &str, data: Value) {
        let frame = json!({ "event": event, "data": data });
        self.send_raw(&frame.to_string()).await;
    }

    /// Joins `room` as `name` and returns the assigned role.
    async fn join(&mut self, name: &str, room: &str) -> String {
        self.emit("join", json!({ "name": name, "room": room })).await;
        let role = self.until("type").await;
        role.as_str().expect("role is a string").to_owned()
    }

    /// Next event from the server as `{event, data}`.
    async fn next(&mut self) -> Value {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(3), self.ws.next())
                .await
                .expect("timed out waiting for an event")
                .expect("stream ended")
                .expect("websocket error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).expect("server sent invalid JSON");
            }
        }
    }

    /// Skips events until one named `event` arrives and returns its data.
    async fn until(&mut self, event: &str) -> Value {
        loop {
            let value = self.next().await;
            if value["event"] == event {
                return value["data"].clone();
            }
        }
    }

    /// Expects the next `error` event and returns its code.
    async fn error_code(&mut self) -> u64 {
        let data = self.until("error").await;
        data["code"].as_u64().expect("numeric code")
    }

    async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

/// Two players in `room`, past negotiation. Returns `(black, white)`.
async fn start_game(addr: &str, room: &str) -> (TestClient, TestClient) {
    let mut a = TestClient::connect(addr).await;
    let mut b = TestClient::connect(addr).await;
    assert_eq!(a.join("ann", room).await, "player");
    assert_eq!(b.join("bob", room).await, "player");

    a.emit("colorChoice", json!("black")).await;

    let a_color = a.until("color").await;
    let b_color = b.until("color").await;
    a.until("board").await;
    b.until("board").await;

    assert_eq!(a_color, "black");
    assert_eq!(b_color, "white");
    (a, b)
}

fn cell(board: &Value, x: usize, y: usize) -> char {
    let rows: Vec<&str> = board["board"].as_str().expect("board string").split('\n').collect();
    rows[x].chars().nth(y).expect("cell in range")
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_join_assigns_player_then_spectator() {
    let (addr, _) = start_server().await;
    let mut a = TestClient::connect(&addr).await;
    let mut b = TestClient::connect(&addr).await;
    let mut c = TestClient::connect(&addr).await;

    assert_eq!(a.join("ann", "lobby").await, "player");
    assert_eq!(b.join("bob", "lobby").await, "player");
    assert_eq!(c.join("cat", "lobby").await, "spectator");
}

#[tokio::test]
async fn test_negotiation_counts_down_then_sends_board() {
    let (addr, _) = start_server().await;
    let mut a = TestClient::connect(&addr).await;
    let mut b = TestClient::connect(&addr).await;
    a.join("ann", "r").await;
    b.join("bob", "r").await;

    assert_eq!(a.until("colorCountDown").await, json!(COUNTDOWN_START));
    let mut last = COUNTDOWN_START;
    loop {
        let event = a.next().await;
        match event["event"].as_str() {
            Some("colorCountDown") => {
                let remaining = event["data"].as_u64().expect("number") as u32;
                assert!(remaining < last, "countdown must decrease");
                last = remaining;
            }
            Some("color") => {}
            Some("board") => {
                let board = &event["data"];
                assert_eq!(board["size"], 9);
                assert_eq!(board["turn"], 0);
                assert_eq!(board["turnColor"], "black");
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(last, 0);
}

#[tokio::test]
async fn test_color_choice_reaches_the_other_player() {
    let (addr, _) = start_server().await;
    let mut a = TestClient::connect(&addr).await;
    let mut b = TestClient::connect(&addr).await;
    a.join("ann", "r").await;
    b.join("bob", "r").await;

    a.emit("colorChoice", json!("white")).await;
    assert_eq!(b.until("enemyColor").await, "white");

    assert_eq!(a.until("color").await, "white");
    assert_eq!(b.until("color").await, "black");
}

#[tokio::test]
async fn test_stone_request_places_and_broadcasts() {
    let (addr, _) = start_server().await;
    let (mut black, mut white) = start_game(&addr, "game").await;
    let mut spectator = TestClient::connect(&addr).await;
    assert_eq!(spectator.join("sam", "game").await, "spectator");

    black.emit("stoneRequest", json!(40)).await;

    for client in [&mut black, &mut white, &mut spectator] {
        let board = client.until("board").await;
        assert_eq!(board["turn"], 1);
        assert_eq!(board["turnColor"], "white");
        assert_eq!(cell(&board, 4, 4), 'b');
    }
}

#[tokio::test]
async fn test_stone_request_out_of_turn_is_rejected() {
    let (addr, _) = start_server().await;
    let (_black, mut white) = start_game(&addr, "game").await;

    white.emit("stoneRequest", json!(0)).await;
    assert_eq!(white.error_code().await, 422);
}

#[tokio::test]
async fn test_stone_request_on_occupied_point_is_rejected() {
    let (addr, _) = start_server().await;
    let (mut black, mut white) = start_game(&addr, "game").await;

    black.emit("stoneRequest", json!(10)).await;
    white.until("board").await;
    white.emit("stoneRequest", json!(10)).await;
    assert_eq!(white.error_code().await, 422);
}

#[tokio::test]
async fn test_stone_request_out_of_range_is_protocol_misuse() {
    let (addr, _) = start_server().await;
    let (mut black, _white) = start_game(&addr, "game").await;

    black.emit("stoneRequest", json!(81)).await;
    assert_eq!(black.error_code().await, 400);
}

#[tokio::test]
async fn test_stone_request_before_game_is_invalid_state() {
    let (addr, _) = start_server().await;
    let mut a = TestClient::connect(&addr).await;
    a.join("ann", "r").await;

    a.emit("stoneRequest", json!(0)).await;
    assert_eq!(a.error_code().await, 403);
}

#[tokio::test]
async fn test_board_request_broadcasts_to_room() {
    let (addr, _) = start_server().await;
    let (mut black, mut white) = start_game(&addr, "game").await;
    let mut spectator = TestClient::connect(&addr).await;
    spectator.join("sam", "game").await;

    spectator.send_raw(r#"{"event":"boardRequest"}"#).await;

    for client in [&mut black, &mut white, &mut spectator] {
        let board = client.until("board").await;
        assert_eq!(board["turn"], 0);
    }
}

#[tokio::test]
async fn test_board_request_accepts_any_payload() {
    let (addr, _) = start_server().await;
    let (mut black, _white) = start_game(&addr, "game").await;

    for frame in [
        r#"{"event":"boardRequest","data":{}}"#,
        r#"{"event":"boardRequest","data":null}"#,
        r#"{"event":"boardRequest","data":""}"#,
    ] {
        black.send_raw(frame).await;
        let event = black.next().await;
        assert_eq!(event["event"], "board", "reply to {frame}");
    }
}

#[tokio::test]
async fn test_event_before_join_is_not_found() {
    let (addr, _) = start_server().await;
    let mut a = TestClient::connect(&addr).await;

    a.send_raw(r#"{"event":"boardRequest"}"#).await;
    assert_eq!(a.error_code().await, 404);
}

#[tokio::test]
async fn test_malformed_frames_are_protocol_misuse() {
    let (addr, _) = start_server().await;
    let mut a = TestClient::connect(&addr).await;

    a.send_raw("not json").await;
    assert_eq!(a.error_code().await, 400);

    a.emit("colorChoice", json!("green")).await;
    assert_eq!(a.error_code().await, 400);

    a.emit("teleport", json!(1)).await;
    assert_eq!(a.error_code().await, 400);

    // The connection survives bad input.
    assert_eq!(a.join("ann", "r").await, "player");
}

#[tokio::test]
async fn test_invalid_utf8_binary_frame_is_protocol_misuse() {
    let (addr, _) = start_server().await;
    let mut a = TestClient::connect(&addr).await;

    a.ws
        .send(Message::Binary(vec![0xff, 0xfe, 0xfd].into()))
        .await
        .expect("send");
    assert_eq!(a.error_code().await, 400);

    assert_eq!(a.join("ann", "r").await, "player");
}

#[tokio::test]
async fn test_silent_connection_does_not_block_other_clients() {
    let (addr, _) = start_server().await;

    // Opens TCP but never sends the WebSocket upgrade request.
    let _silent = tokio::net::TcpStream::connect(&addr)
        .await
        .expect("tcp connect");

    let role = tokio::time::timeout(Duration::from_secs(2), async {
        let mut a = TestClient::connect(&addr).await;
        a.join("ann", "r").await
    })
    .await
    .expect("second client should be served while the first stays silent");
    assert_eq!(role, "player");
}

#[tokio::test]
async fn test_join_with_empty_name_is_protocol_misuse() {
    let (addr, rooms) = start_server().await;
    let mut a = TestClient::connect(&addr).await;

    a.emit("join", json!({ "name": "", "room": "r" })).await;
    assert_eq!(a.error_code().await, 400);
    assert_eq!(rooms.room_count().await, 0);
}

#[tokio::test]
async fn test_join_duplicate_name_is_conflict() {
    let (addr, _) = start_server().await;
    let mut a = TestClient::connect(&addr).await;
    let mut b = TestClient::connect(&addr).await;
    a.join("ann", "r").await;

    b.emit("join", json!({ "name": "ann", "room": "r" })).await;
    assert_eq!(b.error_code().await, 409);

    // A different name still gets in.
    assert_eq!(b.join("bob", "r").await, "player");
}

#[tokio::test]
async fn test_join_twice_on_one_connection_is_conflict() {
    let (addr, _) = start_server().await;
    let mut a = TestClient::connect(&addr).await;
    a.join("ann", "r").await;

    a.emit("join", json!({ "name": "ann2", "room": "other" })).await;
    assert_eq!(a.error_code().await, 409);
}

#[tokio::test]
async fn test_errors_go_only_to_the_sender() {
    let (addr, _) = start_server().await;
    let (mut black, mut white) = start_game(&addr, "game").await;

    white.emit("stoneRequest", json!(0)).await;
    assert_eq!(white.error_code().await, 422);

    // The next thing black sees is its own move's board, not white's error.
    black.emit("stoneRequest", json!(0)).await;
    let event = black.next().await;
    assert_eq!(event["event"], "board");
}

#[tokio::test]
async fn test_player_disconnect_resets_countdown() {
    let (addr, _) = start_server().await;
    let (mut black, white) = start_game(&addr, "game").await;

    white.close().await;
    assert_eq!(black.until("colorCountDown").await, 10);
}

#[tokio::test]
async fn test_disconnect_of_last_client_removes_room() {
    let (addr, rooms) = start_server().await;
    let mut a = TestClient::connect(&addr).await;
    a.join("ann", "solo").await;

    let listed = rooms.list_rooms().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "solo");
    assert_eq!(listed[0].client_count, 1);

    a.close().await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while rooms.room_count().await > 0 {
        assert!(tokio::time::Instant::now() < deadline, "room was not removed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_rooms_are_independent() {
    let (addr, rooms) = start_server().await;
    let (mut black, _white) = start_game(&addr, "one").await;
    let mut other = TestClient::connect(&addr).await;
    assert_eq!(other.join("ann", "two").await, "player");

    black.emit("stoneRequest", json!(40)).await;
    black.until("board").await;

    other.send_raw(r#"{"event":"boardRequest"}"#).await;
    let board = other.until("board").await;
    assert_eq!(board["turn"], 0);
    assert_eq!(cell(&board, 4, 4), '-');

    let names: Vec<String> = rooms.list_rooms().await.into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["one", "two"]);
}
