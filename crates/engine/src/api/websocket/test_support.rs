use super::*;

use std::{net::SocketAddr, time::Duration};

use axum::routing::get;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use gambit_domain::{RulesEngine, TimeControl};

use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::shakmaty_rules::ShakmatyRules;

pub(crate) type WsClient =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

pub(crate) const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub(crate) struct TestServer {
    pub(crate) addr: SocketAddr,
    pub(crate) state: Arc<WsState>,
    pub(crate) clock: Arc<ManualClock>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

/// Real server on an ephemeral port with a hand-driven clock and no tick driver.
pub(crate) async fn spawn_ws_server(time_control: TimeControl) -> TestServer {
    let connections = Arc::new(ConnectionManager::new());
    let clock = Arc::new(ManualClock::new(t0()));
    let matchmaker = Arc::new(Matchmaker::new(
        connections.clone(),
        clock.clone(),
        Arc::new(|| Box::new(ShakmatyRules::new()) as Box<dyn RulesEngine>),
        time_control,
    ));
    let state = Arc::new(WsState {
        matchmaker,
        connections,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = axum::Router::new().route("/ws", get(ws_handler).with_state(state.clone()));

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        addr,
        state,
        clock,
        _handle: handle,
    }
}

pub(crate) async fn ws_connect(addr: SocketAddr) -> WsClient {
    let url = format!("ws://{}/ws", addr);
    let (ws, _resp) = connect_async(url).await.unwrap();
    ws
}

pub(crate) async fn ws_send_client(ws: &mut WsClient, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(WsMessage::Text(json)).await.unwrap();
}

pub(crate) async fn ws_send_raw(ws: &mut WsClient, text: &str) {
    ws.send(WsMessage::Text(text.to_string())).await.unwrap();
}

pub(crate) async fn ws_send_binary(ws: &mut WsClient, bytes: Vec<u8>) {
    ws.send(WsMessage::Binary(bytes)).await.unwrap();
}

pub(crate) async fn ws_recv_server(ws: &mut WsClient) -> ServerMessage {
    loop {
        let msg = ws.next().await.unwrap().unwrap();
        match msg {
            WsMessage::Text(text) => {
                return serde_json::from_str::<ServerMessage>(&text).unwrap();
            }
            WsMessage::Binary(bin) => {
                let text = String::from_utf8(bin).unwrap();
                return serde_json::from_str::<ServerMessage>(&text).unwrap();
            }
            _ => {}
        }
    }
}

pub(crate) async fn ws_expect_message(ws: &mut WsClient) -> ServerMessage {
    tokio::time::timeout(RECV_TIMEOUT, ws_recv_server(ws))
        .await
        .unwrap()
}

pub(crate) async fn ws_expect_no_message(ws: &mut WsClient, timeout: Duration) {
    let result = tokio::time::timeout(timeout, ws_recv_server(ws)).await;
    assert!(result.is_err(), "unexpected message: {:?}", result);
}

/// Poll until the server has seen `count` connections; the upgrade finishes
/// asynchronously after the client handshake returns.
pub(crate) async fn wait_for_connections(state: &WsState, count: usize) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        while state.connections.connection_count() != count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

/// Poll until some connection occupies the pending slot.
pub(crate) async fn wait_for_pending(state: &WsState) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        while state.matchmaker.pending().await.is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}
