use super::test_support::*;
use super::*;

use std::time::Duration;

use gambit_domain::{ClockSnapshot, Color, EndReason, MoveRequest, TimeControl};
use gambit_shared::{GameOverPayload, InitGamePayload, MovePayload};

/// Connect two clients and pair them, first as white. Returns (white, black).
async fn paired_clients(server: &TestServer) -> (WsClient, WsClient) {
    let mut a = ws_connect(server.addr).await;
    let mut b = ws_connect(server.addr).await;

    ws_send_client(&mut a, &ClientMessage::InitGame).await;
    wait_for_pending(&server.state).await;
    ws_send_client(&mut b, &ClientMessage::InitGame).await;

    let to_a = ws_expect_message(&mut a).await;
    let to_b = ws_expect_message(&mut b).await;
    let tc = server.state.matchmaker.time_control();
    assert_eq!(
        to_a,
        ServerMessage::InitGame(InitGamePayload {
            color: Color::White,
            time_control: Some(tc),
        })
    );
    assert_eq!(
        to_b,
        ServerMessage::InitGame(InitGamePayload {
            color: Color::Black,
            time_control: Some(tc),
        })
    );

    (a, b)
}

fn move_msg(from: &str, to: &str) -> ClientMessage {
    ClientMessage::Move {
        request: MoveRequest::new(from, to),
    }
}

#[tokio::test]
async fn pairs_two_clients_and_relays_moves() {
    let server = spawn_ws_server(TimeControl::default()).await;
    let (mut a, mut b) = paired_clients(&server).await;
    assert_eq!(server.state.matchmaker.session_count().await, 1);

    ws_send_client(&mut a, &move_msg("e2", "e4")).await;

    let expected = ServerMessage::Move(MovePayload {
        from: "e2".into(),
        to: "e4".into(),
        san: "e4".into(),
        promotion: None,
    });
    assert_eq!(ws_expect_message(&mut a).await, expected);
    assert_eq!(ws_expect_message(&mut b).await, expected);

    // e2 is empty now; only the sender hears about it
    ws_send_client(&mut b, &move_msg("e2", "e4")).await;

    match ws_expect_message(&mut b).await {
        ServerMessage::InvalidMove(payload) => {
            assert_eq!(payload.request, MoveRequest::new("e2", "e4"));
            assert!(!payload.error.is_empty());
        }
        other => panic!("expected invalid_move, got {:?}", other),
    }
    ws_expect_no_message(&mut a, Duration::from_millis(100)).await;
}

#[tokio::test]
async fn single_client_waits_without_messages() {
    let server = spawn_ws_server(TimeControl::default()).await;
    let mut a = ws_connect(server.addr).await;

    ws_send_client(&mut a, &ClientMessage::InitGame).await;
    wait_for_pending(&server.state).await;

    ws_expect_no_message(&mut a, Duration::from_millis(100)).await;
    assert_eq!(server.state.matchmaker.session_count().await, 0);
}

#[tokio::test]
async fn malformed_frames_are_ignored() {
    let server = spawn_ws_server(TimeControl::default()).await;
    let mut a = ws_connect(server.addr).await;

    ws_send_raw(&mut a, "not json").await;
    ws_send_raw(&mut a, r#"{"type":"castle_queenside"}"#).await;
    ws_send_client(&mut a, &move_msg("e2", "e4")).await;
    ws_expect_no_message(&mut a, Duration::from_millis(100)).await;

    // The connection is still usable
    ws_send_client(&mut a, &ClientMessage::InitGame).await;
    wait_for_pending(&server.state).await;
}

#[tokio::test]
async fn binary_frames_are_decoded_as_utf8_json() {
    let server = spawn_ws_server(TimeControl::default()).await;
    let mut a = ws_connect(server.addr).await;

    // Not UTF-8: dropped, connection stays open
    ws_send_binary(&mut a, vec![0xff, 0xfe, 0xfd]).await;
    ws_expect_no_message(&mut a, Duration::from_millis(100)).await;
    assert_eq!(server.state.matchmaker.pending().await, None);

    let json = serde_json::to_vec(&ClientMessage::InitGame).unwrap();
    ws_send_binary(&mut a, json).await;
    wait_for_pending(&server.state).await;

    // A second client pairs over text as usual
    let mut b = ws_connect(server.addr).await;
    ws_send_client(&mut b, &ClientMessage::InitGame).await;
    assert!(matches!(
        ws_expect_message(&mut a).await,
        ServerMessage::InitGame(InitGamePayload {
            color: Color::White,
            ..
        })
    ));
}

#[tokio::test]
async fn resign_ends_game_for_both() {
    let server = spawn_ws_server(TimeControl::default()).await;
    let (mut a, mut b) = paired_clients(&server).await;

    ws_send_client(&mut a, &ClientMessage::Resign).await;

    let expected = ServerMessage::GameOver(GameOverPayload {
        winner: Some(Color::Black),
        reason: EndReason::Resignation,
    });
    assert_eq!(ws_expect_message(&mut a).await, expected);
    assert_eq!(ws_expect_message(&mut b).await, expected);
}

#[tokio::test]
async fn disconnect_notifies_the_survivor() {
    let server = spawn_ws_server(TimeControl::default()).await;
    let (a, mut b) = paired_clients(&server).await;

    drop(a);

    match ws_expect_message(&mut b).await {
        ServerMessage::OpponentLeft(payload) => {
            assert_eq!(payload.winner, Some(Color::Black));
            assert_eq!(payload.message, gambit_shared::OPPONENT_LEFT_MESSAGE);
        }
        other => panic!("expected opponent_left, got {:?}", other),
    }
    assert_eq!(
        ws_expect_message(&mut b).await,
        ServerMessage::GameOver(GameOverPayload {
            winner: Some(Color::Black),
            reason: EndReason::Disconnect,
        })
    );

    wait_for_connections(&server.state, 1).await;
    assert_eq!(server.state.matchmaker.session_count().await, 0);
}

#[tokio::test]
async fn clock_ticks_reach_both_clients() {
    let server = spawn_ws_server(TimeControl::symmetric(10_000).unwrap()).await;
    let (mut a, mut b) = paired_clients(&server).await;

    ws_send_client(&mut a, &move_msg("d2", "d4")).await;
    ws_expect_message(&mut a).await;
    ws_expect_message(&mut b).await;

    server.clock.advance(chrono::Duration::milliseconds(2_500));
    server.state.matchmaker.tick_all().await;

    let expected = ServerMessage::TimeUpdate(ClockSnapshot {
        white_time_ms: 10_000,
        black_time_ms: 7_500,
    });
    assert_eq!(ws_expect_message(&mut a).await, expected);
    assert_eq!(ws_expect_message(&mut b).await, expected);

    server.clock.advance(chrono::Duration::seconds(8));
    server.state.matchmaker.tick_all().await;

    let expected = ServerMessage::GameOver(GameOverPayload {
        winner: Some(Color::White),
        reason: EndReason::Timeout,
    });
    assert_eq!(ws_expect_message(&mut a).await, expected);
    assert_eq!(ws_expect_message(&mut b).await, expected);
}
