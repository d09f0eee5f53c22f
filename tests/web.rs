//! Browser tests for the JS-facing API. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use tictactoe_wasm::{PredictionModel, SessionConfig, TicTacToeBoard, TicTacToeSession};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn offline_session() -> TicTacToeSession {
    let config = SessionConfig {
        models: Vec::new(),
        computer_delay_ms: 0,
        seed: Some(3),
        ..SessionConfig::default()
    };
    let config = serde_wasm_bindgen::to_value(&config).expect("config serialises");
    TicTacToeSession::new(config).expect("valid config")
}

fn field(value: &JsValue, name: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(name)).expect("field present")
}

#[wasm_bindgen_test]
fn board_reports_winner_and_line() {
    let mut board = TicTacToeBoard::new();
    board
        .set_state(vec![1, 1, 1, -1, -1, 0, 0, 0, 0])
        .expect("valid board");
    assert_eq!(board.winner().as_deref(), Some("X"));
    assert_eq!(board.winning_line(), vec![0, 1, 2]);
    assert_eq!(board.outcome(), "x wins");
    assert!(board.set_state(vec![0; 4]).is_err());
}

#[wasm_bindgen_test]
async fn human_then_computer_move() {
    let session = offline_session();
    let after_human = session.play_human(4).expect("legal move");
    assert_eq!(field(&after_human, "status").as_string().as_deref(), Some("Next player: O"));
    assert!(session.play_human(0).is_err());

    let after_computer = JsFuture::from(session.play_computer())
        .await
        .expect("computer moves");
    assert_eq!(field(&after_computer, "phase").as_string().as_deref(), Some("awaitingHuman"));

    let outcomes = session.outcome_history().expect("serialises");
    let outcomes: Vec<String> = serde_wasm_bindgen::from_value(outcomes).expect("string list");
    assert_eq!(outcomes, vec!["in progress", "in progress"]);
}

#[wasm_bindgen_test]
fn restart_clears_the_board() {
    let session = offline_session();
    session.play_human(0).expect("legal move");
    let snapshot = session.restart().expect("snapshot");
    let cells: Vec<i8> = serde_wasm_bindgen::from_value(field(&snapshot, "cells")).expect("cells");
    assert_eq!(cells, vec![0; 9]);
    assert!(session.new_game().is_err());
}

async fn next_tick(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .expect("browser window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .expect("timer scheduled");
    });
    JsFuture::from(promise).await.expect("timer fires");
}

#[wasm_bindgen_test]
async fn unreachable_server_leaves_predictions_blank() {
    let config = SessionConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        models: vec![PredictionModel::Knn],
        computer_delay_ms: 0,
        seed: Some(11),
        ..SessionConfig::default()
    };
    let config = serde_wasm_bindgen::to_value(&config).expect("config serialises");
    let session = TicTacToeSession::new(config).expect("valid config");

    let snapshot = session.play_human(4).expect("move accepted while the request is in flight");
    assert_eq!(field(&snapshot, "phase").as_string().as_deref(), Some("awaitingComputer"));
    next_tick(200).await;

    let history = session.prediction_history("knn").expect("knn is active");
    let history: Vec<String> = serde_wasm_bindgen::from_value(history).expect("string list");
    assert!(history.is_empty());

    let snapshot = session.snapshot().expect("snapshot");
    let models = js_sys::Array::from(&field(&snapshot, "models"));
    assert_eq!(models.length(), 1);
    assert!(field(&models.get(0), "latest").is_undefined());
    assert!(session.accuracy("knn").is_err());

    JsFuture::from(session.play_computer())
        .await
        .expect("computer still moves");
}

#[wasm_bindgen_test]
fn reset_histories_clears_outcomes() {
    let session = offline_session();
    session.play_human(0).expect("legal move");
    session.reset_histories().expect("snapshot");
    let outcomes: Vec<String> =
        serde_wasm_bindgen::from_value(session.outcome_history().expect("serialises"))
            .expect("string list");
    assert!(outcomes.is_empty());
}
