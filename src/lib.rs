#![deny(clippy::unwrap_used)]
//! WebAssembly bindings for a tic-tac-toe game whose positions are scored by external prediction
//! models.
//!
//! The crate exposes two high-level building blocks:
//!
//! * [`TicTacToeBoard`] – a 9-cell board with the eight winning triples, win/draw detection and
//!   the wire encoding the prediction server expects (`0` empty, `1` X, `-1` O).
//! * [`TicTacToeSession`] – the game the page drives: human X against a random O that answers after
//!   a configurable delay. Every move is reported as an outcome label and posted to the configured
//!   models; the returned labels are lined up with the real outcomes to compute per-model
//!   accuracy.
//!
//! The game ends on local win/draw detection. Remote verdicts (including `/verifyState`) are only
//! ever bookkept, never used to end a game.

mod accuracy;
mod board;
mod config;
mod console;
mod error;
mod game;
mod outcome;
mod predictor;
mod session;

pub use accuracy::{normalize_label, Accuracy, PredictionHistory};
pub use board::{BoardState, Mark, TicTacToeBoard, Win, CELL_COUNT, WINNING_LINES};
pub use config::SessionConfig;
pub use error::GameError;
pub use game::{Game, Phase, Scoreboard};
pub use outcome::{Outcome, OutcomeLabels, OutcomeLog, Report};
pub use predictor::{PredictionModel, PredictionResponse};
pub use session::{SessionState, Snapshot, TicTacToeSession};

use wasm_bindgen::prelude::*;

/// Install a panic hook sending Rust panics to the browser console. The hook is only compiled in
/// when the `console_error_panic_hook` feature is enabled (default).
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Number of cells on the board (9).
#[wasm_bindgen(js_name = cellCount)]
pub fn cell_count() -> usize {
    CELL_COUNT
}

/// The eight winning triples flattened row by row (24 entries), in detection order.
#[wasm_bindgen(js_name = winningLines)]
pub fn winning_lines() -> Vec<u8> {
    WINNING_LINES
        .iter()
        .flatten()
        .map(|&index| index as u8)
        .collect()
}
