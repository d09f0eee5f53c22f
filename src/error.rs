use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong while playing or bookkeeping a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("cell index {0} is outside the board (expected 0..=8)")]
    OutOfRange(usize),
    #[error("cell {0} is already occupied")]
    Occupied(usize),
    #[error("the game is over; restart to play again")]
    GameOver,
    #[error("it is not {0}'s turn")]
    NotYourTurn(char),
    #[error("invalid board state: {0}")]
    InvalidState(String),
    #[error("outcome history has {outcomes} entries but prediction history has {predictions}")]
    HistoryMismatch { outcomes: usize, predictions: usize },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("prediction request failed: {0}")]
    Network(String),
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
