//! Transport to the external prediction server.
//!
//! Every model is a `POST` endpoint taking the board as a JSON array of nine integers
//! (`0` empty, `1` X, `-1` O) and answering `{ "prediction": <label> }`. Requests go through the
//! browser `fetch` API; callers spawn them and never wait on the result.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::board::{BoardState, CELL_COUNT};
use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PredictionModel {
    #[serde(rename = "knn")]
    Knn,
    #[serde(rename = "gb")]
    Gb,
    #[serde(rename = "mlp")]
    Mlp,
    #[serde(rename = "verifyState")]
    VerifyState,
}

impl PredictionModel {
    pub const ALL: [PredictionModel; 4] = [
        PredictionModel::Knn,
        PredictionModel::Gb,
        PredictionModel::Mlp,
        PredictionModel::VerifyState,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            PredictionModel::Knn => "/models/knn",
            PredictionModel::Gb => "/models/gb",
            PredictionModel::Mlp => "/models/mlp",
            PredictionModel::VerifyState => "/verifyState",
        }
    }

    /// Identifier used on the JS side (`"knn"`, `"gb"`, `"mlp"`, `"verifyState"`).
    pub const fn key(self) -> &'static str {
        match self {
            PredictionModel::Knn => "knn",
            PredictionModel::Gb => "gb",
            PredictionModel::Mlp => "mlp",
            PredictionModel::VerifyState => "verifyState",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            PredictionModel::Knn => "KNN",
            PredictionModel::Gb => "Gradient Boosting",
            PredictionModel::Mlp => "MLP",
            PredictionModel::VerifyState => "State verifier",
        }
    }

    pub fn from_key(key: &str) -> Result<PredictionModel, GameError> {
        Self::ALL
            .into_iter()
            .find(|model| model.key().eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| GameError::Config(format!("unknown prediction model `{key}`")))
    }
}

/// Shape of the JSON object the prediction server answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
}

/// Join base URL and endpoint path with exactly one slash between them.
pub fn endpoint_url(base_url: &str, model: PredictionModel) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        model.path().trim_start_matches('/')
    )
}

/// Request body for a board snapshot.
pub fn encode_body(board: &BoardState) -> Result<String, GameError> {
    let cells: [i8; CELL_COUNT] = board.encode();
    serde_json::to_string(&cells).map_err(|err| GameError::InvalidState(err.to_string()))
}

/// `POST` the board to one model and return its label. No retry, no timeout.
pub async fn request_prediction(
    base_url: &str,
    model: PredictionModel,
    board: &BoardState,
) -> Result<String, GameError> {
    let url = endpoint_url(base_url, model);
    let body = encode_body(board)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(&url, &init).map_err(network_error)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(network_error)?;

    let window = web_sys::window().ok_or_else(|| GameError::Network("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network_error)?;
    let response: Response = response.dyn_into().map_err(network_error)?;
    if !response.ok() {
        return Err(GameError::Network(format!(
            "{url} answered with status {}",
            response.status()
        )));
    }

    let json = JsFuture::from(response.json().map_err(network_error)?)
        .await
        .map_err(network_error)?;
    let decoded: PredictionResponse =
        serde_wasm_bindgen::from_value(json).map_err(|err| GameError::Network(err.to_string()))?;
    Ok(decoded.prediction)
}

fn network_error(err: JsValue) -> GameError {
    GameError::Network(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Mark;

    #[test]
    fn endpoints_match_server_routes() {
        let base = "http://127.0.0.1:5000/";
        assert_eq!(
            endpoint_url(base, PredictionModel::Knn),
            "http://127.0.0.1:5000/models/knn"
        );
        assert_eq!(
            endpoint_url("http://localhost:5000", PredictionModel::VerifyState),
            "http://localhost:5000/verifyState"
        );
    }

    #[test]
    fn body_is_json_array_of_cell_values() {
        let mut board = BoardState::new();
        board.place(0, Mark::X).expect("empty");
        board.place(8, Mark::O).expect("empty");
        assert_eq!(
            encode_body(&board).expect("serialises"),
            "[1,0,0,0,0,0,0,0,-1]"
        );
    }

    #[test]
    fn response_decodes_prediction_label() {
        let response: PredictionResponse =
            serde_json::from_str(r#"{"prediction": "x wins", "confidence": 0.9}"#).expect("valid");
        assert_eq!(response.prediction, "x wins");
    }

    #[test]
    fn model_keys_round_trip() {
        for model in PredictionModel::ALL {
            assert_eq!(PredictionModel::from_key(model.key()), Ok(model));
        }
        assert_eq!(PredictionModel::from_key(" MLP "), Ok(PredictionModel::Mlp));
        assert!(PredictionModel::from_key("svm").is_err());
    }
}
