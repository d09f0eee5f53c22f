use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};

use crate::accuracy::{Accuracy, PredictionHistory};
use crate::board::BoardState;
use crate::config::SessionConfig;
use crate::console;
use crate::error::GameError;
use crate::game::{Game, Phase, Scoreboard};
use crate::outcome::{Outcome, OutcomeLog};
use crate::predictor::{request_prediction, PredictionModel};

/// A board snapshot that was just reported and must be sent to every model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub sequence: u64,
    pub board: BoardState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSnapshot {
    pub model: &'static str,
    pub name: &'static str,
    pub latest: Option<String>,
    pub received: usize,
    /// `None` while some snapshots are still waiting for this model's answer.
    pub accuracy: Option<Accuracy>,
}

/// Everything the page needs to render one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub cells: Vec<i8>,
    pub phase: Phase,
    pub status: String,
    pub winning_line: Vec<usize>,
    pub outcome: String,
    pub scores: Scoreboard,
    pub can_start_new_game: bool,
    pub models: Vec<ModelSnapshot>,
}

/// Game, outcome log and per-model prediction histories for one browser session.
pub struct SessionState {
    config: SessionConfig,
    game: Game,
    outcomes: OutcomeLog,
    predictions: BTreeMap<PredictionModel, PredictionHistory>,
    rng: SmallRng,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Result<Self, GameError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let predictions = config
            .active_models()
            .into_iter()
            .map(|model| (model, PredictionHistory::new()))
            .collect();
        Ok(Self {
            config,
            game: Game::new(),
            outcomes: OutcomeLog::new(),
            predictions,
            rng,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn outcomes(&self) -> &OutcomeLog {
        &self.outcomes
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn play_human(&mut self, index: usize) -> Result<Dispatch, GameError> {
        self.game.play_human(index)?;
        Ok(self.report())
    }

    /// The deferred computer move. A restart while it was pending leaves nothing to do,
    /// which is not an error.
    pub fn play_computer(&mut self) -> Result<Option<Dispatch>, GameError> {
        if self.game.phase() != Phase::AwaitingComputer {
            return Ok(None);
        }
        self.game.play_computer(&mut self.rng)?;
        Ok(Some(self.report()))
    }

    pub fn restart(&mut self) {
        self.game.restart();
    }

    pub fn new_game(&mut self) -> Result<(), GameError> {
        self.game.new_game()
    }

    /// Clear the outcome log and every model's prediction history so accuracy starts over.
    /// Answers still in flight for snapshots reported before the reset are dropped on arrival.
    pub fn reset_histories(&mut self) {
        self.outcomes.clear();
        for history in self.predictions.values_mut() {
            history.clear();
        }
    }

    pub fn record_prediction(&mut self, model: PredictionModel, sequence: u64, label: String) {
        if sequence < self.outcomes.first_sequence() {
            return;
        }
        self.predictions
            .entry(model)
            .or_default()
            .record(sequence, label);
    }

    pub fn history(&self, model: PredictionModel) -> Result<&PredictionHistory, GameError> {
        self.predictions.get(&model).ok_or_else(|| {
            GameError::Config(format!("model `{}` is not active in this session", model.key()))
        })
    }

    pub fn accuracy(&self, model: PredictionModel) -> Result<Accuracy, GameError> {
        self.history(model)?
            .accuracy(&self.outcomes, &self.config.labels)
    }

    pub fn snapshot(&self) -> Snapshot {
        let board = self.game.board();
        let models = self
            .config
            .active_models()
            .into_iter()
            .map(|model| {
                let history = self.predictions.get(&model);
                ModelSnapshot {
                    model: model.key(),
                    name: model.display_name(),
                    latest: history.and_then(|h| h.latest()).map(str::to_string),
                    received: history.map_or(0, PredictionHistory::len),
                    accuracy: history
                        .and_then(|h| h.accuracy(&self.outcomes, &self.config.labels).ok()),
                }
            })
            .collect();
        Snapshot {
            cells: board.to_vec(),
            phase: self.game.phase(),
            status: self.game.status(),
            winning_line: self.game.winning_line().map(|l| l.to_vec()).unwrap_or_default(),
            outcome: self.config.labels.label(Outcome::of(board)).to_string(),
            scores: self.game.scores(),
            can_start_new_game: self.game.is_terminal(),
            models,
        }
    }

    fn report(&mut self) -> Dispatch {
        let board = *self.game.board();
        let report = self.outcomes.report(&board);
        Dispatch {
            sequence: report.sequence,
            board,
        }
    }
}

/// The session object the page drives: one instance per loaded page.
#[wasm_bindgen]
pub struct TicTacToeSession {
    state: Rc<RefCell<SessionState>>,
}

#[wasm_bindgen]
impl TicTacToeSession {
    /// `config` may be `undefined`/`null` for defaults or a partial `SessionConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TicTacToeSession, JsValue> {
        let cfg: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            state: Rc::new(RefCell::new(SessionState::new(cfg)?)),
        })
    }

    #[wasm_bindgen(js_name = defaultConfig)]
    pub fn default_config() -> Result<JsValue, JsValue> {
        to_js(&SessionConfig::default())
    }

    #[wasm_bindgen(js_name = setSeed)]
    pub fn set_seed(&self, seed: u64) {
        self.state.borrow_mut().set_seed(seed);
    }

    /// Place X on `index`, report the outcome and send the snapshot to every model.
    #[wasm_bindgen(js_name = playHuman)]
    pub fn play_human(&self, index: usize) -> Result<JsValue, JsValue> {
        let dispatch = self.state.borrow_mut().play_human(index)?;
        dispatch_predictions(&self.state, dispatch);
        self.snapshot()
    }

    /// Wait the configured delay, then let the computer place O. Resolves to a snapshot.
    #[wasm_bindgen(js_name = playComputer)]
    pub fn play_computer(&self) -> js_sys::Promise {
        let state = Rc::clone(&self.state);
        let delay = state.borrow().config().computer_delay_ms;
        future_to_promise(async move {
            sleep(delay).await?;
            let dispatch = state.borrow_mut().play_computer()?;
            if let Some(dispatch) = dispatch {
                dispatch_predictions(&state, dispatch);
            }
            let snapshot = state.borrow().snapshot();
            to_js(&snapshot)
        })
    }

    /// Clear the board and winning line at any point. Scores and histories are kept.
    pub fn restart(&self) -> Result<JsValue, JsValue> {
        self.state.borrow_mut().restart();
        self.snapshot()
    }

    /// Forget every reported outcome and received prediction, e.g. after a lost response left a
    /// model's accuracy out of step. The board and scores are untouched.
    #[wasm_bindgen(js_name = resetHistories)]
    pub fn reset_histories(&self) -> Result<JsValue, JsValue> {
        self.state.borrow_mut().reset_histories();
        self.snapshot()
    }

    /// Start another match; only allowed once the current one has ended.
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&self) -> Result<JsValue, JsValue> {
        self.state.borrow_mut().new_game()?;
        self.snapshot()
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.state.borrow().snapshot();
        to_js(&snapshot)
    }

    /// `{ matched, total, ratio }` for `model`; throws while its history is out of step.
    pub fn accuracy(&self, model: &str) -> Result<JsValue, JsValue> {
        let model = PredictionModel::from_key(model)?;
        let accuracy = self.state.borrow().accuracy(model)?;
        to_js(&accuracy)
    }

    /// Labels received from `model`, in snapshot order.
    #[wasm_bindgen(js_name = predictionHistory)]
    pub fn prediction_history(&self, model: &str) -> Result<JsValue, JsValue> {
        let model = PredictionModel::from_key(model)?;
        let labels = self.state.borrow().history(model)?.labels();
        to_js(&labels)
    }

    #[wasm_bindgen(js_name = outcomeHistory)]
    pub fn outcome_history(&self) -> Result<JsValue, JsValue> {
        let labels = {
            let state = self.state.borrow();
            state.outcomes().labels(&state.config().labels)
        };
        to_js(&labels)
    }
}

/// Fire one request per active model. Results land in the shared state whenever they arrive;
/// failures are only logged.
fn dispatch_predictions(state: &Rc<RefCell<SessionState>>, dispatch: Dispatch) {
    let (base_url, models) = {
        let state = state.borrow();
        (state.config().base_url.clone(), state.config().active_models())
    };
    for model in models {
        let state = Rc::clone(state);
        let base_url = base_url.clone();
        spawn_local(async move {
            match request_prediction(&base_url, model, &dispatch.board).await {
                Ok(label) => {
                    console::info(&format!(
                        "{} predicted `{label}` for snapshot #{}",
                        model.display_name(),
                        dispatch.sequence
                    ));
                    state
                        .borrow_mut()
                        .record_prediction(model, dispatch.sequence, label);
                }
                Err(err) => console::error(&format!("{}: {err}", model.display_name())),
            }
        });
    }
}

async fn sleep(ms: u32) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let timeout = ms.min(i32::MAX as u32) as i32;
    let mut scheduled = Ok(0);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout);
    });
    scheduled?;
    JsFuture::from(promise).await?;
    Ok(())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}
