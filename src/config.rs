use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::outcome::OutcomeLabels;
use crate::predictor::PredictionModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Root of the prediction server; endpoint paths are appended to it.
    #[serde(default = "default_base_url", alias = "baseUrl")]
    pub base_url: String,
    /// Models queried after every move.
    #[serde(default = "default_models")]
    pub models: Vec<PredictionModel>,
    /// Also post every snapshot to `/verifyState`. Its verdict is tracked like any other model
    /// and never ends the game.
    #[serde(default, alias = "verifyState")]
    pub verify_state: bool,
    /// "Thinking" delay before the computer answers a human move.
    #[serde(default = "default_computer_delay_ms", alias = "computerDelayMs")]
    pub computer_delay_ms: u32,
    /// Seed for the computer's move picker; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Outcome names the models answer with. Partial objects keep the English default for
    /// whatever they leave out.
    #[serde(default)]
    pub labels: OutcomeLabels,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_models() -> Vec<PredictionModel> {
    vec![PredictionModel::Knn, PredictionModel::Gb, PredictionModel::Mlp]
}
fn default_computer_delay_ms() -> u32 {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models: default_models(),
            verify_state: false,
            computer_delay_ms: default_computer_delay_ms(),
            seed: None,
            labels: OutcomeLabels::default(),
        }
    }
}

impl SessionConfig {
    /// Every model that receives snapshots, without duplicates, in configuration order.
    pub fn active_models(&self) -> Vec<PredictionModel> {
        let mut models: Vec<PredictionModel> = Vec::with_capacity(self.models.len() + 1);
        let extra = self.verify_state.then_some(PredictionModel::VerifyState);
        for model in self.models.iter().copied().chain(extra) {
            if !models.contains(&model) {
                models.push(model);
            }
        }
        models
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.base_url.trim().is_empty() {
            return Err(GameError::Config("base_url must not be empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(GameError::Config(format!(
                "base_url `{}` must start with http:// or https://",
                self.base_url
            )));
        }
        Ok(())
    }
}
