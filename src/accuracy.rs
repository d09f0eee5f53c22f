//! Correlates model predictions with the outcomes that were actually reported.
//!
//! Each model keeps its own history keyed by the report sequence number of the board snapshot it
//! was asked about. Responses may come back in any order; pairing by sequence keeps every label
//! next to the outcome it predicts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::GameError;
use crate::outcome::{OutcomeLabels, OutcomeLog};

/// Lowercase, trim and collapse inner whitespace so `" X  Wins"` equals `"x wins"`.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Accuracy {
    pub matched: usize,
    pub total: usize,
    /// `matched / total`, `0.0` while nothing has been compared yet.
    pub ratio: f64,
}

impl Accuracy {
    fn from_counts(matched: usize, total: usize) -> Self {
        let ratio = if total == 0 {
            0.0
        } else {
            matched as f64 / total as f64
        };
        Self {
            matched,
            total,
            ratio,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct PredictionHistory {
    labels: BTreeMap<u64, String>,
    latest: Option<u64>,
}

impl PredictionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the label a model returned for the snapshot reported under `sequence`.
    /// A second answer for the same snapshot replaces the first.
    pub fn record(&mut self, sequence: u64, label: impl Into<String>) {
        self.labels.insert(sequence, label.into());
        self.latest = Some(sequence);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The most recently received label, which is not necessarily the newest snapshot's.
    pub fn latest(&self) -> Option<&str> {
        self.latest
            .and_then(|sequence| self.labels.get(&sequence))
            .map(String::as_str)
    }

    /// Labels in snapshot order.
    pub fn labels(&self) -> Vec<String> {
        self.labels.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.latest = None;
    }

    /// Compare against the outcome log, naming outcomes with `vocabulary`. Only valid once every
    /// reported outcome has its prediction.
    pub fn accuracy(
        &self,
        outcomes: &OutcomeLog,
        vocabulary: &OutcomeLabels,
    ) -> Result<Accuracy, GameError> {
        let mismatch = || GameError::HistoryMismatch {
            outcomes: outcomes.len(),
            predictions: self.labels.len(),
        };
        if outcomes.len() != self.labels.len() {
            return Err(mismatch());
        }

        let mut matched = 0;
        let first = outcomes.first_sequence();
        for (offset, &outcome) in outcomes.outcomes().iter().enumerate() {
            let sequence = first + offset as u64;
            let predicted = self.labels.get(&sequence).ok_or_else(mismatch)?;
            if normalize_label(predicted) == normalize_label(vocabulary.label(outcome)) {
                matched += 1;
            }
        }
        Ok(Accuracy::from_counts(matched, outcomes.len()))
    }
}
