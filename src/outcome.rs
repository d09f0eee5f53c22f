//! Turning boards into outcome labels and keeping the ordered history of what actually happened.

use serde::{Deserialize, Serialize};

use crate::board::{BoardState, Mark};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    XWins,
    OWins,
    Draw,
    InProgress,
}

impl Outcome {
    /// Derive the outcome purely from the board.
    pub fn of(board: &BoardState) -> Outcome {
        match board.winner() {
            Some(win) => match win.mark {
                Mark::X => Outcome::XWins,
                Mark::O => Outcome::OWins,
            },
            None if board.is_full() => Outcome::Draw,
            None => Outcome::InProgress,
        }
    }

    /// Default English label. Sessions compare against [`OutcomeLabels`], which may differ.
    pub const fn label(self) -> &'static str {
        match self {
            Outcome::XWins => "x wins",
            Outcome::OWins => "o wins",
            Outcome::Draw => "draw",
            Outcome::InProgress => "in progress",
        }
    }
}

/// The words a prediction server uses for each outcome. Defaults to the English labels;
/// servers trained on another vocabulary (e.g. `x ganha`, `o ganha`, `empate`, `tem jogo`)
/// are configured per session so accuracy compares like with like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeLabels {
    #[serde(default = "default_x_wins", alias = "xWins")]
    pub x_wins: String,
    #[serde(default = "default_o_wins", alias = "oWins")]
    pub o_wins: String,
    #[serde(default = "default_draw")]
    pub draw: String,
    #[serde(default = "default_in_progress", alias = "inProgress")]
    pub in_progress: String,
}

fn default_x_wins() -> String {
    Outcome::XWins.label().to_string()
}
fn default_o_wins() -> String {
    Outcome::OWins.label().to_string()
}
fn default_draw() -> String {
    Outcome::Draw.label().to_string()
}
fn default_in_progress() -> String {
    Outcome::InProgress.label().to_string()
}

impl Default for OutcomeLabels {
    fn default() -> Self {
        Self {
            x_wins: default_x_wins(),
            o_wins: default_o_wins(),
            draw: default_draw(),
            in_progress: default_in_progress(),
        }
    }
}

impl OutcomeLabels {
    pub fn label(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::XWins => &self.x_wins,
            Outcome::OWins => &self.o_wins,
            Outcome::Draw => &self.draw,
            Outcome::InProgress => &self.in_progress,
        }
    }
}

/// A reported outcome plus the sequence number predictions for the same snapshot must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub sequence: u64,
    pub outcome: Outcome,
}

/// Ordered log of every outcome reported during the session. Restarts do not clear it;
/// [`OutcomeLog::clear`] does. Sequence numbers keep counting across clears so late answers
/// for snapshots reported before a clear can be told apart.
#[derive(Debug, Default, Clone)]
pub struct OutcomeLog {
    entries: Vec<Outcome>,
    first_sequence: u64,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, board: &BoardState) -> Report {
        let outcome = Outcome::of(board);
        let sequence = self.first_sequence + self.entries.len() as u64;
        self.entries.push(outcome);
        Report { sequence, outcome }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<Outcome> {
        self.entries.last().copied()
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.entries
    }

    pub fn labels(&self, vocabulary: &OutcomeLabels) -> Vec<String> {
        self.entries
            .iter()
            .map(|&outcome| vocabulary.label(outcome).to_string())
            .collect()
    }

    /// Sequence number of the oldest entry still in the log.
    pub fn first_sequence(&self) -> u64 {
        self.first_sequence
    }

    pub fn clear(&mut self) {
        self.first_sequence += self.entries.len() as u64;
        self.entries.clear();
    }
}
