use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::board::{BoardState, Mark};
use crate::error::GameError;

pub const HUMAN: Mark = Mark::X;
pub const COMPUTER: Mark = Mark::O;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    AwaitingHuman,
    AwaitingComputer,
    Terminal,
}

/// Session-wide win counter; survives restarts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub x: u32,
    pub o: u32,
}

impl Scoreboard {
    fn record(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x += 1,
            Mark::O => self.o += 1,
        }
    }
}

/// Human-vs-random tic-tac-toe: the board, whose turn it is, and how the game ended.
#[derive(Debug, Clone)]
pub struct Game {
    board: BoardState,
    phase: Phase,
    winning_line: Option<[usize; 3]>,
    scores: Scoreboard,
}

impl Game {
    pub fn new() -> Self {
        Self {
            board: BoardState::new(),
            phase: Phase::AwaitingHuman,
            winning_line: None,
            scores: Scoreboard::default(),
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winning_line(&self) -> Option<[usize; 3]> {
        self.winning_line
    }

    pub fn scores(&self) -> Scoreboard {
        self.scores
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// Place the human's X. Returns the phase the game moved to.
    pub fn play_human(&mut self, index: usize) -> Result<Phase, GameError> {
        self.expect_turn(HUMAN)?;
        self.board.place(index, HUMAN)?;
        Ok(self.advance(Phase::AwaitingComputer))
    }

    /// Place the computer's O on a uniformly random empty cell. Returns the chosen cell.
    pub fn play_computer<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, GameError> {
        self.expect_turn(COMPUTER)?;
        let index = *self
            .board
            .empty_cells()
            .choose(rng)
            .ok_or(GameError::GameOver)?;
        self.board.place(index, COMPUTER)?;
        self.advance(Phase::AwaitingHuman);
        Ok(index)
    }

    /// Clear the board and winning line; the human moves first again. Scores are kept.
    pub fn restart(&mut self) {
        self.board.reset();
        self.phase = Phase::AwaitingHuman;
        self.winning_line = None;
    }

    /// Start another match once the current one has ended.
    pub fn new_game(&mut self) -> Result<(), GameError> {
        if !self.is_terminal() {
            return Err(GameError::InvalidState(
                "a new game can only be started once the current one has ended".to_string(),
            ));
        }
        self.restart();
        Ok(())
    }

    /// Status line: `Winner: X`, `Draw` or `Next player: X`.
    pub fn status(&self) -> String {
        match self.phase {
            Phase::Terminal => match self.board.winner() {
                Some(win) => format!("Winner: {}", win.mark.symbol()),
                None => "Draw".to_string(),
            },
            Phase::AwaitingHuman => format!("Next player: {}", HUMAN.symbol()),
            Phase::AwaitingComputer => format!("Next player: {}", COMPUTER.symbol()),
        }
    }

    fn expect_turn(&self, mark: Mark) -> Result<(), GameError> {
        match (self.phase, mark) {
            (Phase::Terminal, _) => Err(GameError::GameOver),
            (Phase::AwaitingHuman, Mark::X) | (Phase::AwaitingComputer, Mark::O) => Ok(()),
            _ => Err(GameError::NotYourTurn(mark.symbol())),
        }
    }

    fn advance(&mut self, next: Phase) -> Phase {
        if let Some(win) = self.board.winner() {
            self.winning_line = Some(win.line);
            self.scores.record(win.mark);
            self.phase = Phase::Terminal;
        } else if self.board.is_full() {
            self.phase = Phase::Terminal;
        } else {
            self.phase = next;
        }
        self.phase
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
