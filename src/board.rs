use wasm_bindgen::prelude::*;

use crate::error::GameError;
use crate::outcome::Outcome;

pub const BOARD_SIZE: usize = 3;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE; // 9 i8 entries

pub const EMPTY: i8 = 0;

/// Rows, then columns, then the two diagonals. Order matters: the detector reports the first hit.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A mark placed on the board. `X` always belongs to the human, `O` to the computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Wire value used by the prediction server (`1` for X, `-1` for O).
    pub const fn value(self) -> i8 {
        match self {
            Mark::X => 1,
            Mark::O => -1,
        }
    }

    pub const fn from_value(value: i8) -> Option<Mark> {
        match value {
            1 => Some(Mark::X),
            -1 => Some(Mark::O),
            _ => None,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// A completed three-in-a-row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Win {
    pub mark: Mark,
    pub line: [usize; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardState {
    cells: [i8; CELL_COUNT],
}

impl BoardState {
    pub fn new() -> Self {
        Self {
            cells: [EMPTY; CELL_COUNT],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn get(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().and_then(Mark::from_value)
    }

    pub fn is_empty_cell(&self, index: usize) -> bool {
        self.cells.get(index) == Some(&EMPTY)
    }

    /// Place `mark` on `index`. Only checks the cell itself; turn order is the game's business.
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), GameError> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(GameError::OutOfRange(index))?;
        if *cell != EMPTY {
            return Err(GameError::Occupied(index));
        }
        *cell = mark.value();
        Ok(())
    }

    /// Scan the eight winning triples in order and return the first completed one.
    pub fn winner(&self) -> Option<Win> {
        WINNING_LINES.iter().find_map(|&line| {
            let [a, b, c] = line;
            let first = self.cells[a];
            if first != EMPTY && first == self.cells[b] && first == self.cells[c] {
                Mark::from_value(first).map(|mark| Win { mark, line })
            } else {
                None
            }
        })
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != EMPTY)
    }

    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winner().is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.is_full() || self.winner().is_some()
    }

    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, &cell)| (cell == EMPTY).then_some(index))
            .collect()
    }

    pub fn encode(&self) -> [i8; CELL_COUNT] {
        self.cells
    }

    pub fn to_vec(&self) -> Vec<i8> {
        self.cells.to_vec()
    }

    /// Rebuild a board from its wire encoding, rejecting anything but nine values in {-1, 0, 1}.
    pub fn from_encoded(data: &[i8]) -> Result<Self, GameError> {
        if data.len() != CELL_COUNT {
            return Err(GameError::InvalidState(format!(
                "expected {CELL_COUNT} cells, got {}",
                data.len()
            )));
        }
        let mut state = Self::new();
        for (index, &value) in data.iter().enumerate() {
            if value != EMPTY && Mark::from_value(value).is_none() {
                return Err(GameError::InvalidState(format!(
                    "cell {index} holds {value}, expected -1, 0 or 1"
                )));
            }
            state.cells[index] = value;
        }
        Ok(state)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

/// A thin wasm-bindgen friendly board wrapper for analysing arbitrary positions from the page.
#[wasm_bindgen]
pub struct TicTacToeBoard {
    state: BoardState,
}

#[wasm_bindgen]
impl TicTacToeBoard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TicTacToeBoard {
        TicTacToeBoard {
            state: BoardState::new(),
        }
    }

    /// Serialize the board to a 9-entry `Int8Array` (0 empty, 1 X, -1 O).
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Vec<i8> {
        self.state.to_vec()
    }

    /// Replace the board contents from a 9-entry `Int8Array`.
    #[wasm_bindgen(js_name = setState)]
    pub fn set_state(&mut self, data: Vec<i8>) -> Result<(), JsValue> {
        self.state = BoardState::from_encoded(&data)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// `"X"`, `"O"` or `undefined` when nobody has three in a row.
    pub fn winner(&self) -> Option<String> {
        self.state.winner().map(|win| win.mark.symbol().to_string())
    }

    /// The winning triple, empty when there is none.
    #[wasm_bindgen(js_name = winningLine)]
    pub fn winning_line(&self) -> Vec<u8> {
        self.state
            .winner()
            .map(|win| win.line.iter().map(|&i| i as u8).collect())
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = isDraw)]
    pub fn is_draw(&self) -> bool {
        self.state.is_draw()
    }

    /// One of `"x wins"`, `"o wins"`, `"draw"`, `"in progress"`.
    pub fn outcome(&self) -> String {
        Outcome::of(&self.state).label().to_string()
    }
}

impl Default for TicTacToeBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(cells: &str) -> BoardState {
        let data: Vec<i8> = cells
            .chars()
            .map(|c| match c {
                'X' => 1,
                'O' => -1,
                _ => 0,
            })
            .collect();
        BoardState::from_encoded(&data).expect("valid test board")
    }

    #[test]
    fn top_row_win_reports_mark_and_line() {
        let win = board("XXXOO____").winner().expect("x has a row");
        assert_eq!(win.mark, Mark::X);
        assert_eq!(win.line, [0, 1, 2]);
    }

    #[test]
    fn every_line_is_detected_for_both_marks() {
        for mark in [Mark::X, Mark::O] {
            for line in WINNING_LINES {
                let mut state = BoardState::new();
                for index in line {
                    state.place(index, mark).expect("empty cell");
                }
                assert_eq!(state.winner(), Some(Win { mark, line }));
            }
        }
    }

    #[test]
    fn first_line_in_scan_order_wins_ties() {
        // Last X on 8 completes both the right column and the main diagonal.
        let win = board("XOXOXXOOX").winner().expect("x wins");
        assert_eq!(win.line, [2, 5, 8]);
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let state = board("XOXXOOOXX");
        assert!(state.is_full());
        assert_eq!(state.winner(), None);
        assert!(state.is_draw());
        assert!(state.is_terminal());
    }

    #[test]
    fn full_board_with_line_is_not_draw() {
        let state = board("XOXOXOXOX");
        assert!(state.is_full());
        assert!(!state.is_draw());
        assert_eq!(state.winner().map(|w| w.mark), Some(Mark::X));
    }

    #[test]
    fn place_rejects_occupied_and_out_of_range() {
        let mut state = BoardState::new();
        state.place(4, Mark::X).expect("empty");
        assert_eq!(state.place(4, Mark::O), Err(GameError::Occupied(4)));
        assert_eq!(state.place(9, Mark::O), Err(GameError::OutOfRange(9)));
        assert_eq!(state.get(4), Some(Mark::X));
    }

    #[test]
    fn encoding_uses_server_values() {
        let state = board("XO_______");
        assert_eq!(state.encode(), [1, -1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(state.empty_cells(), vec![2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn from_encoded_rejects_bad_input() {
        assert!(matches!(
            BoardState::from_encoded(&[0; 8]),
            Err(GameError::InvalidState(_))
        ));
        assert!(matches!(
            BoardState::from_encoded(&[0, 0, 2, 0, 0, 0, 0, 0, 0]),
            Err(GameError::InvalidState(_))
        ));
    }
}
