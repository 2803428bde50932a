use super::{Board, Move, Side};
use crate::error::MoveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameOutcome {
    Winner(Side),
    Draw,
}

/// Position plus the bookkeeping needed to present it: whose turn it is,
/// how the game ended and which cells formed the winning line.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GameState {
    board: Board,
    current_side: Side,
    outcome: Option<GameOutcome>,
    winning_cells: Option<Vec<Move>>,
    last_move: Option<Move>,
}

impl GameState {
    /// Create initial game state
    pub fn initial() -> Self {
        GameState {
            board: Board::new(),
            current_side: Side::One,
            outcome: None,
            winning_cells: None,
            last_move: None,
        }
    }

    /// Get side to move
    pub fn current_side(&self) -> Side {
        self.current_side
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn winner(&self) -> Option<Side> {
        match self.outcome {
            Some(GameOutcome::Winner(side)) => Some(side),
            _ => None,
        }
    }

    pub fn winning_cells(&self) -> Option<&[Move]> {
        self.winning_cells.as_deref()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Get list of legal columns (not full)
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.board.valid_moves()
    }

    /// Apply a move and return new state (immutable)
    pub fn apply_move(&self, column: usize) -> Result<GameState, MoveError> {
        let mut next = self.clone();
        next.apply_move_mut(column)?;
        Ok(next)
    }

    /// Apply move mutably. On error the state is unchanged.
    ///
    /// The side to move only flips while the game continues; a terminal
    /// state keeps the winner as `current_side`.
    pub fn apply_move_mut(&mut self, column: usize) -> Result<Move, MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }

        let side = self.current_side;
        let row = self.board.place(column, side)?;
        let mv = Move { row, col: column };
        self.last_move = Some(mv);

        if let Some(cells) = self.board.check_win(row, column, side) {
            self.outcome = Some(GameOutcome::Winner(side));
            self.winning_cells = Some(cells);
        } else if self.board.valid_moves().is_empty() {
            self.outcome = Some(GameOutcome::Draw);
        } else {
            self.current_side = side.other();
        }

        Ok(mv)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, COLS, ROWS};

    #[test]
    fn test_initial_state() {
        let state = GameState::initial();
        assert_eq!(state.current_side(), Side::One);
        assert!(!state.is_terminal());
        assert_eq!(state.legal_actions().len(), 7);
        assert!(state.last_move().is_none());
    }

    #[test]
    fn test_apply_move() {
        let state = GameState::initial();
        let new_state = state.apply_move(3).unwrap();

        assert_eq!(new_state.current_side(), Side::Two);
        assert_eq!(new_state.board().get(5, 3), Cell::Disc(Side::One));
        assert_eq!(new_state.last_move(), Some(Move { row: 5, col: 3 }));
        // Original is untouched
        assert_eq!(state.board().get(5, 3), Cell::Empty);
    }

    #[test]
    fn test_vertical_win_scenario() {
        let mut state = GameState::initial();
        for _ in 0..3 {
            state.apply_move_mut(3).unwrap();
            state.apply_move_mut(0).unwrap();
        }
        state.apply_move_mut(3).unwrap();

        assert!(state.is_terminal());
        assert_eq!(state.outcome(), Some(GameOutcome::Winner(Side::One)));
        let mut cells = state.winning_cells().unwrap().to_vec();
        cells.sort_by_key(|m| m.row);
        assert_eq!(
            cells,
            vec![
                Move { row: 2, col: 3 },
                Move { row: 3, col: 3 },
                Move { row: 4, col: 3 },
                Move { row: 5, col: 3 },
            ]
        );
    }

    #[test]
    fn test_moves_rejected_after_game_over() {
        let mut state = GameState::initial();
        for col in 0..4 {
            state.apply_move_mut(col).unwrap();
            if col < 3 {
                state.apply_move_mut(col).unwrap();
            }
        }
        assert_eq!(state.winner(), Some(Side::One));
        let frozen = state.clone();
        assert_eq!(state.apply_move_mut(6), Err(MoveError::GameOver));
        assert_eq!(state, frozen);
        assert!(state.legal_actions().is_empty());
    }

    #[test]
    fn test_full_column_is_a_noop() {
        let mut state = GameState::initial();
        for _ in 0..ROWS {
            state.apply_move_mut(6).unwrap();
        }
        let before = state.clone();
        assert_eq!(state.apply_move_mut(6), Err(MoveError::ColumnFull(6)));
        assert_eq!(state, before);
        assert_eq!(state.apply_move_mut(COLS), Err(MoveError::ColumnOutOfRange(COLS)));
    }

    #[test]
    fn test_draw_has_no_winner() {
        // Every column alternates sides, the center column starts with Two
        let mut order = vec![0, 3, 3, 0, 0, 3, 3, 0, 0, 3, 3, 0];
        for col in [1, 2, 4, 5, 6] {
            order.extend([col; ROWS]);
        }
        let mut state = GameState::initial();
        for &col in &order {
            state.apply_move_mut(col).unwrap();
        }
        assert_eq!(state.outcome(), Some(GameOutcome::Draw));
        assert!(state.winner().is_none());
        assert!(state.winning_cells().is_none());
    }
}
