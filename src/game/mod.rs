//! Core Connect Four game logic: board representation, sides, the game
//! state machine and the single-device session controller.

mod board;
mod mode;
mod session;
mod side;
mod state;

pub use board::{Board, Cell, Move, CENTER_COL, COLS, ROWS};
pub use mode::{Difficulty, Mode};
pub use session::{GameSession, MoveReport, SessionStats};
pub use side::Side;
pub use state::{GameOutcome, GameState};
