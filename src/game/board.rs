use std::fmt;

use super::side::Side;
use crate::error::MoveError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const CENTER_COL: usize = COLS / 2;

/// Axis directions as (row step, col step): horizontal, vertical, `\` and `/`.
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Cell {
    Empty,
    Disc(Side),
}

/// A placed disc: the column is chosen, the row follows from gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

/// The 6x7 grid. Row 0 is the top, row 5 is the bottom.
///
/// `Board` is a small `Copy` value: [`Board::drop_disc`] returns a new board
/// and leaves the receiver untouched, so search branches never share state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Replay alternating drops starting with [`Side::One`].
    pub fn from_moves(columns: &[usize]) -> Result<Self, MoveError> {
        let mut board = Board::new();
        let mut side = Side::One;
        for &col in columns {
            board.place(col, side)?;
            side = side.other();
        }
        Ok(board)
    }

    /// Get the cell at a specific position
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Columns whose top cell is still empty, in ascending order.
    pub fn valid_moves(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| !self.is_column_full(col)).collect()
    }

    /// Row a disc dropped into `col` would land on.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][col] == Cell::Empty)
    }

    /// Topmost occupied row of a column.
    pub fn top_row(&self, col: usize) -> Option<usize> {
        (0..ROWS).find(|&row| self.cells[row][col] != Cell::Empty)
    }

    /// Drop a disc and return the resulting board with the landing row.
    pub fn drop_disc(&self, col: usize, side: Side) -> Result<(Board, usize), MoveError> {
        let mut next = *self;
        let row = next.place(col, side)?;
        Ok((next, row))
    }

    /// Drop a disc in place, returns the row where it landed
    pub fn place(&mut self, col: usize, side: Side) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::ColumnOutOfRange(col));
        }
        let row = self.landing_row(col).ok_or(MoveError::ColumnFull(col))?;
        self.cells[row][col] = side.to_cell();
        Ok(row)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    pub fn disc_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell != Cell::Empty)
            .count()
    }

    /// Check whether the disc at (row, col) completes a line for `side`.
    ///
    /// Returns every contiguous cell of the first axis whose run reaches
    /// four, which may be more than four cells.
    pub fn check_win(&self, row: usize, col: usize, side: Side) -> Option<Vec<Move>> {
        if row >= ROWS || col >= COLS || self.cells[row][col] != side.to_cell() {
            return None;
        }

        for (dr, dc) in AXES {
            let mut cells = vec![Move { row, col }];
            cells.extend(self.run(row, col, dr, dc, side));
            cells.extend(self.run(row, col, -dr, -dc, side));
            if cells.len() >= 4 {
                return Some(cells);
            }
        }
        None
    }

    /// Cells matching `side` walking away from (row, col), excluding the origin.
    fn run(&self, row: usize, col: usize, dr: isize, dc: isize, side: Side) -> Vec<Move> {
        let target = side.to_cell();
        let mut cells = Vec::new();
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while (0..ROWS as isize).contains(&r)
            && (0..COLS as isize).contains(&c)
            && self.cells[r as usize][c as usize] == target
        {
            cells.push(Move {
                row: r as usize,
                col: c as usize,
            });
            r += dr;
            c += dc;
        }
        cells
    }

    /// Look for a completed line through the topmost disc of any column.
    ///
    /// Any line on a board built by legal drops passes through the last disc
    /// played, which is always the top of its column.
    pub fn surface_winner(&self) -> Option<(Side, Vec<Move>)> {
        (0..COLS).find_map(|col| {
            let row = self.top_row(col)?;
            match self.cells[row][col] {
                Cell::Disc(side) => self.check_win(row, col, side).map(|cells| (side, cells)),
                Cell::Empty => None,
            }
        })
    }

    /// No legal moves remain and nobody has a line.
    pub fn is_draw(&self) -> bool {
        self.is_full() && self.surface_winner().is_none()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Text grid, top row first: `.` empty, `X` side one, `O` side two.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::Disc(Side::One) => 'X',
                    Cell::Disc(Side::Two) => 'O',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        write!(f, "0123456")
    }
}
