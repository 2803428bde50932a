use crate::game::{Board, Cell, Side, CENTER_COL, COLS, ROWS};

/// Points per own disc in the center column.
pub const CENTER_WEIGHT: i64 = 3;

/// Window directions paired with the starting cells that keep all four
/// cells on the board: (row step, col step, row range, col range).
const WINDOWS: [(isize, isize, std::ops::Range<usize>, std::ops::Range<usize>); 4] = [
    (0, 1, 0..ROWS, 0..COLS - 3),
    (1, 0, 0..ROWS - 3, 0..COLS),
    (1, 1, 0..ROWS - 3, 0..COLS - 3),
    (-1, 1, 3..ROWS, 0..COLS - 3),
];

fn score_window(own: usize, opp: usize, empty: usize) -> i64 {
    if own == 4 {
        100
    } else if own == 3 && empty == 1 {
        5
    } else if own == 2 && empty == 2 {
        2
    } else if opp == 3 && empty == 1 {
        -4
    } else {
        0
    }
}

/// Static score of a position for `side`, higher is better.
///
/// Only used at search leaves; terminal positions are scored by the search.
pub fn evaluate(board: &Board, side: Side) -> i64 {
    let own_cell = side.to_cell();
    let opp_cell = side.other().to_cell();

    let center = (0..ROWS)
        .filter(|&row| board.get(row, CENTER_COL) == own_cell)
        .count() as i64;
    let mut score = center * CENTER_WEIGHT;

    for (dr, dc, rows, cols) in WINDOWS {
        for row in rows {
            for col in cols.clone() {
                let mut own = 0;
                let mut opp = 0;
                let mut empty = 0;
                for i in 0..4isize {
                    let r = (row as isize + dr * i) as usize;
                    let c = (col as isize + dc * i) as usize;
                    match board.get(r, c) {
                        cell if cell == own_cell => own += 1,
                        cell if cell == opp_cell => opp += 1,
                        Cell::Empty => empty += 1,
                        Cell::Disc(_) => {}
                    }
                }
                score += score_window(own, opp, empty);
            }
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_is_zero() {
        let board = Board::new();
        assert_eq!(evaluate(&board, Side::One), 0);
        assert_eq!(evaluate(&board, Side::Two), 0);
    }

    #[test]
    fn center_disc_scores_three() {
        let (board, _) = Board::new().drop_disc(CENTER_COL, Side::One).unwrap();
        assert_eq!(evaluate(&board, Side::One), 3);
        // Opponent center discs carry no penalty on their own
        assert_eq!(evaluate(&board, Side::Two), 0);
    }

    #[test]
    fn center_preferred_over_edge() {
        let (center, _) = Board::new().drop_disc(3, Side::One).unwrap();
        let (edge, _) = Board::new().drop_disc(0, Side::One).unwrap();
        assert!(evaluate(&center, Side::One) > evaluate(&edge, Side::One));
    }

    #[test]
    fn two_in_a_row_bottom_edge() {
        let mut board = Board::new();
        board.place(0, Side::One).unwrap();
        board.place(1, Side::One).unwrap();
        // Only the window over cols 0..=3 holds both discs
        assert_eq!(evaluate(&board, Side::One), 2);
    }

    #[test]
    fn three_in_a_row_scores_and_threatens() {
        let mut board = Board::new();
        for col in 0..3 {
            board.place(col, Side::One).unwrap();
        }
        // Windows 0..=3 (3 own), 1..=4 (2 own), 2..=5 has one own only
        assert_eq!(evaluate(&board, Side::One), 5 + 2);
        assert_eq!(evaluate(&board, Side::Two), -4);
    }

    #[test]
    fn mixed_window_scores_zero() {
        let mut board = Board::new();
        board.place(0, Side::One).unwrap();
        board.place(1, Side::Two).unwrap();
        board.place(2, Side::One).unwrap();
        board.place(3, Side::One).unwrap();
        // Center disc plus window 2..=5; window 0..=3 is mixed
        assert_eq!(evaluate(&board, Side::One), 3 + 2);
    }

    #[test]
    fn four_in_window_scores_hundred() {
        let mut board = Board::new();
        for _ in 0..4 {
            board.place(0, Side::Two).unwrap();
        }
        // Vertical windows in column 0: rows 2..=5 full, rows 1..=4 three + 1 empty,
        // rows 0..=3 two + 2 empty
        assert_eq!(evaluate(&board, Side::Two), 100 + 5 + 2);
    }
}
