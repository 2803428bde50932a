use std::iter;

use crate::game::{Board, Side};
use crate::learning::Penalties;

use super::heuristic::evaluate;
use super::random::RandomSource;

/// Score of a decided position, signed by whether the AI won.
pub const WIN_SCORE: i64 = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` for positions that needed no move: won, drawn or depth-exhausted.
    pub column: Option<usize>,
    pub score: i64,
}

impl SearchResult {
    fn leaf(score: i64) -> Self {
        SearchResult {
            column: None,
            score,
        }
    }
}

/// Minimax with alpha-beta pruning, scored from `ai_side`'s perspective.
///
/// `penalties` are subtracted from the AI's candidate columns at the root
/// only. Children are tried starting from a uniformly random legal column
/// and the best column is replaced only by a strictly better score, so
/// ties resolve randomly.
#[allow(clippy::too_many_arguments)]
pub fn search(
    board: &Board,
    depth: u32,
    alpha: i64,
    beta: i64,
    maximizing: bool,
    ai_side: Side,
    penalties: &Penalties,
    rng: &mut dyn RandomSource,
) -> SearchResult {
    let mut searcher = Searcher {
        ai_side,
        penalties,
        rng,
        nodes: 0,
    };
    let result = searcher.minimax(board, depth, alpha, beta, maximizing, true);
    tracing::trace!(nodes = searcher.nodes, depth, ?result, "search finished");
    result
}

/// Full-window search for the AI's move at `depth` plies.
pub fn best_move(
    board: &Board,
    depth: u32,
    ai_side: Side,
    penalties: &Penalties,
    rng: &mut dyn RandomSource,
) -> SearchResult {
    search(board, depth, i64::MIN, i64::MAX, true, ai_side, penalties, rng)
}

struct Searcher<'a> {
    ai_side: Side,
    penalties: &'a Penalties,
    rng: &'a mut dyn RandomSource,
    nodes: u64,
}

impl Searcher<'_> {
    fn minimax(
        &mut self,
        board: &Board,
        depth: u32,
        mut alpha: i64,
        mut beta: i64,
        maximizing: bool,
        root: bool,
    ) -> SearchResult {
        self.nodes += 1;

        // Re-verify the position the caller just produced
        if let Some((winner, _)) = board.surface_winner() {
            let score = if winner == self.ai_side {
                WIN_SCORE
            } else {
                -WIN_SCORE
            };
            return SearchResult::leaf(score);
        }

        let legal = board.valid_moves();
        if legal.is_empty() {
            return SearchResult::leaf(0);
        }
        if depth == 0 {
            return SearchResult::leaf(evaluate(board, self.ai_side));
        }

        let mover = if maximizing {
            self.ai_side
        } else {
            self.ai_side.other()
        };
        let first = legal[self.rng.next_index(legal.len())];
        let order = iter::once(first).chain(legal.iter().copied().filter(|&c| c != first));

        let mut best_col = first;
        let mut value = if maximizing { i64::MIN } else { i64::MAX };

        for col in order {
            let Ok((child, _)) = board.drop_disc(col, mover) else {
                continue;
            };
            let mut score = self
                .minimax(&child, depth - 1, alpha, beta, !maximizing, false)
                .score;

            if maximizing {
                if root {
                    score = score.saturating_sub(self.penalties.get(col));
                }
                if score > value {
                    value = score;
                    best_col = col;
                }
                alpha = alpha.max(value);
            } else {
                if score < value {
                    value = score;
                    best_col = col;
                }
                beta = beta.min(value);
            }

            if alpha >= beta {
                break;
            }
        }

        SearchResult {
            column: Some(best_col),
            score: value,
        }
    }
}
