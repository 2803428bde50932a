use crate::game::{Board, Difficulty, Side};
use crate::learning::LearningStore;

use super::minimax::best_move;
use super::random::{RandomSource, SystemRandom};

/// Search depths and the probabilities that shape each difficulty.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub easy_depth: u32,
    pub medium_depth: u32,
    pub hard_depth: u32,
    /// Chance that `easy` skips search and plays a random legal column.
    pub easy_random_move_chance: f64,
    /// Chance that a learned counter-move overrides search at `medium`.
    pub medium_counter_chance: f64,
    /// Chance that a learned counter-move overrides search at `hard`.
    pub hard_counter_chance: f64,
    /// Minimum pause before an AI move is applied, in milliseconds.
    pub thinking_delay_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            easy_depth: 1,
            medium_depth: 3,
            hard_depth: 5,
            easy_random_move_chance: 0.3,
            medium_counter_chance: 0.25,
            hard_counter_chance: 0.4,
            thinking_delay_ms: 500,
        }
    }
}

impl AiConfig {
    /// Search depth in plies.
    pub fn depth_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy_depth,
            Difficulty::Medium => self.medium_depth,
            Difficulty::Hard => self.hard_depth,
        }
    }

    fn counter_chance(&self, difficulty: Difficulty) -> Option<f64> {
        match difficulty {
            Difficulty::Easy => None,
            Difficulty::Medium => Some(self.medium_counter_chance),
            Difficulty::Hard => Some(self.hard_counter_chance),
        }
    }
}

/// How the selector arrived at its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Random(usize),
    Counter(usize),
    Search { column: usize, score: i64 },
}

impl Decision {
    pub fn column(self) -> usize {
        match self {
            Decision::Random(col) | Decision::Counter(col) => col,
            Decision::Search { column, .. } => column,
        }
    }
}

/// Picks the AI's column by blending search with learned loss patterns.
pub struct MoveSelector {
    config: AiConfig,
    rng: Box<dyn RandomSource>,
}

impl MoveSelector {
    pub fn new(config: AiConfig) -> Self {
        Self::with_rng(config, Box::new(SystemRandom::new()))
    }

    pub fn with_rng(config: AiConfig, rng: Box<dyn RandomSource>) -> Self {
        MoveSelector { config, rng }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Choose a column for `ai_side`, or `None` when the board is full.
    ///
    /// `player_history` is the opponent's column sequence this game; it is
    /// matched against `learning` for penalties and counter-moves.
    pub fn choose_move(
        &mut self,
        board: &Board,
        ai_side: Side,
        difficulty: Difficulty,
        player_history: &[usize],
        learning: &LearningStore,
    ) -> Option<usize> {
        self.decide(board, ai_side, difficulty, player_history, learning)
            .map(Decision::column)
    }

    pub fn decide(
        &mut self,
        board: &Board,
        ai_side: Side,
        difficulty: Difficulty,
        player_history: &[usize],
        learning: &LearningStore,
    ) -> Option<Decision> {
        let legal = board.valid_moves();
        if legal.is_empty() {
            return None;
        }

        if difficulty == Difficulty::Easy && self.rng.chance(self.config.easy_random_move_chance) {
            let col = self.rng.pick(&legal)?;
            tracing::debug!(col, "easy AI plays a random column");
            return Some(Decision::Random(col));
        }

        let penalties = learning.penalties_for(player_history, difficulty);

        if let Some(chance) = self.config.counter_chance(difficulty) {
            let counter = learning.suggest_counter_move(
                player_history,
                &legal,
                difficulty,
                self.rng.as_mut(),
            );
            if let Some(col) = counter {
                if self.rng.chance(chance) {
                    tracing::debug!(col, %difficulty, "AI plays learned counter-move");
                    return Some(Decision::Counter(col));
                }
            }
        }

        let depth = self.config.depth_for(difficulty);
        let result = best_move(board, depth, ai_side, &penalties, self.rng.as_mut());
        let column = result.column?;
        tracing::debug!(
            column,
            score = result.score,
            depth,
            penalised = !penalties.is_empty(),
            "AI search decision"
        );
        Some(Decision::Search {
            column,
            score: result.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::random::ScriptedRandom;
    use crate::ai::WIN_SCORE;
    use crate::game::GameState;
    use crate::learning::LearningConfig;

    fn selector(units: Vec<f64>, indices: Vec<usize>) -> MoveSelector {
        MoveSelector::with_rng(
            AiConfig::default(),
            Box::new(ScriptedRandom::new(units, indices)),
        )
    }

    fn empty_learning() -> LearningStore {
        LearningStore::new(LearningConfig::default())
    }

    #[test]
    fn full_board_has_no_move() {
        let mut board = Board::new();
        for col in 0..7 {
            for _ in 0..6 {
                board.place(col, Side::One).unwrap();
            }
        }
        let mut sel = MoveSelector::new(AiConfig::default());
        assert_eq!(
            sel.choose_move(&board, Side::Two, Difficulty::Hard, &[], &empty_learning()),
            None
        );
    }

    #[test]
    fn easy_sometimes_plays_randomly() {
        // 0.1 < 0.3 triggers the random branch, index 5 picks column 5
        let mut sel = selector(vec![0.1], vec![5]);
        let decision = sel
            .decide(&Board::new(), Side::Two, Difficulty::Easy, &[], &empty_learning())
            .unwrap();
        assert_eq!(decision, Decision::Random(5));
    }

    #[test]
    fn easy_never_uses_counter_moves() {
        let mut learning = empty_learning();
        learning.record_loss(&[0, 1, 1, 1], Difficulty::Easy);
        // 0.9 skips the random branch; the rest of the draws would allow a counter
        let mut sel = selector(vec![0.9, 0.0, 0.0], vec![3]);
        let decision = sel
            .decide(&Board::from_moves(&[0]).unwrap(), Side::Two, Difficulty::Easy, &[0], &learning)
            .unwrap();
        assert!(matches!(decision, Decision::Search { .. }));
    }

    #[test]
    fn hard_plays_counter_move_when_rolled() {
        let mut learning = empty_learning();
        learning.record_loss(&[3, 5, 5, 5], Difficulty::Hard);
        // block roll 0.1 < 0.7, override roll 0.2 < 0.4
        let mut sel = selector(vec![0.1, 0.2], vec![]);
        let board = Board::from_moves(&[3]).unwrap();
        let decision = sel
            .decide(&board, Side::Two, Difficulty::Hard, &[3], &learning)
            .unwrap();
        assert_eq!(decision, Decision::Counter(5));
    }

    #[test]
    fn medium_counter_chance_is_lower() {
        let mut learning = empty_learning();
        learning.record_loss(&[3, 5, 5, 5], Difficulty::Medium);
        // Override roll 0.3 passes at hard (0.4) but not at medium (0.25)
        let mut sel = selector(vec![0.1, 0.3], vec![]);
        let board = Board::from_moves(&[3]).unwrap();
        let decision = sel
            .decide(&board, Side::Two, Difficulty::Medium, &[3], &learning)
            .unwrap();
        assert!(matches!(decision, Decision::Search { .. }));
    }

    #[test]
    fn search_takes_immediate_win() {
        let board = Board::from_moves(&[6, 0, 6, 1, 5, 2, 5]).unwrap();
        let mut sel = MoveSelector::with_rng(AiConfig::default(), Box::new(SystemRandom::seeded(4)));
        let decision = sel
            .decide(&board, Side::Two, Difficulty::Hard, &[6, 6, 5, 5], &empty_learning())
            .unwrap();
        assert_eq!(
            decision,
            Decision::Search {
                column: 3,
                score: WIN_SCORE
            }
        );
    }

    #[test]
    fn learned_penalty_changes_opening_reply() {
        let config = AiConfig::default();
        let mut learning = empty_learning();
        // Huge loss count on column 3 as the human's second move
        for _ in 0..1_000 {
            learning.record_loss(&[2, 3, 3, 3, 3], Difficulty::Medium);
        }
        let board = Board::from_moves(&[2]).unwrap();
        // Skip the counter branch: block roll fails, neighbour roll fails
        let mut sel = MoveSelector::with_rng(
            config,
            Box::new(ScriptedRandom::new(vec![0.99, 0.99], vec![])),
        );
        let decision = sel
            .decide(&board, Side::Two, Difficulty::Medium, &[2], &learning)
            .unwrap();
        assert_ne!(decision.column(), 3);
    }

    #[test]
    fn selector_plays_full_game_against_itself() {
        let learning = empty_learning();
        let mut one = MoveSelector::with_rng(AiConfig::default(), Box::new(SystemRandom::seeded(1)));
        let mut two = MoveSelector::with_rng(AiConfig::default(), Box::new(SystemRandom::seeded(2)));
        let mut state = GameState::initial();
        while !state.is_terminal() {
            let side = state.current_side();
            let selector = if side == Side::One { &mut one } else { &mut two };
            let col = selector
                .choose_move(state.board(), side, Difficulty::Medium, &[], &learning)
                .unwrap();
            state.apply_move_mut(col).unwrap();
        }
        assert!(state.outcome().is_some());
    }

    #[test]
    fn hard_beats_random_player() {
        let learning = empty_learning();
        let mut wins = 0;
        let games = 10;
        for seed in 0..games {
            let mut ai = MoveSelector::with_rng(AiConfig::default(), Box::new(SystemRandom::seeded(seed)));
            let mut opponent = SystemRandom::seeded(1_000 + seed);
            let mut state = GameState::initial();
            while !state.is_terminal() {
                let col = if state.current_side() == Side::One {
                    opponent.pick(&state.legal_actions()).unwrap()
                } else {
                    ai.choose_move(state.board(), Side::Two, Difficulty::Hard, &[], &learning)
                        .unwrap()
                };
                state.apply_move_mut(col).unwrap();
            }
            if state.winner() == Some(Side::Two) {
                wins += 1;
            }
        }
        assert!(wins >= 8, "hard AI won only {wins}/{games} against random play");
    }
}
