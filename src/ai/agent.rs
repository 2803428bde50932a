use crate::game::{Difficulty, GameState, Side};
use crate::learning::LearningStore;

use super::random::{RandomSource, SystemRandom};
use super::selector::{AiConfig, MoveSelector};

/// Universal interface for anything that picks columns.
pub trait Agent: Send {
    /// Select a column for the side to move, or `None` when no move is legal.
    fn select_action(&mut self, state: &GameState) -> Option<usize>;

    /// Return the agent's display name.
    fn name(&self) -> &str;

    /// Notify the agent of a move that was applied, by either side.
    fn observe_move(&mut self, _side: Side, _column: usize) {}

    /// Forget per-game memory before a new game starts.
    fn reset(&mut self) {}
}

/// An agent that selects uniformly at random from legal actions.
pub struct RandomAgent {
    rng: Box<dyn RandomSource>,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self::with_rng(Box::new(SystemRandom::new()))
    }

    pub fn with_rng(rng: Box<dyn RandomSource>) -> Self {
        RandomAgent { rng }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        self.rng.pick(&state.legal_actions())
    }

    fn name(&self) -> &str {
        "Random"
    }
}

/// The search-and-learning AI packaged as an agent.
///
/// Tracks the opponent's columns itself so callers only report moves.
pub struct AdaptiveAgent {
    selector: MoveSelector,
    learning: LearningStore,
    difficulty: Difficulty,
    opponent_moves: Vec<usize>,
    side: Option<Side>,
}

impl AdaptiveAgent {
    pub fn new(config: AiConfig, learning: LearningStore, difficulty: Difficulty) -> Self {
        Self::with_selector(MoveSelector::new(config), learning, difficulty)
    }

    pub fn with_selector(
        selector: MoveSelector,
        learning: LearningStore,
        difficulty: Difficulty,
    ) -> Self {
        AdaptiveAgent {
            selector,
            learning,
            difficulty,
            opponent_moves: Vec::new(),
            side: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn learning(&self) -> &LearningStore {
        &self.learning
    }

    pub fn opponent_moves(&self) -> &[usize] {
        &self.opponent_moves
    }
}

impl Agent for AdaptiveAgent {
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        let side = state.current_side();
        self.side = Some(side);
        self.selector.choose_move(
            state.board(),
            side,
            self.difficulty,
            &self.opponent_moves,
            &self.learning,
        )
    }

    fn name(&self) -> &str {
        self.difficulty.name()
    }

    fn observe_move(&mut self, side: Side, column: usize) {
        // Before our first turn every move we see belongs to the opponent
        if self.side != Some(side) {
            self.opponent_moves.push(column);
        }
    }

    fn reset(&mut self) {
        self.opponent_moves.clear();
        self.side = None;
    }
}
