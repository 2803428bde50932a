use std::sync::Arc;
use std::time::Duration;

use super::{Difficulty, GameOutcome, GameState, Mode, Move, Side};
use crate::ai::{AiConfig, MoveSelector};
use crate::error::{MoveError, StorageError};
use crate::learning::{LearningConfig, LearningStore};
use crate::storage::{load_json, save_json, KeyValueStore, STATS_KEY};

/// Results accumulated across games. Survives `reset_game`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionStats {
    /// Single-player games won by the human.
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Local two-player results.
    pub player_one_wins: u32,
    pub player_two_wins: u32,
    pub local_draws: u32,
}

impl SessionStats {
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        Ok(load_json(store, STATS_KEY)?.unwrap_or_default())
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, STATS_KEY, self)
    }

    fn record(&mut self, mode: Mode, outcome: GameOutcome) {
        match (mode, outcome) {
            (Mode::SinglePlayer(_), GameOutcome::Winner(Side::One)) => self.wins += 1,
            (Mode::SinglePlayer(_), GameOutcome::Winner(Side::Two)) => self.losses += 1,
            (Mode::SinglePlayer(_), GameOutcome::Draw) => self.draws += 1,
            (Mode::LocalTwoPlayer, GameOutcome::Winner(Side::One)) => self.player_one_wins += 1,
            (Mode::LocalTwoPlayer, GameOutcome::Winner(Side::Two)) => self.player_two_wins += 1,
            (Mode::LocalTwoPlayer, GameOutcome::Draw) => self.local_draws += 1,
        }
    }
}

/// What a successful drop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub side: Side,
    pub mv: Move,
    /// Set when this move ended the game.
    pub outcome: Option<GameOutcome>,
}

/// Single-device game controller for both offline modes.
///
/// Owns the current game, the running statistics and the AI. Storage
/// failures are logged and never interrupt play.
pub struct GameSession {
    mode: Mode,
    state: GameState,
    stats: SessionStats,
    player_moves: Vec<usize>,
    selector: MoveSelector,
    learning: LearningStore,
    store: Arc<dyn KeyValueStore>,
    thinking_delay: Duration,
}

impl GameSession {
    pub fn new(
        mode: Mode,
        ai: AiConfig,
        learning: LearningConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let learning = LearningStore::load_or_default(store.as_ref(), learning);
        Self::with_parts(mode, MoveSelector::new(ai), learning, store)
    }

    /// Build from an explicit selector and learning store.
    pub fn with_parts(
        mode: Mode,
        selector: MoveSelector,
        learning: LearningStore,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let stats = SessionStats::load(store.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load stats, starting from zero");
            SessionStats::default()
        });
        let thinking_delay = Duration::from_millis(selector.config().thinking_delay_ms);
        GameSession {
            mode,
            state: GameState::initial(),
            stats,
            player_moves: Vec::new(),
            selector,
            learning,
            store,
            thinking_delay,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn learning(&self) -> &LearningStore {
        &self.learning
    }

    /// Columns the human has played this game, single-player only.
    pub fn player_moves(&self) -> &[usize] {
        &self.player_moves
    }

    pub fn thinking_delay(&self) -> Duration {
        self.thinking_delay
    }

    pub fn set_thinking_delay(&mut self, delay: Duration) {
        self.thinking_delay = delay;
    }

    /// True when the side to move is the computer.
    pub fn is_ai_turn(&self) -> bool {
        matches!(self.mode, Mode::SinglePlayer(_))
            && !self.state.is_terminal()
            && self.state.current_side() == Side::Two
    }

    /// Human move. In single-player the human may only move on their own turn.
    pub fn drop_disc(&mut self, column: usize) -> Result<MoveReport, MoveError> {
        if self.is_ai_turn() {
            return Err(MoveError::NotYourTurn);
        }
        let side = self.state.current_side();
        let report = self.apply(column)?;
        if matches!(self.mode, Mode::SinglePlayer(_)) && side == Side::One {
            self.player_moves.push(column);
        }
        if let Some(outcome) = report.outcome {
            self.finish_game(outcome);
        }
        Ok(report)
    }

    /// Column the AI would play now, without applying it.
    pub fn compute_ai_move(&mut self) -> Result<usize, MoveError> {
        let Mode::SinglePlayer(difficulty) = self.mode else {
            return Err(MoveError::NotYourTurn);
        };
        if self.state.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if !self.is_ai_turn() {
            return Err(MoveError::NotYourTurn);
        }
        self.selector
            .choose_move(
                self.state.board(),
                Side::Two,
                difficulty,
                &self.player_moves,
                &self.learning,
            )
            .ok_or(MoveError::GameOver)
    }

    /// Compute and apply the AI's move immediately.
    pub fn ai_move(&mut self) -> Result<MoveReport, MoveError> {
        let column = self.compute_ai_move()?;
        self.apply_ai(column)
    }

    /// Compute the AI's move, then wait out the thinking delay before
    /// applying it.
    pub async fn play_ai_turn(&mut self) -> Result<MoveReport, MoveError> {
        let column = self.compute_ai_move()?;
        if !self.thinking_delay.is_zero() {
            tokio::time::sleep(self.thinking_delay).await;
        }
        self.apply_ai(column)
    }

    fn apply_ai(&mut self, column: usize) -> Result<MoveReport, MoveError> {
        let report = self.apply(column)?;
        if let Some(outcome) = report.outcome {
            self.finish_game(outcome);
        }
        Ok(report)
    }

    fn apply(&mut self, column: usize) -> Result<MoveReport, MoveError> {
        let side = self.state.current_side();
        let mv = self.state.apply_move_mut(column).inspect_err(|e| {
            tracing::debug!(column, error = %e, "move rejected");
        })?;
        Ok(MoveReport {
            side,
            mv,
            outcome: self.state.outcome(),
        })
    }

    fn finish_game(&mut self, outcome: GameOutcome) {
        tracing::info!(?outcome, mode = ?self.mode, "game finished");
        self.stats.record(self.mode, outcome);

        if let (Mode::SinglePlayer(difficulty), GameOutcome::Winner(Side::One)) =
            (self.mode, outcome)
        {
            self.learning.record_loss(&self.player_moves, difficulty);
            if let Err(e) = self.learning.save(self.store.as_ref()) {
                tracing::warn!(error = %e, "failed to persist AI learning");
            }
        }
        self.persist_stats();
    }

    fn persist_stats(&self) {
        if let Err(e) = self.stats.save(self.store.as_ref()) {
            tracing::warn!(error = %e, "failed to persist stats");
        }
    }

    /// Start a new game in the current mode. Statistics are kept.
    pub fn reset_game(&mut self) {
        self.state = GameState::initial();
        self.player_moves.clear();
    }

    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
        self.persist_stats();
    }

    /// Forget every learned pattern, in memory and in storage.
    pub fn clear_learning(&mut self) {
        self.learning.clear();
        if let Err(e) = self.learning.save(self.store.as_ref()) {
            tracing::warn!(error = %e, "failed to persist cleared learning data");
        }
    }

    /// Switch to single-player at `difficulty` and start a new game.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.set_mode(Mode::SinglePlayer(difficulty));
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.reset_game();
    }
}
