use std::sync::Arc;

use uuid::Uuid;

use super::backend::GameBackend;
use super::subscription::Subscription;
use super::types::{
    ChangeEvent, GameStatus, MatchOutcome, MoveRequest, OnlineGame, QueueEntry, QueueStatus, Topic,
};
use crate::error::{MatchmakingError, MoveError};
use crate::game::Side;

/// Client-side lifecycle of one online game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Searching,
    /// Paired through a challenge that has not been accepted yet.
    Matched,
    Playing,
    Finished,
}

impl SessionPhase {
    fn for_status(status: GameStatus) -> Self {
        match status {
            GameStatus::Waiting => SessionPhase::Matched,
            GameStatus::Playing => SessionPhase::Playing,
            GameStatus::Finished => SessionPhase::Finished,
        }
    }
}

/// One player's view of networked play.
///
/// The local game is a read-only projection: it is replaced wholesale by
/// every newer authoritative row and never edited in place.
pub struct OnlineSession {
    backend: Arc<dyn GameBackend>,
    player_id: String,
    phase: SessionPhase,
    queue_entry: Option<QueueEntry>,
    game: Option<OnlineGame>,
    subscription: Option<Subscription>,
}

impl OnlineSession {
    pub fn new(backend: Arc<dyn GameBackend>, player_id: impl Into<String>) -> Self {
        OnlineSession {
            backend,
            player_id: player_id.into(),
            phase: SessionPhase::Idle,
            queue_entry: None,
            game: None,
            subscription: None,
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn game(&self) -> Option<&OnlineGame> {
        self.game.as_ref()
    }

    pub fn queue_entry(&self) -> Option<&QueueEntry> {
        self.queue_entry.as_ref()
    }

    /// Seat this player holds in the current game.
    pub fn my_side(&self) -> Option<Side> {
        self.game.as_ref()?.side_of(&self.player_id)
    }

    pub fn is_my_turn(&self) -> bool {
        self.phase == SessionPhase::Playing
            && self
                .game
                .as_ref()
                .and_then(OnlineGame::current_player_id)
                .is_some_and(|id| id == self.player_id)
    }

    fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Searching | SessionPhase::Matched | SessionPhase::Playing
        )
    }

    /// Enter matchmaking. Either plays at once against a waiting opponent
    /// or waits in the queue until [`OnlineSession::next_update`] reports
    /// the match.
    pub async fn find_match(&mut self) -> Result<SessionPhase, MatchmakingError> {
        if self.is_busy() {
            return Err(MatchmakingError::AlreadySearching(self.player_id.clone()));
        }
        self.clear();

        // Subscribe before enqueueing so the matched row cannot be missed
        let subscription = self.backend.subscribe(Topic::Player(self.player_id.clone()));
        match self.backend.find_match(&self.player_id).await {
            Ok(MatchOutcome::Matched(game)) => {
                self.subscription = Some(subscription);
                self.enter_game(game).await;
            }
            Ok(MatchOutcome::Queued(entry)) => {
                tracing::info!(player = %self.player_id, "searching for opponent");
                self.queue_entry = Some(entry);
                self.subscription = Some(subscription);
                self.phase = SessionPhase::Searching;
            }
            Err(e) => {
                tracing::warn!(player = %self.player_id, error = %e, "matchmaking failed");
                self.clear();
                return Err(e);
            }
        }
        Ok(self.phase)
    }

    /// Leave the queue. Safe to call in any phase.
    ///
    /// A search that was already matched cannot be withdrawn; the session
    /// joins that game instead and reports its phase.
    pub async fn cancel_search(&mut self) -> SessionPhase {
        if let Some(entry) = self.queue_entry.take() {
            match self.backend.cancel_search(entry.id, &self.player_id).await {
                Ok(Some(game_id)) => match self.backend.fetch_game(game_id).await {
                    Some(game) => self.enter_game(game).await,
                    None => {
                        tracing::warn!(player = %self.player_id, game = %game_id, "matched game vanished");
                        self.clear();
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(player = %self.player_id, error = %e, "failed to cancel search");
                }
            }
        }
        if self.phase == SessionPhase::Searching {
            self.subscription = None;
            self.phase = SessionPhase::Idle;
        }
        self.phase
    }

    /// Stop following the current game. Safe to call in any phase.
    pub fn leave_game(&mut self) {
        if let Some(game) = &self.game {
            tracing::info!(player = %self.player_id, game = %game.id, "left game");
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.subscription = None;
        self.queue_entry = None;
        self.game = None;
        self.phase = SessionPhase::Idle;
    }

    /// Follow `game`, keeping any open feed that already carries its rows.
    async fn enter_game(&mut self, game: OnlineGame) {
        tracing::info!(player = %self.player_id, game = %game.id, status = ?game.status, "joined game");
        let game_id = game.id;
        self.queue_entry = None;
        let covered = self.subscription.as_ref().is_some_and(|s| match s.topic() {
            Topic::Player(id) => *id == self.player_id,
            Topic::Game(id) => *id == game_id,
        });
        if !covered {
            self.subscription = Some(self.backend.subscribe(Topic::Game(game_id)));
        }
        self.phase = SessionPhase::for_status(game.status);
        self.game = Some(game);

        // Rows committed before the feed started only reach us through a fetch
        if let Some(latest) = self.backend.fetch_game(game_id).await {
            self.apply_row(latest);
        }
    }

    /// Challenge a known player. The challenger waits in `Matched`.
    pub async fn challenge(&mut self, invitee_id: &str) -> Result<&OnlineGame, MatchmakingError> {
        if self.is_busy() {
            return Err(MatchmakingError::AlreadySearching(self.player_id.clone()));
        }
        let game = self
            .backend
            .create_challenge(&self.player_id, invitee_id)
            .await?;
        self.enter_game(game).await;
        self.game.as_ref().ok_or(MatchmakingError::GameNotFound)
    }

    /// Open an existing game this player takes part in.
    pub async fn join_game(&mut self, game_id: Uuid) -> Result<SessionPhase, MatchmakingError> {
        let game = self
            .backend
            .fetch_game(game_id)
            .await
            .ok_or(MatchmakingError::GameNotFound)?;
        if !game.is_participant(&self.player_id) {
            return Err(MatchmakingError::NotInvited);
        }
        self.enter_game(game).await;
        Ok(self.phase)
    }

    pub async fn accept_challenge(
        &mut self,
        game_id: Uuid,
    ) -> Result<SessionPhase, MatchmakingError> {
        let game = self
            .backend
            .accept_challenge(game_id, &self.player_id)
            .await?;
        self.enter_game(game).await;
        Ok(self.phase)
    }

    pub async fn decline_challenge(&mut self, game_id: Uuid) -> Result<(), MatchmakingError> {
        self.backend
            .decline_challenge(game_id, &self.player_id)
            .await?;
        if self.game.as_ref().is_some_and(|g| g.id == game_id) {
            self.clear();
        }
        Ok(())
    }

    /// Submit a move through the authoritative backend.
    ///
    /// The request carries the version of the local projection, so a move
    /// made against a stale board is rejected instead of applied.
    pub async fn make_move(&mut self, column: usize) -> Result<&OnlineGame, MoveError> {
        let game = self.game.as_ref().ok_or(MoveError::GameNotFound)?;
        let request = MoveRequest {
            game_id: game.id,
            player_id: self.player_id.clone(),
            column,
            expected_version: Some(game.version),
        };
        let updated = self.backend.make_move(request).await?;
        self.apply_row(updated);
        self.game.as_ref().ok_or(MoveError::GameNotFound)
    }

    /// Set this player's theme for the current game.
    pub async fn set_theme(&mut self, theme_id: &str) -> Result<(), MoveError> {
        let game_id = self.game.as_ref().ok_or(MoveError::GameNotFound)?.id;
        let updated = self
            .backend
            .set_theme(game_id, &self.player_id, theme_id)
            .await?;
        self.apply_row(updated);
        Ok(())
    }

    /// Wait for the next change and fold it into the session. Returns
    /// `None` when there is nothing to wait for.
    pub async fn next_update(&mut self) -> Option<SessionPhase> {
        let event = self.subscription.as_mut()?.recv().await?;
        self.handle_event(event).await;
        Some(self.phase)
    }

    /// Fold one change event into the session.
    pub async fn handle_event(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Queue(entry) => {
                let ours = self.queue_entry.as_ref().is_some_and(|e| e.id == entry.id);
                if !ours || entry.status != QueueStatus::Matched {
                    return;
                }
                let Some(game_id) = entry.game_id else {
                    return;
                };
                match self.backend.fetch_game(game_id).await {
                    Some(game) => self.enter_game(game).await,
                    None => {
                        tracing::warn!(player = %self.player_id, game = %game_id, "matched game vanished");
                        self.clear();
                    }
                }
            }
            ChangeEvent::QueueRemoved(entry) => {
                if self.queue_entry.as_ref().is_some_and(|e| e.id == entry.id) {
                    self.clear();
                }
            }
            ChangeEvent::Game(game) => self.apply_row(game),
            ChangeEvent::GameRemoved(game) => {
                if self.game.as_ref().is_some_and(|g| g.id == game.id) {
                    tracing::info!(player = %self.player_id, game = %game.id, "game removed");
                    self.clear();
                }
            }
        }
    }

    /// Replace the projection with a newer authoritative row.
    fn apply_row(&mut self, row: OnlineGame) {
        let Some(current) = &self.game else {
            return;
        };
        if current.id != row.id || row.version < current.version {
            return;
        }
        self.phase = SessionPhase::for_status(row.status);
        self.game = Some(row);
    }
}
