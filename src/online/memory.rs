use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::backend::GameBackend;
use super::subscription::Subscription;
use super::types::{
    ChangeEvent, GameStatus, MatchOutcome, MoveRequest, OnlineGame, QueueEntry, QueueStatus, Topic,
};
use crate::error::{MatchmakingError, MoveError};

const EVENT_CAPACITY: usize = 256;

#[derive(Default)]
struct Tables {
    /// Oldest first.
    queue: Vec<QueueEntry>,
    games: HashMap<Uuid, OnlineGame>,
    /// Queue entry id to the game it was paired into.
    matched: HashMap<Uuid, Uuid>,
}

/// Authoritative backend held in process memory.
///
/// One lock serialises every transition, and events are published while
/// it is held, so subscribers see rows in commit order.
pub struct InMemoryBackend {
    tables: Mutex<Tables>,
    events: broadcast::Sender<ChangeEvent>,
    queue_open: AtomicBool,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        InMemoryBackend {
            tables: Mutex::new(Tables::default()),
            events,
            queue_open: AtomicBool::new(true),
        }
    }

    /// Refuse new matchmaking requests until reopened.
    pub fn close_queue(&self) {
        self.queue_open.store(false, Ordering::SeqCst);
    }

    pub fn open_queue(&self) {
        self.queue_open.store(true, Ordering::SeqCst);
    }

    pub fn queue_len(&self) -> usize {
        self.tables.lock().queue.len()
    }

    pub fn game_count(&self) -> usize {
        self.tables.lock().games.len()
    }

    fn publish(&self, event: ChangeEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl GameBackend for InMemoryBackend {
    async fn find_match(&self, player_id: &str) -> Result<MatchOutcome, MatchmakingError> {
        if !self.queue_open.load(Ordering::SeqCst) {
            return Err(MatchmakingError::QueueUnavailable("queue is closed".into()));
        }

        let mut tables = self.tables.lock();
        if tables
            .queue
            .iter()
            .any(|e| e.player_id == player_id && e.status == QueueStatus::Waiting)
        {
            return Err(MatchmakingError::AlreadySearching(player_id.to_string()));
        }

        let opponent = tables
            .queue
            .iter()
            .position(|e| e.status == QueueStatus::Waiting && e.player_id != player_id);

        let Some(index) = opponent else {
            let entry = QueueEntry::waiting(player_id);
            tables.queue.push(entry.clone());
            tracing::info!(player = player_id, entry = %entry.id, "queued for matchmaking");
            self.publish(ChangeEvent::Queue(entry.clone()));
            return Ok(MatchOutcome::Queued(entry));
        };

        let mut entry = tables.queue.remove(index);
        let game = OnlineGame::new(&entry.player_id, player_id, GameStatus::Playing);
        entry.status = QueueStatus::Matched;
        entry.game_id = Some(game.id);
        tables.games.insert(game.id, game.clone());
        tables.matched.insert(entry.id, game.id);
        tracing::info!(
            game = %game.id,
            player1 = %game.player1_id,
            player2 = player_id,
            "matched players"
        );
        self.publish(ChangeEvent::Queue(entry));
        self.publish(ChangeEvent::Game(game.clone()));
        Ok(MatchOutcome::Matched(game))
    }

    async fn cancel_search(
        &self,
        entry_id: Uuid,
        player_id: &str,
    ) -> Result<Option<Uuid>, MatchmakingError> {
        let mut tables = self.tables.lock();
        if let Some(index) = tables
            .queue
            .iter()
            .position(|e| e.id == entry_id && e.player_id == player_id)
        {
            let entry = tables.queue.remove(index);
            tracing::info!(player = player_id, entry = %entry.id, "left matchmaking queue");
            self.publish(ChangeEvent::QueueRemoved(entry));
            return Ok(None);
        }

        // Too late: the entry was paired before the cancel arrived
        let game_id = tables.matched.get(&entry_id).copied().filter(|id| {
            tables
                .games
                .get(id)
                .is_some_and(|g| g.player1_id == player_id)
        });
        if let Some(game_id) = game_id {
            tracing::info!(player = player_id, game = %game_id, "cancel arrived after match");
        }
        Ok(game_id)
    }

    async fn fetch_game(&self, game_id: Uuid) -> Option<OnlineGame> {
        self.tables.lock().games.get(&game_id).cloned()
    }

    async fn create_challenge(
        &self,
        challenger_id: &str,
        invitee_id: &str,
    ) -> Result<OnlineGame, MatchmakingError> {
        if challenger_id == invitee_id {
            return Err(MatchmakingError::NotInvited);
        }
        let game = OnlineGame::new(challenger_id, invitee_id, GameStatus::Waiting);
        let mut tables = self.tables.lock();
        tables.games.insert(game.id, game.clone());
        tracing::info!(game = %game.id, challenger_id, invitee_id, "challenge created");
        self.publish(ChangeEvent::Game(game.clone()));
        Ok(game)
    }

    async fn accept_challenge(
        &self,
        game_id: Uuid,
        player_id: &str,
    ) -> Result<OnlineGame, MatchmakingError> {
        let mut tables = self.tables.lock();
        let game = tables
            .games
            .get_mut(&game_id)
            .ok_or(MatchmakingError::GameNotFound)?;
        if game.player2_id.as_deref() != Some(player_id) {
            return Err(MatchmakingError::NotInvited);
        }
        if game.status != GameStatus::Waiting {
            return Err(MatchmakingError::ChallengeNotPending);
        }
        game.status = GameStatus::Playing;
        game.version += 1;
        let game = game.clone();
        tracing::info!(game = %game.id, player = player_id, "challenge accepted");
        self.publish(ChangeEvent::Game(game.clone()));
        Ok(game)
    }

    async fn decline_challenge(
        &self,
        game_id: Uuid,
        player_id: &str,
    ) -> Result<(), MatchmakingError> {
        let mut tables = self.tables.lock();
        let game = tables
            .games
            .get(&game_id)
            .ok_or(MatchmakingError::GameNotFound)?;
        if game.player2_id.as_deref() != Some(player_id) {
            return Err(MatchmakingError::NotInvited);
        }
        if game.status != GameStatus::Waiting {
            return Err(MatchmakingError::ChallengeNotPending);
        }
        if let Some(game) = tables.games.remove(&game_id) {
            tracing::info!(game = %game.id, player = player_id, "challenge declined");
            self.publish(ChangeEvent::GameRemoved(game));
        }
        Ok(())
    }

    async fn set_theme(
        &self,
        game_id: Uuid,
        player_id: &str,
        theme_id: &str,
    ) -> Result<OnlineGame, MoveError> {
        let mut tables = self.tables.lock();
        let game = tables
            .games
            .get_mut(&game_id)
            .ok_or(MoveError::GameNotFound)?;
        let side = game.side_of(player_id).ok_or(MoveError::NotAParticipant)?;
        *game.theme_slot(side) = Some(theme_id.to_string());
        game.version += 1;
        let game = game.clone();
        self.publish(ChangeEvent::Game(game.clone()));
        Ok(game)
    }

    async fn make_move(&self, request: MoveRequest) -> Result<OnlineGame, MoveError> {
        let mut tables = self.tables.lock();
        let game = tables
            .games
            .get_mut(&request.game_id)
            .ok_or(MoveError::GameNotFound)?;

        let rejected = |e: MoveError| {
            tracing::warn!(
                game = %request.game_id,
                player = %request.player_id,
                column = request.column,
                error = %e,
                "move rejected"
            );
            e
        };

        if game.status == GameStatus::Finished || game.state.is_terminal() {
            return Err(rejected(MoveError::GameOver));
        }
        if game.status == GameStatus::Waiting {
            return Err(rejected(MoveError::GameNotStarted));
        }
        let side = game
            .side_of(&request.player_id)
            .ok_or_else(|| rejected(MoveError::NotAParticipant))?;
        if side != game.state.current_side() {
            return Err(rejected(MoveError::NotYourTurn));
        }
        if request.expected_version.is_some_and(|v| v != game.version) {
            return Err(rejected(MoveError::NotYourTurn));
        }

        let next = game.state.apply_move(request.column).map_err(rejected)?;
        game.state = next;
        game.version += 1;
        if game.state.is_terminal() {
            game.status = GameStatus::Finished;
            tracing::info!(game = %game.id, outcome = ?game.state.outcome(), "online game finished");
        }
        let game = game.clone();
        self.publish(ChangeEvent::Game(game.clone()));
        Ok(game)
    }

    fn subscribe(&self, topic: Topic) -> Subscription {
        Subscription::spawn(self.events.subscribe(), topic)
    }
}
