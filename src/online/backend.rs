use async_trait::async_trait;
use uuid::Uuid;

use super::subscription::Subscription;
use super::types::{MatchOutcome, MoveRequest, OnlineGame, Topic};
use crate::error::{MatchmakingError, MoveError};

/// Shared store, realtime channel and authoritative move procedure for
/// networked play.
///
/// Every board mutation goes through [`GameBackend::make_move`]; there is
/// no way for a client to write a board directly.
#[async_trait]
pub trait GameBackend: Send + Sync {
    /// Pair with the oldest waiting player, or enqueue the searcher.
    ///
    /// Atomic: on error nothing was enqueued or created.
    async fn find_match(&self, player_id: &str) -> Result<MatchOutcome, MatchmakingError>;

    /// Remove the player's queue entry. Succeeds when it is already gone.
    ///
    /// When the entry was paired before the cancel arrived, nothing is
    /// undone and the id of the game it joined is returned instead.
    async fn cancel_search(
        &self,
        entry_id: Uuid,
        player_id: &str,
    ) -> Result<Option<Uuid>, MatchmakingError>;

    async fn fetch_game(&self, game_id: Uuid) -> Option<OnlineGame>;

    /// Create a game in `waiting` between two known players. The
    /// challenger takes seat one.
    async fn create_challenge(
        &self,
        challenger_id: &str,
        invitee_id: &str,
    ) -> Result<OnlineGame, MatchmakingError>;

    async fn accept_challenge(
        &self,
        game_id: Uuid,
        player_id: &str,
    ) -> Result<OnlineGame, MatchmakingError>;

    /// Delete a pending challenge. Only the invitee may decline.
    async fn decline_challenge(&self, game_id: Uuid, player_id: &str)
        -> Result<(), MatchmakingError>;

    /// Set the opaque theme id of the caller's own seat.
    async fn set_theme(
        &self,
        game_id: Uuid,
        player_id: &str,
        theme_id: &str,
    ) -> Result<OnlineGame, MoveError>;

    /// Validate and apply one move as a single transition.
    async fn make_move(&self, request: MoveRequest) -> Result<OnlineGame, MoveError>;

    /// Start a change feed. Must be called from within a tokio runtime.
    fn subscribe(&self, topic: Topic) -> Subscription;
}
