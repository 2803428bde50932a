use uuid::Uuid;

use crate::game::{GameState, Side};

/// Lifecycle of a shared game row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Challenge created, invitee has not accepted yet.
    Waiting,
    Playing,
    Finished,
}

/// Authoritative record of one networked game.
///
/// Seat one always moves first. `version` counts accepted transitions and
/// only ever grows, so clients can discard stale payloads.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OnlineGame {
    pub id: Uuid,
    pub player1_id: String,
    pub player2_id: Option<String>,
    pub state: GameState,
    pub player1_theme: Option<String>,
    pub player2_theme: Option<String>,
    pub status: GameStatus,
    pub version: u64,
}

impl OnlineGame {
    pub(crate) fn new(player1_id: &str, player2_id: &str, status: GameStatus) -> Self {
        OnlineGame {
            id: Uuid::new_v4(),
            player1_id: player1_id.to_string(),
            player2_id: Some(player2_id.to_string()),
            state: GameState::initial(),
            player1_theme: None,
            player2_theme: None,
            status,
            version: 0,
        }
    }

    /// Seat held by `player_id`, if they play in this game.
    pub fn side_of(&self, player_id: &str) -> Option<Side> {
        if self.player1_id == player_id {
            Some(Side::One)
        } else if self.player2_id.as_deref() == Some(player_id) {
            Some(Side::Two)
        } else {
            None
        }
    }

    pub fn is_participant(&self, player_id: &str) -> bool {
        self.side_of(player_id).is_some()
    }

    pub fn player_for(&self, side: Side) -> Option<&str> {
        match side {
            Side::One => Some(&self.player1_id),
            Side::Two => self.player2_id.as_deref(),
        }
    }

    /// Id of the player whose turn it is, while the game is in progress.
    pub fn current_player_id(&self) -> Option<&str> {
        if self.status != GameStatus::Playing {
            return None;
        }
        self.player_for(self.state.current_side())
    }

    pub fn opponent_of(&self, player_id: &str) -> Option<&str> {
        self.player_for(self.side_of(player_id)?.other())
    }

    pub fn theme_for(&self, side: Side) -> Option<&str> {
        match side {
            Side::One => self.player1_theme.as_deref(),
            Side::Two => self.player2_theme.as_deref(),
        }
    }

    pub(crate) fn theme_slot(&mut self, side: Side) -> &mut Option<String> {
        match side {
            Side::One => &mut self.player1_theme,
            Side::Two => &mut self.player2_theme,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Waiting,
    Matched,
}

/// A player waiting in the matchmaking queue.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QueueEntry {
    pub id: Uuid,
    pub player_id: String,
    pub status: QueueStatus,
    /// Set once the entry has been matched.
    pub game_id: Option<Uuid>,
}

impl QueueEntry {
    pub(crate) fn waiting(player_id: &str) -> Self {
        QueueEntry {
            id: Uuid::new_v4(),
            player_id: player_id.to_string(),
            status: QueueStatus::Waiting,
            game_id: None,
        }
    }
}

/// Input of the authoritative move transition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MoveRequest {
    pub game_id: Uuid,
    pub player_id: String,
    pub column: usize,
    /// Version the client saw when it submitted. A mismatch means the
    /// client is acting on a stale board.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Result of a matchmaking request.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// An opponent was waiting; the game is already playing.
    Matched(OnlineGame),
    /// Nobody was waiting; the searcher now owns this queue entry.
    Queued(QueueEntry),
}

/// Row-level change notification.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "row", rename_all = "snake_case")]
pub enum ChangeEvent {
    Queue(QueueEntry),
    QueueRemoved(QueueEntry),
    Game(OnlineGame),
    GameRemoved(OnlineGame),
}

/// Filter for a change subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// Queue rows owned by the player and games they take part in.
    Player(String),
    Game(Uuid),
}

impl Topic {
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        match (self, event) {
            (Topic::Player(id), ChangeEvent::Queue(entry) | ChangeEvent::QueueRemoved(entry)) => {
                entry.player_id == *id
            }
            (Topic::Player(id), ChangeEvent::Game(game) | ChangeEvent::GameRemoved(game)) => {
                game.is_participant(id)
            }
            (Topic::Game(id), ChangeEvent::Game(game) | ChangeEvent::GameRemoved(game)) => {
                game.id == *id
            }
            (Topic::Game(_), _) => false,
        }
    }
}
