use std::path::PathBuf;

/// A move that cannot be applied. Every variant is an expected condition:
/// callers treat the attempt as a no-op and leave their state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {0} is out of range")]
    ColumnOutOfRange(usize),

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("game is already over")]
    GameOver,

    #[error("not your turn")]
    NotYourTurn,

    #[error("player is not a participant in this game")]
    NotAParticipant,

    #[error("game has not started yet")]
    GameNotStarted,

    #[error("game not found")]
    GameNotFound,
}

/// Failures of the matchmaking and challenge flows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchmakingError {
    #[error("matchmaking queue unavailable: {0}")]
    QueueUnavailable(String),

    #[error("player {0} is already searching")]
    AlreadySearching(String),

    #[error("game not found")]
    GameNotFound,

    #[error("player is not invited to this game")]
    NotInvited,

    #[error("challenge is no longer pending")]
    ChallengeNotPending,
}

/// Errors raised by the persistent key-value storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_display() {
        assert_eq!(MoveError::ColumnFull(3).to_string(), "column 3 is full");
        assert_eq!(MoveError::NotYourTurn.to_string(), "not your turn");
    }

    #[test]
    fn test_matchmaking_error_display() {
        let err = MatchmakingError::AlreadySearching("guest_1".to_string());
        assert_eq!(err.to_string(), "player guest_1 is already searching");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("ai.hard_depth must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: ai.hard_depth must be > 0"
        );
    }
}
