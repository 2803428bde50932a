//! Networked play: shared game and queue rows, the authoritative backend
//! contract with an in-process implementation, change subscriptions and
//! the client session state machine.

mod backend;
mod memory;
mod session;
mod subscription;
mod types;

pub use backend::GameBackend;
pub use memory::InMemoryBackend;
pub use session::{OnlineSession, SessionPhase};
pub use subscription::Subscription;
pub use types::{
    ChangeEvent, GameStatus, MatchOutcome, MoveRequest, OnlineGame, QueueEntry, QueueStatus, Topic,
};
