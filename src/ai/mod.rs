//! Computer opponents: the static evaluator, alpha-beta search, the move
//! selector that blends search with learned loss patterns, and agents.

mod agent;
mod heuristic;
mod minimax;
mod random;
mod selector;

pub use agent::{AdaptiveAgent, Agent, RandomAgent};
pub use heuristic::{evaluate, CENTER_WEIGHT};
pub use minimax::{best_move, search, SearchResult, WIN_SCORE};
pub use random::{RandomSource, ScriptedRandom, SystemRandom};
pub use selector::{AiConfig, Decision, MoveSelector};
