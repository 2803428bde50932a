//! Adaptive learning: remembers the human move sequences that beat the AI
//! and turns them into column penalties and counter-move suggestions.

mod pattern;
mod store;

pub use pattern::{LearningData, LearningPattern, LearningStats, Penalties};
pub use store::{LearningConfig, LearningStore};
