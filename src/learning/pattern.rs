use crate::game::{Difficulty, COLS};

/// A human move sequence that defeated the AI at one difficulty.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LearningPattern {
    pub player_moves: Vec<usize>,
    pub loss_count: u32,
    pub difficulty: Difficulty,
}

impl LearningPattern {
    /// Leading moves that identify the pattern.
    pub fn key(&self, prefix_len: usize) -> &[usize] {
        &self.player_moves[..prefix_len.min(self.player_moves.len())]
    }

    /// The recorded move following `current`, if `current` is a strict
    /// prefix match of this pattern.
    pub fn next_move_after(&self, current: &[usize]) -> Option<usize> {
        if self.player_moves.len() <= current.len() {
            return None;
        }
        if self.player_moves[..current.len()] != *current {
            return None;
        }
        Some(self.player_moves[current.len()])
    }
}

/// Persisted form of the learning store.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LearningData {
    pub patterns: Vec<LearningPattern>,
    pub total_games_learned: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningStats {
    pub total_games: u64,
    pub patterns_learned: usize,
}

/// Score deducted from each column at the AI's root decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Penalties {
    by_column: [i64; COLS],
}

impl Penalties {
    pub fn none() -> Self {
        Self::default()
    }

    /// Penalty for a column; out-of-range columns carry none.
    pub fn get(&self, col: usize) -> i64 {
        self.by_column.get(col).copied().unwrap_or(0)
    }

    pub fn add(&mut self, col: usize, amount: i64) {
        if let Some(slot) = self.by_column.get_mut(col) {
            *slot += amount;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_column.iter().all(|&p| p == 0)
    }

    pub fn as_array(&self) -> [i64; COLS] {
        self.by_column
    }
}
