use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of randomness for tie-breaks and probabilistic AI choices.
///
/// Injected rather than ambient so tests can replay exact sequences.
pub trait RandomSource: Send {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize;

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Uniformly pick one element of a non-empty slice.
    fn pick(&mut self, items: &[usize]) -> Option<usize> {
        if items.is_empty() {
            return None;
        }
        Some(items[self.next_index(items.len())])
    }
}

/// `StdRng`-backed source used in play.
pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    pub fn new() -> Self {
        SystemRandom {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        SystemRandom {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Replays fixed values. Once a queue is drained it keeps returning `0.0`
/// for units and `0` for indices.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    units: VecDeque<f64>,
    indices: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(units: impl IntoIterator<Item = f64>, indices: impl IntoIterator<Item = usize>) -> Self {
        ScriptedRandom {
            units: units.into_iter().collect(),
            indices: indices.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.0)
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.indices.pop_front().unwrap_or(0) % len
    }
}
