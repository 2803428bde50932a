use crate::ai::RandomSource;
use crate::error::StorageError;
use crate::game::{Difficulty, COLS};
use crate::storage::{load_json, save_json, KeyValueStore, LEARNING_KEY};

use super::pattern::{LearningData, LearningPattern, LearningStats, Penalties};

/// Tuning for the learning store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Stored patterns are capped at this many; the lowest loss counts go first.
    pub max_patterns: usize,
    /// Number of leading moves that identify a pattern.
    pub prefix_len: usize,
    /// Penalty added per recorded loss to a pattern's next column.
    pub penalty_per_loss: i64,
    /// Probability of answering with the expected column itself.
    pub block_chance: f64,
    /// Probability of answering with a neighbour of the expected column.
    pub adjacent_chance: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        LearningConfig {
            max_patterns: 100,
            prefix_len: 5,
            penalty_per_loss: 10,
            block_chance: 0.7,
            adjacent_chance: 0.5,
        }
    }
}

/// Loss patterns for every difficulty, held in memory.
///
/// Loading and saving are explicit so callers decide when storage I/O
/// happens. A store that fails to load behaves like an empty one.
#[derive(Debug, Clone)]
pub struct LearningStore {
    data: LearningData,
    config: LearningConfig,
}

impl LearningStore {
    pub fn new(config: LearningConfig) -> Self {
        LearningStore {
            data: LearningData::default(),
            config,
        }
    }

    /// Wrap previously saved data. Patterns naming a column off the board
    /// are dropped.
    pub fn from_data(mut data: LearningData, config: LearningConfig) -> Self {
        let before = data.patterns.len();
        data.patterns
            .retain(|p| p.player_moves.iter().all(|&col| col < COLS));
        if data.patterns.len() < before {
            tracing::warn!(
                dropped = before - data.patterns.len(),
                "discarded learning patterns with out-of-range columns"
            );
        }
        let mut store = LearningStore { data, config };
        store.enforce_capacity();
        store
    }

    pub fn load(store: &dyn KeyValueStore, config: LearningConfig) -> Result<Self, StorageError> {
        let data: LearningData = load_json(store, LEARNING_KEY)?.unwrap_or_default();
        Ok(Self::from_data(data, config))
    }

    /// Load, degrading to an empty store when storage fails.
    pub fn load_or_default(store: &dyn KeyValueStore, config: LearningConfig) -> Self {
        match Self::load(store, config.clone()) {
            Ok(learning) => learning,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load AI learning data, starting empty");
                Self::new(config)
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, LEARNING_KEY, &self.data)
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn patterns(&self) -> &[LearningPattern] {
        &self.data.patterns
    }

    pub fn stats(&self) -> LearningStats {
        LearningStats {
            total_games: self.data.total_games_learned,
            patterns_learned: self.data.patterns.len(),
        }
    }

    /// Forget everything learned.
    pub fn clear(&mut self) {
        self.data = LearningData::default();
    }

    /// Record the human's full move sequence from a game the AI lost.
    ///
    /// Patterns sharing the same leading moves and difficulty are merged:
    /// the loss count grows and the stored sequence becomes the latest one.
    pub fn record_loss(&mut self, player_moves: &[usize], difficulty: Difficulty) {
        if player_moves.is_empty() {
            return;
        }
        let prefix_len = self.config.prefix_len;
        let key = &player_moves[..prefix_len.min(player_moves.len())];

        let existing = self
            .data
            .patterns
            .iter_mut()
            .find(|p| p.difficulty == difficulty && p.key(prefix_len) == key);

        match existing {
            Some(pattern) => {
                pattern.loss_count += 1;
                pattern.player_moves = player_moves.to_vec();
                tracing::debug!(
                    %difficulty,
                    loss_count = pattern.loss_count,
                    "reinforced loss pattern"
                );
            }
            None => {
                self.data.patterns.push(LearningPattern {
                    player_moves: player_moves.to_vec(),
                    loss_count: 1,
                    difficulty,
                });
                tracing::debug!(%difficulty, moves = ?player_moves, "new loss pattern");
            }
        }

        self.data.total_games_learned += 1;
        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        if self.data.patterns.len() <= self.config.max_patterns {
            return;
        }
        // Stable sort keeps older patterns ahead among equal loss counts
        self.data
            .patterns
            .sort_by(|a, b| b.loss_count.cmp(&a.loss_count));
        self.data.patterns.truncate(self.config.max_patterns);
    }

    fn matching<'a>(
        &'a self,
        current: &'a [usize],
        difficulty: Difficulty,
    ) -> impl Iterator<Item = (&'a LearningPattern, usize)> + 'a {
        self.data
            .patterns
            .iter()
            .filter(move |p| p.difficulty == difficulty)
            .filter_map(move |p| p.next_move_after(current).map(|next| (p, next)))
    }

    /// Per-column penalties from every pattern the current game is following.
    pub fn penalties_for(&self, current: &[usize], difficulty: Difficulty) -> Penalties {
        let mut penalties = Penalties::none();
        for (pattern, next) in self.matching(current, difficulty) {
            penalties.add(next, i64::from(pattern.loss_count) * self.config.penalty_per_loss);
        }
        penalties
    }

    /// Column that disrupts the most dangerous matching pattern, if any.
    ///
    /// Deliberately probabilistic: the expected column is returned with
    /// `block_chance`, otherwise a legal neighbour with `adjacent_chance`.
    pub fn suggest_counter_move(
        &self,
        current: &[usize],
        legal: &[usize],
        difficulty: Difficulty,
        rng: &mut dyn RandomSource,
    ) -> Option<usize> {
        let (_, expected) = self
            .matching(current, difficulty)
            .fold(None::<(&LearningPattern, usize)>, |best, candidate| match best {
                Some((b, _)) if b.loss_count >= candidate.0.loss_count => best,
                _ => Some(candidate),
            })?;

        if legal.contains(&expected) && rng.chance(self.config.block_chance) {
            return Some(expected);
        }

        let adjacent: Vec<usize> = [expected.checked_sub(1), expected.checked_add(1)]
            .into_iter()
            .flatten()
            .filter(|col| legal.contains(col))
            .collect();
        if !adjacent.is_empty() && rng.chance(self.config.adjacent_chance) {
            return rng.pick(&adjacent);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedRandom;
    use crate::storage::MemoryStore;

    const ALL: [usize; 7] = [0, 1, 2, 3, 4, 5, 6];

    fn store() -> LearningStore {
        LearningStore::new(LearningConfig::default())
    }

    #[test]
    fn record_creates_then_merges_by_prefix() {
        let mut learning = store();
        learning.record_loss(&[3, 3, 4, 4, 5, 2], Difficulty::Hard);
        learning.record_loss(&[3, 3, 4, 4, 5, 6, 1], Difficulty::Hard);

        assert_eq!(learning.patterns().len(), 1);
        let pattern = &learning.patterns()[0];
        assert_eq!(pattern.loss_count, 2);
        assert_eq!(pattern.player_moves, vec![3, 3, 4, 4, 5, 6, 1]);
        assert_eq!(learning.stats().total_games, 2);
    }

    #[test]
    fn difficulties_are_kept_apart() {
        let mut learning = store();
        learning.record_loss(&[3, 3, 3, 3], Difficulty::Easy);
        learning.record_loss(&[3, 3, 3, 3], Difficulty::Hard);
        assert_eq!(learning.patterns().len(), 2);

        let penalties = learning.penalties_for(&[3, 3], Difficulty::Medium);
        assert!(penalties.is_empty());
    }

    #[test]
    fn short_games_use_whole_sequence_as_key() {
        let mut learning = store();
        learning.record_loss(&[3, 3, 3, 3], Difficulty::Easy);
        learning.record_loss(&[3, 3, 3, 3, 2], Difficulty::Easy);
        assert_eq!(learning.patterns().len(), 2);
    }

    #[test]
    fn penalties_accumulate_per_loss() {
        let mut learning = store();
        for _ in 0..4 {
            learning.record_loss(&[3, 2, 2, 1, 0, 0], Difficulty::Medium);
        }
        let penalties = learning.penalties_for(&[3, 2], Difficulty::Medium);
        assert_eq!(penalties.get(2), 40);
        assert_eq!(penalties.get(3), 0);
    }

    #[test]
    fn penalties_add_across_patterns() {
        let mut learning = store();
        learning.record_loss(&[3, 4, 5, 6, 6], Difficulty::Hard);
        learning.record_loss(&[3, 4, 5, 6, 0], Difficulty::Hard);
        learning.record_loss(&[3, 1, 5, 6, 0], Difficulty::Hard);
        let penalties = learning.penalties_for(&[3], Difficulty::Hard);
        assert_eq!(penalties.get(4), 20);
        assert_eq!(penalties.get(1), 10);
    }

    #[test]
    fn penalties_need_a_continuation() {
        let mut learning = store();
        learning.record_loss(&[3, 3, 3, 3], Difficulty::Easy);
        assert!(learning.penalties_for(&[3, 3, 3, 3], Difficulty::Easy).is_empty());
        assert!(learning.penalties_for(&[2], Difficulty::Easy).is_empty());
    }

    #[test]
    fn capacity_keeps_highest_loss_counts() {
        let mut learning = LearningStore::new(LearningConfig {
            max_patterns: 2,
            ..Default::default()
        });
        learning.record_loss(&[0, 0, 0, 0], Difficulty::Hard);
        learning.record_loss(&[1, 1, 1, 1], Difficulty::Hard);
        learning.record_loss(&[1, 1, 1, 1], Difficulty::Hard);
        // Overflows: ties on the lowest count keep the older pattern
        learning.record_loss(&[2, 2, 2, 2], Difficulty::Hard);

        let kept: Vec<&[usize]> = learning
            .patterns()
            .iter()
            .map(|p| p.player_moves.as_slice())
            .collect();
        assert_eq!(kept, vec![&[1, 1, 1, 1][..], &[0, 0, 0, 0][..]]);
        assert_eq!(learning.stats().total_games, 4);
    }

    #[test]
    fn counter_move_blocks_expected_column() {
        let mut learning = store();
        learning.record_loss(&[3, 4, 4, 4], Difficulty::Hard);
        learning.record_loss(&[3, 5, 5, 5], Difficulty::Hard);
        learning.record_loss(&[3, 5, 5, 5], Difficulty::Hard);

        let mut rng = ScriptedRandom::new([0.1], []);
        let counter = learning.suggest_counter_move(&[3], &ALL, Difficulty::Hard, &mut rng);
        assert_eq!(counter, Some(5));
    }

    #[test]
    fn counter_move_falls_back_to_neighbour() {
        let mut learning = store();
        learning.record_loss(&[3, 5, 5, 5], Difficulty::Hard);

        // Fails the 0.7 roll, passes the 0.5 roll, picks the second neighbour
        let mut rng = ScriptedRandom::new([0.9, 0.2], [1]);
        let counter = learning.suggest_counter_move(&[3], &ALL, Difficulty::Hard, &mut rng);
        assert_eq!(counter, Some(6));
    }

    #[test]
    fn counter_move_skips_full_expected_column() {
        let mut learning = store();
        learning.record_loss(&[3, 6, 6, 6], Difficulty::Medium);

        // Column 6 is not legal, only neighbour 5 remains
        let legal = [0, 1, 2, 3, 4, 5];
        let mut rng = ScriptedRandom::new([0.0], [0]);
        let counter = learning.suggest_counter_move(&[3], &legal, Difficulty::Medium, &mut rng);
        assert_eq!(counter, Some(5));
    }

    #[test]
    fn counter_move_can_decline() {
        let mut learning = store();
        learning.record_loss(&[3, 5, 5, 5], Difficulty::Hard);
        let mut rng = ScriptedRandom::new([0.9, 0.9], []);
        let counter = learning.suggest_counter_move(&[3], &ALL, Difficulty::Hard, &mut rng);
        assert_eq!(counter, None);
    }

    #[test]
    fn counter_move_none_without_match() {
        let learning = store();
        let mut rng = ScriptedRandom::default();
        assert_eq!(
            learning.suggest_counter_move(&[], &ALL, Difficulty::Easy, &mut rng),
            None
        );
    }

    #[test]
    fn save_and_load_roundtrip() {
        let kv = MemoryStore::new();
        let mut learning = store();
        learning.record_loss(&[3, 3, 2, 2], Difficulty::Medium);
        learning.save(&kv).unwrap();

        let loaded = LearningStore::load(&kv, LearningConfig::default()).unwrap();
        assert_eq!(loaded.patterns(), learning.patterns());
        assert_eq!(loaded.stats().total_games, 1);
    }

    #[test]
    fn corrupt_data_degrades_to_empty() {
        let kv = MemoryStore::new();
        kv.set(LEARNING_KEY, "garbage").unwrap();
        let loaded = LearningStore::load_or_default(&kv, LearningConfig::default());
        assert_eq!(loaded.stats().patterns_learned, 0);
    }

    #[test]
    fn out_of_range_columns_are_dropped_on_load() {
        let data = LearningData {
            patterns: vec![
                LearningPattern {
                    player_moves: vec![3, usize::MAX],
                    loss_count: 5,
                    difficulty: Difficulty::Hard,
                },
                LearningPattern {
                    player_moves: vec![3, 7, 2],
                    loss_count: 4,
                    difficulty: Difficulty::Hard,
                },
                LearningPattern {
                    player_moves: vec![3, 5, 5, 5],
                    loss_count: 1,
                    difficulty: Difficulty::Hard,
                },
            ],
            total_games_learned: 10,
        };
        let learning = LearningStore::from_data(data, LearningConfig::default());
        assert_eq!(learning.patterns().len(), 1);
        assert_eq!(learning.patterns()[0].player_moves, vec![3, 5, 5, 5]);

        // Fails the block roll, passes the neighbour roll
        let mut rng = ScriptedRandom::new([0.9, 0.1], [0]);
        let counter = learning.suggest_counter_move(&[3], &ALL, Difficulty::Hard, &mut rng);
        assert_eq!(counter, Some(4));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut learning = store();
        learning.record_loss(&[1, 2, 3, 4], Difficulty::Easy);
        learning.clear();
        assert_eq!(learning.stats().total_games, 0);
        assert!(learning.patterns().is_empty());
    }
}
