use std::path::Path;

use crate::ai::AiConfig;
use crate::error::ConfigError;
use crate::learning::LearningConfig;
use crate::storage::StorageConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ai: AiConfig,
    pub learning: LearningConfig,
    pub storage: StorageConfig,
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Validation(format!("{name} must be in [0, 1]")));
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ai = &self.ai;
        if ai.easy_depth == 0 {
            return Err(ConfigError::Validation("ai.easy_depth must be > 0".into()));
        }
        if ai.medium_depth == 0 {
            return Err(ConfigError::Validation("ai.medium_depth must be > 0".into()));
        }
        if ai.hard_depth == 0 {
            return Err(ConfigError::Validation("ai.hard_depth must be > 0".into()));
        }
        check_probability("ai.easy_random_move_chance", ai.easy_random_move_chance)?;
        check_probability("ai.medium_counter_chance", ai.medium_counter_chance)?;
        check_probability("ai.hard_counter_chance", ai.hard_counter_chance)?;

        let learning = &self.learning;
        if learning.max_patterns == 0 {
            return Err(ConfigError::Validation(
                "learning.max_patterns must be > 0".into(),
            ));
        }
        if learning.prefix_len == 0 {
            return Err(ConfigError::Validation(
                "learning.prefix_len must be > 0".into(),
            ));
        }
        if learning.penalty_per_loss < 0 {
            return Err(ConfigError::Validation(
                "learning.penalty_per_loss must be >= 0".into(),
            ));
        }
        check_probability("learning.block_chance", learning.block_chance)?;
        check_probability("learning.adjacent_chance", learning.adjacent_chance)?;

        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.data_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&AppConfig::default())?)
    }
}
