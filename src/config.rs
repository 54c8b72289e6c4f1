use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::services::RetrainPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub retrain: RetrainConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Comma-delimited preference dataset
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    /// Persisted model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/meeting_preferences.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/meeting_predictor.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            model_path: default_model_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainingConfig {
    /// Trees in the forest
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    /// Seed for both the train/test shuffle and the forest
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Held-out share of rows (e.g., 0.2 = 20%)
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Maximum tree depth (unset = grow until leaves are pure)
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Features examined per split (unset = all)
    #[serde(default)]
    pub max_features: Option<usize>,
}

fn default_n_trees() -> usize {
    100
}

fn default_seed() -> u64 {
    42
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_min_samples_split() -> usize {
    2
}

fn default_min_samples_leaf() -> usize {
    1
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: default_n_trees(),
            seed: default_seed(),
            test_fraction: default_test_fraction(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            max_features: None,
        }
    }
}

/// Which retraining trigger the feedback recorder applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrainPolicyKind {
    EveryNRows,
    Interval,
    Manual,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrainConfig {
    #[serde(default = "default_policy_kind")]
    pub policy: RetrainPolicyKind,
    /// Row-count cadence for `every_n_rows`
    #[serde(default = "default_every_n_rows")]
    pub every_n_rows: usize,
    /// Minimum artifact age in seconds for `interval`
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_policy_kind() -> RetrainPolicyKind {
    RetrainPolicyKind::EveryNRows
}

fn default_every_n_rows() -> usize {
    10
}

fn default_interval_secs() -> u64 {
    3600
}

impl Default for RetrainConfig {
    fn default() -> Self {
        Self {
            policy: default_policy_kind(),
            every_n_rows: default_every_n_rows(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl RetrainConfig {
    pub fn policy(&self) -> RetrainPolicy {
        match self.policy {
            RetrainPolicyKind::EveryNRows => RetrainPolicy::EveryNRows(self.every_n_rows),
            RetrainPolicyKind::Interval => RetrainPolicy::Interval(self.interval_secs),
            RetrainPolicyKind::Manual => RetrainPolicy::Manual,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            training: TrainingConfig::default(),
            retrain: RetrainConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("SLOTWISE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (SLOTWISE__STORAGE__MODEL_PATH, etc.)
            .add_source(
                Environment::with_prefix("SLOTWISE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.training.n_trees == 0 {
            errors.push("n_trees must be positive".to_string());
        }

        if !(self.training.test_fraction > 0.0 && self.training.test_fraction < 1.0) {
            errors.push("test_fraction must be between 0 and 1".to_string());
        }

        if self.training.min_samples_split < 2 {
            errors.push("min_samples_split must be at least 2".to_string());
        }

        if self.training.min_samples_leaf == 0 {
            errors.push("min_samples_leaf must be positive".to_string());
        }

        if self.training.max_features == Some(0) {
            errors.push("max_features must be positive when set".to_string());
        }

        if self.training.max_depth == Some(0) {
            errors.push("max_depth must be positive when set".to_string());
        }

        if self.retrain.policy == RetrainPolicyKind::EveryNRows && self.retrain.every_n_rows == 0 {
            errors.push("every_n_rows must be positive".to_string());
        }

        if self.storage.dataset_path == self.storage.model_path {
            errors.push("dataset_path and model_path must differ".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.training.n_trees, 100);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.retrain.policy(), RetrainPolicy::EveryNRows(10));
        assert_eq!(
            config.storage.dataset_path,
            PathBuf::from("data/meeting_preferences.csv")
        );
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let mut config = AppConfig::default();
        config.training.n_trees = 0;
        config.training.test_fraction = 1.0;
        config.retrain.every_n_rows = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3, "got: {errors:?}");
    }

    #[test]
    fn test_load_from_missing_dir_uses_defaults() {
        let dir = std::env::temp_dir().join("slotwise_config_test_missing_dir");
        let config = AppConfig::load_from(&dir).unwrap();
        assert_eq!(config.training, TrainingConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_reads_default_toml() {
        let dir = std::env::temp_dir().join(format!(
            "slotwise_config_test_{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("default.toml"),
            "[training]\nn_trees = 7\n\n[retrain]\npolicy = \"manual\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&dir).unwrap();
        assert_eq!(config.training.n_trees, 7);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.retrain.policy(), RetrainPolicy::Manual);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_policy_kinds() {
        let mut retrain = RetrainConfig::default();
        retrain.policy = RetrainPolicyKind::Manual;
        assert_eq!(retrain.policy(), RetrainPolicy::Manual);

        retrain.policy = RetrainPolicyKind::Interval;
        retrain.interval_secs = 60;
        assert_eq!(retrain.policy(), RetrainPolicy::Interval(60));
    }
}
