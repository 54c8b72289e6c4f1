use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::{AppConfig, TrainingConfig};
use crate::domain::Observation;
use crate::error::{Result, SlotwiseError};
use crate::ml::{r2_score, rmse, train_test_split, ForestParams, Pipeline, TreeParams};
use crate::persistence::{DatasetStore, ModelStore};

/// Smallest dataset that still leaves one row on each side of the split.
pub const MIN_TRAINING_ROWS: usize = 2;

impl TrainingConfig {
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            seed: self.seed,
            tree: TreeParams {
                max_depth: self.max_depth,
                min_samples_split: self.min_samples_split,
                min_samples_leaf: self.min_samples_leaf,
                max_features: self.max_features,
            },
        }
    }
}

/// Outcome of one training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Held-out coefficient of determination; `None` when undefined.
    pub r2_score: Option<f64>,
    pub rmse: Option<f64>,
    pub n_train: usize,
    pub n_test: usize,
    pub n_categories: usize,
    pub trained_at: DateTime<Utc>,
    pub model_path: PathBuf,
}

impl TrainingReport {
    pub fn summary_line(&self) -> String {
        match self.r2_score {
            Some(score) => format!("Model R² score: {score:.4}"),
            None => format!(
                "Model R² score: undefined ({} held-out row{})",
                self.n_test,
                if self.n_test == 1 { "" } else { "s" }
            ),
        }
    }
}

/// Fits the pipeline on a dataset and replaces the persisted artifact.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.training.clone())
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Split, fit, persist, then score on the held-out rows.
    ///
    /// Fails with `Dataset` when the dataset is missing, malformed, or too
    /// small, and with `Write` when the artifact cannot be stored. Nothing is
    /// retried.
    #[instrument(skip_all, fields(dataset = %dataset.path().display()))]
    pub fn train(&self, dataset: &DatasetStore, models: &ModelStore) -> Result<TrainingReport> {
        let observations = dataset.load()?;
        if observations.len() < MIN_TRAINING_ROWS {
            return Err(SlotwiseError::Dataset(format!(
                "need at least {MIN_TRAINING_ROWS} rows to train, found {}",
                observations.len()
            )));
        }

        let (train_idx, test_idx) = train_test_split(
            observations.len(),
            self.config.test_fraction,
            self.config.seed,
        )
        .map_err(|e| SlotwiseError::Dataset(e.to_string()))?;

        let train: Vec<&Observation> = train_idx.iter().map(|&i| &observations[i]).collect();
        let test: Vec<&Observation> = test_idx.iter().map(|&i| &observations[i]).collect();

        info!(
            "Trainer: fitting {} trees on {} rows ({} held out)",
            self.config.n_trees,
            train.len(),
            test.len()
        );
        let pipeline = Pipeline::fit(&train, &self.config.forest_params())?;
        models.save(&pipeline)?;

        let predicted = pipeline.predict(test.iter().map(|o| &o.features));
        let actual: Vec<f64> = test.iter().map(|o| o.rating).collect();
        let report = TrainingReport {
            r2_score: r2_score(&actual, &predicted),
            rmse: rmse(&actual, &predicted),
            n_train: train.len(),
            n_test: test.len(),
            n_categories: pipeline.encoder().categories().len(),
            trained_at: pipeline.metadata.trained_at,
            model_path: models.path().to_path_buf(),
        };

        match report.r2_score {
            Some(score) => info!("Trainer: held-out R² = {score:.4}"),
            None => warn!(
                "Trainer: R² undefined with {} held-out row(s)",
                report.n_test
            ),
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureVector;

    fn temp_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "slotwise_trainer_{}_{}",
            name,
            Utc::now().timestamp_nanos_opt().unwrap_or(0)
        ));
        p
    }

    fn fast_trainer() -> Trainer {
        Trainer::new(TrainingConfig {
            n_trees: 10,
            ..TrainingConfig::default()
        })
    }

    #[test]
    fn summary_line_formats_four_decimals() {
        let report = TrainingReport {
            r2_score: Some(0.123456),
            rmse: Some(0.5),
            n_train: 8,
            n_test: 2,
            n_categories: 2,
            trained_at: Utc::now(),
            model_path: PathBuf::from("models/m.json"),
        };
        assert_eq!(report.summary_line(), "Model R² score: 0.1235");

        let undefined = TrainingReport {
            r2_score: None,
            n_test: 1,
            ..report
        };
        assert_eq!(
            undefined.summary_line(),
            "Model R² score: undefined (1 held-out row)"
        );
    }

    #[test]
    fn trains_and_persists() {
        let dir = temp_dir("persist");
        let dataset = DatasetStore::new(dir.join("prefs.csv"));
        let models = ModelStore::new(dir.join("models/model.json"));
        for i in 0..20u8 {
            let features = FeatureVector::new(i % 7, 8 + i % 10, 30, 4, "standup");
            dataset
                .append(&Observation::new("u1", features, f64::from(i % 5)))
                .unwrap();
        }

        let report = fast_trainer().train(&dataset, &models).unwrap();
        assert_eq!((report.n_train, report.n_test), (16, 4));
        assert_eq!(report.n_categories, 1);
        assert!(report.r2_score.is_some());
        assert!(models.exists());
        assert_eq!(models.load().unwrap().metadata.n_samples, 16);
    }

    #[test]
    fn unwritable_model_path_is_write_error() {
        let dir = temp_dir("model_blocked");
        let dataset = DatasetStore::new(dir.join("prefs.csv"));
        for i in 0..10u8 {
            let features = FeatureVector::new(i % 7, 8 + i, 30, 4, "standup");
            dataset
                .append(&Observation::new("u1", features, f64::from(i % 5)))
                .unwrap();
        }
        std::fs::write(dir.join("models"), "not a directory").unwrap();
        let models = ModelStore::new(dir.join("models/model.json"));

        let err = fast_trainer().train(&dataset, &models).unwrap_err();
        assert!(matches!(err, SlotwiseError::Write { .. }), "got: {err}");
        assert!(!models.exists());
    }

    #[test]
    fn missing_dataset_fails_without_artifact() {
        let dir = temp_dir("missing");
        let dataset = DatasetStore::new(dir.join("prefs.csv"));
        let models = ModelStore::new(dir.join("model.json"));

        let err = fast_trainer().train(&dataset, &models).unwrap_err();
        assert!(matches!(err, SlotwiseError::Dataset(_)));
        assert!(!models.exists());
    }

    #[test]
    fn single_row_is_too_small() {
        let dir = temp_dir("tiny");
        let dataset = DatasetStore::new(dir.join("prefs.csv"));
        let models = ModelStore::new(dir.join("model.json"));
        dataset
            .append(&Observation::new(
                "u1",
                FeatureVector::new(1, 9, 30, 4, "standup"),
                4.0,
            ))
            .unwrap();

        let err = fast_trainer().train(&dataset, &models).unwrap_err();
        assert!(err.to_string().contains("at least 2 rows"), "got: {err}");
    }
}
