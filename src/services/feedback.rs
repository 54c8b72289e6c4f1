use serde::Serialize;
use tracing::{error, info, instrument};

use super::retrain::RetrainPolicy;
use super::trainer::{Trainer, TrainingReport};
use crate::config::AppConfig;
use crate::domain::Observation;
use crate::error::Result;
use crate::persistence::{DatasetStore, ModelStore};
use crate::validation::validate_observation;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutcome {
    /// Dataset rows after the append.
    pub row_count: usize,
    /// Present when the append triggered a training run.
    pub retrain: Option<TrainingReport>,
}

/// Appends rated meetings to the dataset and retrains on policy.
///
/// There is no locking: two recorders sharing a dataset can interleave their
/// append and row count. Serialize access externally if that matters.
#[derive(Debug, Clone)]
pub struct FeedbackRecorder {
    dataset: DatasetStore,
    models: ModelStore,
    trainer: Trainer,
    policy: RetrainPolicy,
}

impl FeedbackRecorder {
    pub fn new(
        dataset: DatasetStore,
        models: ModelStore,
        trainer: Trainer,
        policy: RetrainPolicy,
    ) -> Self {
        Self {
            dataset,
            models,
            trainer,
            policy,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            DatasetStore::new(&config.storage.dataset_path),
            ModelStore::new(&config.storage.model_path),
            Trainer::from_config(config),
            config.retrain.policy(),
        )
    }

    pub fn policy(&self) -> RetrainPolicy {
        self.policy
    }

    /// Validate, append, and retrain synchronously when the policy says so.
    ///
    /// An append that succeeds stays on disk even if the retrain that follows
    /// fails; that failure is returned to the caller.
    #[instrument(skip_all, fields(user = %observation.user_id))]
    pub fn record(&self, observation: &Observation) -> Result<RecordOutcome> {
        validate_observation(observation)?;

        let row_count = self.dataset.append(observation)?;
        info!(
            "FeedbackRecorder: recorded {} rating {} ({} rows)",
            observation.features.meeting_type, observation.rating, row_count
        );

        let artifact_age = match self.policy {
            RetrainPolicy::Interval(_) => self.models.age()?,
            RetrainPolicy::EveryNRows(_) | RetrainPolicy::Manual => None,
        };
        let retrain = if self.policy.should_retrain(row_count, artifact_age) {
            info!("FeedbackRecorder: {:?} reached at {row_count} rows, retraining", self.policy);
            Some(self.trainer.train(&self.dataset, &self.models)?)
        } else {
            None
        };

        Ok(RecordOutcome { row_count, retrain })
    }

    /// Boolean form of `record`. Failures are logged before returning false.
    pub fn record_preference(&self, observation: &Observation) -> bool {
        match self.record(observation) {
            Ok(_) => true,
            Err(e) => {
                error!("FeedbackRecorder: failed to record preference: {e}");
                false
            }
        }
    }
}
