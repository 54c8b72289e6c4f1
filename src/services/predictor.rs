use tracing::{debug, info, instrument};

use super::trainer::{Trainer, TrainingReport};
use crate::config::AppConfig;
use crate::domain::{CandidateSlot, ScoredSlot};
use crate::error::Result;
use crate::ml::Pipeline;
use crate::persistence::{DatasetStore, ModelStore};
use crate::validation::validate_feature_vector;

/// What `ensure_model` had to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    /// An artifact was already in place.
    Present,
    /// No artifact existed; one was trained from the bootstrap dataset.
    Bootstrapped(TrainingReport),
}

/// Scores candidate slots with the persisted model.
///
/// When the artifact is missing the predictor trains one from its bootstrap
/// dataset first. A corrupt or incompatible artifact is an error, never a
/// reason to retrain.
#[derive(Debug, Clone)]
pub struct Predictor {
    models: ModelStore,
    bootstrap: DatasetStore,
    trainer: Trainer,
}

impl Predictor {
    pub fn new(models: ModelStore, bootstrap: DatasetStore, trainer: Trainer) -> Self {
        Self {
            models,
            bootstrap,
            trainer,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ModelStore::new(&config.storage.model_path),
            DatasetStore::new(&config.storage.dataset_path),
            Trainer::from_config(config),
        )
    }

    pub fn models(&self) -> &ModelStore {
        &self.models
    }

    /// Train from the bootstrap dataset if no artifact exists.
    pub fn ensure_model(&self) -> Result<ModelStatus> {
        if self.models.exists() {
            return Ok(ModelStatus::Present);
        }
        self.bootstrap_model().map(ModelStatus::Bootstrapped)
    }

    /// Rank `slots` by predicted rating, best first.
    ///
    /// `user_id` is carried for tracing only; scoring is not personalised.
    #[instrument(skip(self, slots), fields(slots = slots.len()))]
    pub fn predict(&self, user_id: &str, slots: Vec<CandidateSlot>) -> Result<Vec<ScoredSlot>> {
        // Checked before loading so a bad or empty request never bootstraps.
        validate_slots(&slots)?;
        if slots.is_empty() {
            return Ok(Vec::new());
        }

        let pipeline = self.load_or_bootstrap()?;
        Ok(rank_validated(&pipeline, slots))
    }

    fn load_or_bootstrap(&self) -> Result<Pipeline> {
        match self.models.load() {
            Ok(pipeline) => Ok(pipeline),
            Err(e) if e.is_artifact_missing() => {
                self.bootstrap_model()?;
                self.models.load()
            }
            Err(e) => Err(e),
        }
    }

    fn bootstrap_model(&self) -> Result<TrainingReport> {
        info!(
            "Predictor: no model at {}, training from {}",
            self.models.path().display(),
            self.bootstrap.path().display()
        );
        self.trainer.train(&self.bootstrap, &self.models)
    }
}

/// Score every slot in one batch and sort descending by score.
///
/// The sort is stable, so equal scores keep their input order. Output
/// length always equals input length.
pub fn rank_slots(pipeline: &Pipeline, slots: Vec<CandidateSlot>) -> Result<Vec<ScoredSlot>> {
    validate_slots(&slots)?;
    Ok(rank_validated(pipeline, slots))
}

fn validate_slots(slots: &[CandidateSlot]) -> Result<()> {
    slots
        .iter()
        .try_for_each(|slot| validate_feature_vector(&slot.features))
}

fn rank_validated(pipeline: &Pipeline, slots: Vec<CandidateSlot>) -> Vec<ScoredSlot> {
    let scores = pipeline.predict(slots.iter().map(|s| &s.features));
    let mut ranked: Vec<ScoredSlot> = slots
        .into_iter()
        .zip(scores)
        .map(|(slot, score)| ScoredSlot { slot, score })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!("Ranked {} slots", ranked.len());
    ranked
}
