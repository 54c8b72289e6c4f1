//! Fitted encoder + forest, the unit that gets persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::encoder::FeatureEncoder;
use super::forest::{ForestParams, RandomForestRegressor};
use crate::domain::{FeatureVector, Observation, FEATURES};
use crate::error::{Result, SlotwiseError};

/// Tag written into every artifact so foreign JSON is rejected on load.
pub const ARTIFACT_FORMAT: &str = "slotwise.pipeline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub format: String,
    /// Input features the artifact was fitted on.
    pub features: Vec<String>,
    pub trained_at: DateTime<Utc>,
    /// Rows the forest was fitted on.
    pub n_samples: usize,
    pub params: ForestParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub metadata: PipelineMetadata,
    encoder: FeatureEncoder,
    forest: RandomForestRegressor,
}

impl Pipeline {
    /// Fit the encoder and the forest on `observations`.
    pub fn fit(observations: &[&Observation], params: &ForestParams) -> Result<Self> {
        if observations.is_empty() {
            return Err(SlotwiseError::Training(
                "no observations to fit".to_string(),
            ));
        }

        let encoder = FeatureEncoder::fit(observations.iter().map(|o| &o.features));
        let x = encoder.transform_batch(observations.iter().map(|o| &o.features));
        let y: Vec<f64> = observations.iter().map(|o| o.rating).collect();
        let forest = RandomForestRegressor::fit(&x, &y, params)?;

        Ok(Self {
            metadata: PipelineMetadata {
                format: ARTIFACT_FORMAT.to_string(),
                features: FEATURES.iter().map(|f| f.to_string()).collect(),
                trained_at: Utc::now(),
                n_samples: observations.len(),
                params: *params,
            },
            encoder,
            forest,
        })
    }

    /// Score every row in one pass, preserving input order.
    pub fn predict<'a, I>(&self, rows: I) -> Vec<f64>
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        let x = self.encoder.transform_batch(rows);
        self.forest.predict_batch(&x)
    }

    pub fn predict_one(&self, features: &FeatureVector) -> f64 {
        self.forest.predict_row(&self.encoder.transform(features))
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }

    /// True when the artifact was fitted on the current feature set.
    pub fn is_compatible(&self) -> bool {
        self.metadata.format == ARTIFACT_FORMAT
            && self.metadata.features.iter().map(String::as_str).eq(FEATURES)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.encoder.validate()?;
        if self.forest.n_features() != self.encoder.n_outputs() {
            return Err(format!(
                "forest expects {} inputs, encoder produces {}",
                self.forest.n_features(),
                self.encoder.n_outputs()
            ));
        }
        self.forest.validate()
    }
}
