pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ml;
pub mod persistence;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use domain::{
    CandidateSlot, FeatureVector, Observation, ScoredSlot, DATASET_COLUMNS, FEATURES,
};
pub use error::{Result, SlotwiseError};
pub use ml::Pipeline;
pub use persistence::{DatasetStore, ModelStore};
pub use services::{
    rank_slots, FeedbackRecorder, ModelStatus, Predictor, RecordOutcome, RetrainPolicy, Trainer,
    TrainingReport,
};
