//! The three operations over the shared dataset and model:
//! - `Trainer`: dataset → fitted, persisted pipeline + held-out score
//! - `Predictor`: candidate slots → slots ranked by predicted rating
//! - `FeedbackRecorder`: new rating → dataset row, retraining on policy

pub mod feedback;
pub mod predictor;
pub mod retrain;
pub mod trainer;

pub use feedback::{FeedbackRecorder, RecordOutcome};
pub use predictor::{rank_slots, ModelStatus, Predictor};
pub use retrain::RetrainPolicy;
pub use trainer::{Trainer, TrainingReport, MIN_TRAINING_ROWS};
